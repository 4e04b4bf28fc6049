use crate::model::Submission;
use anyhow::Context;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

fn filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\d{4}[A-Z0-9]{4}\d{4}[A-Z]\.sql$").expect("static pattern compiles")
    })
}

/// `<4 digits><4 alphanumeric><4 digits><letter>.sql`, any case.
pub fn is_valid_submission_filename(name: &str) -> bool {
    filename_pattern().is_match(name)
}

/// Upper-cased file stem, e.g. `2023a7ps0043h.sql` -> `2023A7PS0043H`.
pub fn student_id_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    stem.to_uppercase()
}

/// Canonical stored name for a student's submission.
pub fn canonical_filename(student_id: &str) -> String {
    format!("{}.sql", student_id)
}

/// Every valid `*.sql` submission in `dir`, one per student, sorted by file name.
///
/// When several files map to the same student id (names differing only in
/// case), the most recently modified one wins, then the canonical name.
pub fn discover(dir: &Path) -> anyhow::Result<Vec<Submission>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read submissions dir {}", dir.display()))?;

    let mut by_id: BTreeMap<String, (String, Option<SystemTime>)> = BTreeMap::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_ascii_lowercase().ends_with(".sql") {
            continue;
        }
        if !is_valid_submission_filename(&name) {
            tracing::warn!(event = "submission_skipped", file = %name, reason = "invalid filename");
            continue;
        }
        let modified = entry.metadata()?.modified().ok();
        let student_id = student_id_from_filename(&name);
        let kept = match by_id.get(&student_id) {
            Some(current) if !supersedes(&student_id, (&name, modified), current) => {
                Some(current.0.clone())
            }
            _ => None,
        };
        match kept {
            Some(kept) => {
                tracing::warn!(event = "submission_skipped", file = %name, reason = "superseded", kept = %kept);
            }
            None => {
                if let Some((old, _)) = by_id.insert(student_id, (name.clone(), modified)) {
                    tracing::warn!(event = "submission_skipped", file = %old, reason = "superseded", kept = %name);
                }
            }
        }
    }

    let mut picked: Vec<(String, String)> = by_id
        .into_iter()
        .map(|(id, (name, _))| (name, id))
        .collect();
    picked.sort();

    picked
        .into_iter()
        .map(|(name, student_id)| {
            let path = dir.join(&name);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read submission {}", path.display()))?;
            let content = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(event = "submission_not_utf8", file = %name, error = %e.utf8_error());
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            Ok(Submission {
                student_id,
                file_name: name,
                content,
            })
        })
        .collect()
}

fn supersedes(
    student_id: &str,
    (name, modified): (&str, Option<SystemTime>),
    (current_name, current_modified): &(String, Option<SystemTime>),
) -> bool {
    match modified.cmp(current_modified) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            let canonical = canonical_filename(student_id);
            name == canonical || (current_name != &canonical && name > current_name.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_pattern() {
        assert!(is_valid_submission_filename("2023A7PS0043H.sql"));
        assert!(is_valid_submission_filename("2023a7ps0043h.SQL"));
        assert!(!is_valid_submission_filename("submission.sql"));
        assert!(!is_valid_submission_filename("2023A7PS0043.sql"));
        assert!(!is_valid_submission_filename("2023A7PS0043H.sql.bak"));
        assert!(!is_valid_submission_filename("2023A7P_0043H.sql"));
    }

    #[test]
    fn test_student_id_is_uppercased_stem() {
        assert_eq!(student_id_from_filename("2023a7ps0043h.sql"), "2023A7PS0043H");
    }

    #[test]
    fn test_discover_sorts_and_skips_invalid() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("2023A7PS0100H.sql"), "--1--\nSELECT 1;")?;
        std::fs::write(dir.path().join("2023A7PS0001H.sql"), "--1--\nSELECT 2;")?;
        std::fs::write(dir.path().join("ans.sql"), "--1--\nSELECT 3;")?;
        std::fs::write(dir.path().join("notes.txt"), "hello")?;

        let subs = discover(dir.path())?;
        let ids: Vec<_> = subs.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, ["2023A7PS0001H", "2023A7PS0100H"]);
        Ok(())
    }

    #[test]
    fn test_discover_keeps_one_file_per_student() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let older = dir.path().join("2023a7ps0043h.sql");
        let newer = dir.path().join("2023A7PS0043H.sql");
        std::fs::write(&older, "--1--\nSELECT 1;")?;
        std::fs::write(&newer, "--1--\nSELECT 2;")?;
        let base = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        std::fs::File::options()
            .write(true)
            .open(&older)?
            .set_modified(base)?;
        std::fs::File::options()
            .write(true)
            .open(&newer)?
            .set_modified(base + std::time::Duration::from_secs(60))?;

        let subs = discover(dir.path())?;
        // Case-insensitive filesystems hold a single file here anyway.
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].student_id, "2023A7PS0043H");
        assert_eq!(subs[0].content, "--1--\nSELECT 2;");
        Ok(())
    }

    #[test]
    fn test_discover_decodes_invalid_utf8_lossily() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("2023A7PS0002H.sql"),
            b"-- caf\xe9\n--1--\nSELECT 1;".as_slice(),
        )?;
        let subs = discover(dir.path())?;
        assert_eq!(subs.len(), 1);
        assert!(subs[0].content.contains("--1--\nSELECT 1;"));
        assert!(subs[0].content.contains('\u{FFFD}'));
        Ok(())
    }
}
