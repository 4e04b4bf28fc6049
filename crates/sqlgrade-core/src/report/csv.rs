use super::RunArtifacts;
use anyhow::Context;
use std::path::Path;

/// Header row: `StudentID, Q1..QN, Total`.
pub fn header(expected_queries: usize) -> Vec<String> {
    let mut h = Vec::with_capacity(expected_queries + 2);
    h.push("StudentID".to_string());
    h.extend((1..=expected_queries).map(|i| format!("Q{}", i)));
    h.push("Total".to_string());
    h
}

pub fn render(artifacts: &RunArtifacts) -> String {
    let mut out = String::new();
    push_record(&mut out, &header(artifacts.expected_queries));
    for row in artifacts.score_rows() {
        push_record(&mut out, &row.to_record());
    }
    out
}

pub fn write_report(artifacts: &RunArtifacts, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, render(artifacts))
        .with_context(|| format!("failed to write report {}", out.display()))?;
    Ok(())
}

fn push_record(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SlotOutcome, SubmissionReport, Verdict};

    fn report(id: &str, verdicts: &[Verdict]) -> SubmissionReport {
        SubmissionReport {
            student_id: id.into(),
            outcomes: verdicts
                .iter()
                .enumerate()
                .map(|(i, v)| SlotOutcome {
                    slot: i + 1,
                    verdict: *v,
                    expected: None,
                    actual: None,
                    message: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_report_layout() -> anyhow::Result<()> {
        let artifacts = RunArtifacts {
            expected_queries: 2,
            unavailable_slots: vec![],
            reports: vec![
                report("2023A7PS0001H", &[Verdict::Pass, Verdict::Pass]),
                report("2023A7PS0002H", &[Verdict::Error, Verdict::Pass]),
            ],
        };
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out/results.csv");
        write_report(&artifacts, &path)?;

        let content = std::fs::read_to_string(path)?;
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "StudentID,Q1,Q2,Total");
        assert_eq!(lines[1], "2023A7PS0001H,PASS,PASS,2/2");
        assert_eq!(lines[2], "2023A7PS0002H,FAIL,PASS,1/2");
        Ok(())
    }

    #[test]
    fn test_escape_quotes_special_fields() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
