use crate::model::{SlotOutcome, SubmissionReport, Verdict};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Human-readable diagnostic log for one submission.
pub fn render(report: &SubmissionReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("STUDENT ID: {}\n", report.student_id));
    out.push_str(&format!(
        "SCORE: {}/{}\n",
        report.passed(),
        report.outcomes.len()
    ));
    for o in &report.outcomes {
        out.push('\n');
        render_slot(&mut out, o);
    }
    out
}

fn render_slot(out: &mut String, o: &SlotOutcome) {
    out.push_str(&format!("==== QUERY {}: {} ====\n", o.slot, o.verdict));

    out.push_str("EXPECTED OUTPUT:\n");
    match &o.expected {
        Some(r) => out.push_str(&r.to_string()),
        None => out.push_str("(none)\n"),
    }
    out.push('\n');

    out.push_str("STUDENT OUTPUT:\n");
    match &o.actual {
        Some(r) => out.push_str(&r.to_string()),
        None => out.push_str("(none)\n"),
    }
    out.push('\n');

    match o.verdict {
        Verdict::Pass => out.push_str("RESULT: PASS\n"),
        Verdict::Fail => {
            out.push_str("DIFF:\n");
            out.push_str(&o.message);
            out.push('\n');
        }
        Verdict::Error => {
            out.push_str("SQL ERROR:\n");
            out.push_str(&o.message);
            out.push('\n');
        }
    }
}

pub fn log_path(logs_dir: &Path, student_id: &str) -> PathBuf {
    logs_dir.join(format!("{}.log", student_id))
}

pub fn write_submission_log(report: &SubmissionReport, logs_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = log_path(logs_dir, &report.student_id);
    std::fs::write(&path, render(report))
        .with_context(|| format!("failed to write log {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, NormalizedResult, Row};

    #[test]
    fn test_log_sections_per_verdict() {
        let expected = NormalizedResult {
            columns: vec!["id".into()],
            rows: vec![Row(vec![Cell::Integer(1)])],
        };
        let report = SubmissionReport {
            student_id: "2023A7PS0043H".into(),
            outcomes: vec![
                SlotOutcome {
                    slot: 1,
                    verdict: Verdict::Pass,
                    expected: Some(expected.clone()),
                    actual: Some(expected.clone()),
                    message: String::new(),
                },
                SlotOutcome {
                    slot: 2,
                    verdict: Verdict::Fail,
                    expected: Some(expected.clone()),
                    actual: None,
                    message: "marker --2-- is missing".into(),
                },
                SlotOutcome {
                    slot: 3,
                    verdict: Verdict::Error,
                    expected: Some(expected),
                    actual: None,
                    message: "no such table: Students".into(),
                },
            ],
        };

        let text = render(&report);
        assert!(text.starts_with("STUDENT ID: 2023A7PS0043H\nSCORE: 1/3\n"));
        assert!(text.contains("==== QUERY 1: PASS ====\nEXPECTED OUTPUT:\ncolumns: [id]\nrows (1):\n  (1)\n"));
        assert!(text.contains("RESULT: PASS"));
        assert!(text.contains("==== QUERY 2: FAIL ===="));
        assert!(text.contains("STUDENT OUTPUT:\n(none)\n"));
        assert!(text.contains("DIFF:\nmarker --2-- is missing"));
        assert!(text.contains("SQL ERROR:\nno such table: Students"));
    }
}
