use super::RunArtifacts;
use serde_json::json;
use std::path::Path;

/// Machine-readable run summary; verdicts keep ERROR distinct from FAIL.
pub fn to_value(artifacts: &RunArtifacts) -> serde_json::Value {
    let (pass, fail, error) = artifacts.verdict_counts();
    let students: Vec<serde_json::Value> = artifacts
        .reports
        .iter()
        .map(|r| {
            json!({
                "student_id": r.student_id,
                "passed": r.passed(),
                "slots": r.outcomes.iter().map(|o| json!({
                    "slot": o.slot,
                    "verdict": o.verdict,
                    "message": o.message,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "schema_version": 1,
        "expected_queries": artifacts.expected_queries,
        "unavailable_slots": artifacts.unavailable_slots,
        "summary": { "pass": pass, "fail": fail, "error": error },
        "students": students,
    })
}

pub fn write_json(artifacts: &RunArtifacts, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(&to_value(artifacts))?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SlotOutcome, SubmissionReport, Verdict};

    #[test]
    fn test_error_verdict_kept_in_json() {
        let artifacts = RunArtifacts {
            expected_queries: 1,
            unavailable_slots: vec![],
            reports: vec![SubmissionReport {
                student_id: "2023A7PS0043H".into(),
                outcomes: vec![SlotOutcome {
                    slot: 1,
                    verdict: Verdict::Error,
                    expected: None,
                    actual: None,
                    message: "boom".into(),
                }],
            }],
        };
        let v = to_value(&artifacts);
        assert_eq!(v["students"][0]["slots"][0]["verdict"], "ERROR");
        assert_eq!(v["summary"]["error"], 1);
    }
}
