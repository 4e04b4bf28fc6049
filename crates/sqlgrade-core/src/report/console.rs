use super::RunArtifacts;
use crate::model::{SubmissionReport, Verdict};

pub fn print_student(report: &SubmissionReport) {
    let cells: Vec<String> = report
        .outcomes
        .iter()
        .map(|o| format!("Q{}={}", o.slot, o.verdict))
        .collect();
    let icon = if report.passed() == report.outcomes.len() {
        "✅"
    } else {
        "❌"
    };
    eprintln!(
        "{} {:<16} {}/{}  {}",
        icon,
        report.student_id,
        report.passed(),
        report.outcomes.len(),
        cells.join(" ")
    );
    for o in &report.outcomes {
        if o.verdict == Verdict::Error {
            let first = o.message.lines().next().unwrap_or_default();
            eprintln!("      Q{} error: {}", o.slot, first);
        }
    }
}

pub fn print_summary(artifacts: &RunArtifacts) {
    eprintln!("\nGraded {} submissions...", artifacts.reports.len());
    for r in &artifacts.reports {
        print_student(r);
    }

    if !artifacts.unavailable_slots.is_empty() {
        eprintln!(
            "⚠️  no expected result for slot(s) {:?}: check the model solution",
            artifacts.unavailable_slots
        );
    }

    let (pass, fail, error) = artifacts.verdict_counts();
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} students, {} slots passed, {} failed, {} error",
        artifacts.reports.len(),
        pass,
        fail,
        error
    );
}
