use crate::model::{ScoreRow, SubmissionReport, Verdict};

pub mod console;
pub mod csv;
pub mod json;
pub mod log;

/// Everything a finished grading run produced.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub expected_queries: usize,
    /// Slots whose model query was missing or failed.
    pub unavailable_slots: Vec<usize>,
    pub reports: Vec<SubmissionReport>,
}

impl RunArtifacts {
    pub fn score_rows(&self) -> Vec<ScoreRow> {
        self.reports.iter().map(SubmissionReport::score_row).collect()
    }

    /// (pass, fail, error) counts across every graded slot.
    pub fn verdict_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for o in self.reports.iter().flat_map(|r| &r.outcomes) {
            match o.verdict {
                Verdict::Pass => counts.0 += 1,
                Verdict::Fail => counts.1 += 1,
                Verdict::Error => counts.2 += 1,
            }
        }
        counts
    }
}
