//! Pre-submission format check.
//!
//! Markers decide PASS/FAIL. A missing semicolon or an engine-reported syntax
//! problem only ever produces a warning.

use crate::db::SqlEngine;
use crate::extract::{extract_slot, marker, Extraction};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotCheck {
    pub slot: usize,
    pub status: FormatStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatReport {
    pub all_passed: bool,
    pub slots: Vec<SlotCheck>,
}

impl FormatReport {
    pub fn failures(&self) -> impl Iterator<Item = &SlotCheck> {
        self.slots.iter().filter(|s| s.status == FormatStatus::Fail)
    }
}

const SYNTAX_EXCERPT: usize = 100;

/// Check markers `1..=expected`. With an engine, each query is also compiled
/// (never executed) as an advisory syntax check.
pub fn check_format(
    content: &str,
    expected: usize,
    mut syntax: Option<&mut dyn SqlEngine>,
) -> FormatReport {
    let mut slots = Vec::with_capacity(expected);
    for slot in 1..=expected {
        let check = match extract_slot(content, slot) {
            Extraction::Missing => SlotCheck {
                slot,
                status: FormatStatus::Fail,
                message: format!("Marker {} is missing.", marker(slot)),
            },
            Extraction::Empty => SlotCheck {
                slot,
                status: FormatStatus::Fail,
                message: format!("Marker {} found, but no query follows it.", marker(slot)),
            },
            Extraction::Query(q) => {
                let mut notes = Vec::new();
                if !q.ends_with(';') {
                    notes.push("Marker found, but query might be missing a semicolon.".to_string());
                }
                if let Some(engine) = syntax.as_deref_mut() {
                    if let Err(e) = engine.check_syntax(&q) {
                        let text = e.to_string();
                        let excerpt: String = text.chars().take(SYNTAX_EXCERPT).collect();
                        notes.push(format!("Potential syntax error: {}...", excerpt));
                    }
                }
                if notes.is_empty() {
                    SlotCheck {
                        slot,
                        status: FormatStatus::Pass,
                        message: "Correctly formatted.".into(),
                    }
                } else {
                    SlotCheck {
                        slot,
                        status: FormatStatus::Warn,
                        message: notes.join(" "),
                    }
                }
            }
        };
        slots.push(check);
    }

    FormatReport {
        all_passed: slots.iter().all(|s| s.status != FormatStatus::Fail),
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteEngine;
    use crate::isolation::Schema;

    #[test]
    fn test_pass_and_semicolon_warning() {
        let r = check_format("--1--\nSELECT 1;\n--2--\nSELECT 2", 2, None);
        assert!(r.all_passed);
        assert_eq!(r.slots[0].status, FormatStatus::Pass);
        assert_eq!(r.slots[0].message, "Correctly formatted.");
        assert_eq!(r.slots[1].status, FormatStatus::Warn);
    }

    #[test]
    fn test_missing_and_empty_markers_fail() {
        let r = check_format("--1--\n\n", 2, None);
        assert!(!r.all_passed);
        assert_eq!(r.slots[0].message, "Marker --1-- found, but no query follows it.");
        assert_eq!(r.slots[1].message, "Marker --2-- is missing.");
        assert_eq!(r.failures().count(), 2);
    }

    #[test]
    fn test_syntax_problem_is_only_a_warning() -> anyhow::Result<()> {
        let mut db = SqliteEngine::open_in_memory()?;
        Schema::from_script("CREATE TABLE Student (id INTEGER);").reset(&mut db)?;

        let r = check_format(
            "--1--\nSELEC id FROM Student;\n--2--\nSELECT id FROM Student;",
            2,
            Some(&mut db),
        );
        assert!(r.all_passed);
        assert_eq!(r.slots[0].status, FormatStatus::Warn);
        assert!(r.slots[0].message.starts_with("Potential syntax error:"));
        assert_eq!(r.slots[1].status, FormatStatus::Pass);
        Ok(())
    }
}
