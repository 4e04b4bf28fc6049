use crate::config::path_resolver::is_in_memory;
use crate::db::{SqlEngine, SqliteEngine};
use crate::diff::compare;
use crate::extract::{extract_slot, Extraction};
use crate::isolation::Schema;
use crate::model::{GradeConfig, NormalizedResult, SlotOutcome, Submission, SubmissionReport, Verdict};
use crate::normalize::normalize;
use crate::report::RunArtifacts;
use anyhow::Context;

/// Cached model-solution results, one entry per slot.
#[derive(Debug, Clone)]
pub struct ExpectedResults {
    slots: Vec<Option<NormalizedResult>>,
}

impl ExpectedResults {
    pub fn get(&self, slot: usize) -> Option<&NormalizedResult> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .and_then(Option::as_ref)
    }

    /// Slots nobody can pass until the model file is fixed.
    pub fn unavailable_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| i + 1)
            .collect()
    }
}

/// Sequences reset, extraction, execution, normalization and diff.
///
/// Owns the single engine for the whole run; every execution goes through a
/// fresh schema reset.
pub struct Grader {
    engine: Box<dyn SqlEngine>,
    schema: Schema,
    expected_queries: usize,
}

impl Grader {
    pub fn new(engine: Box<dyn SqlEngine>, schema: Schema, expected_queries: usize) -> Self {
        Self {
            engine,
            schema,
            expected_queries,
        }
    }

    pub fn expected_queries(&self) -> usize {
        self.expected_queries
    }

    /// Run the model solution slot by slot.
    ///
    /// A missing or failing model query leaves that slot without an expected
    /// result. A schema reset failure here is fatal.
    pub fn prepare_expected(&mut self, model_text: &str) -> anyhow::Result<ExpectedResults> {
        let mut slots = Vec::with_capacity(self.expected_queries);
        for slot in 1..=self.expected_queries {
            let fresh = self
                .schema
                .reset(self.engine.as_mut())
                .context("schema reset failed while preparing expected results")?;

            let extraction = extract_slot(model_text, slot);
            let Some(query) = extraction.query() else {
                tracing::warn!(
                    event = "model_query_absent",
                    slot,
                    reason = %extraction.absence_reason(slot).unwrap_or_default()
                );
                slots.push(None);
                continue;
            };

            match fresh.run(query) {
                Ok(raw) => slots.push(Some(normalize(raw))),
                Err(e) => {
                    tracing::warn!(event = "model_query_failed", slot, error = %format!("{:#}", e));
                    slots.push(None);
                }
            }
        }
        Ok(ExpectedResults { slots })
    }

    /// Grade every slot of one submission. Never fails: problems become verdicts.
    pub fn grade_submission(
        &mut self,
        submission: &Submission,
        expected: &ExpectedResults,
    ) -> SubmissionReport {
        let outcomes = (1..=self.expected_queries)
            .map(|slot| {
                let outcome = self.grade_slot(&submission.content, slot, expected.get(slot));
                tracing::debug!(
                    event = "slot_graded",
                    student_id = %submission.student_id,
                    slot,
                    verdict = %outcome.verdict
                );
                outcome
            })
            .collect();

        SubmissionReport {
            student_id: submission.student_id.clone(),
            outcomes,
        }
    }

    fn grade_slot(
        &mut self,
        content: &str,
        slot: usize,
        expected: Option<&NormalizedResult>,
    ) -> SlotOutcome {
        let mut outcome = SlotOutcome {
            slot,
            verdict: Verdict::Fail,
            expected: expected.cloned(),
            actual: None,
            message: String::new(),
        };

        let fresh = match self.schema.reset(self.engine.as_mut()) {
            Ok(f) => f,
            Err(e) => {
                outcome.verdict = Verdict::Error;
                outcome.message = format!("{:#}", e);
                return outcome;
            }
        };

        let query = match extract_slot(content, slot) {
            Extraction::Query(q) => q,
            absent => {
                outcome.message = absent.absence_reason(slot).unwrap_or_default();
                return outcome;
            }
        };

        match fresh.run(&query) {
            Ok(raw) => {
                let actual = normalize(raw);
                let cmp = compare(expected, Some(&actual));
                outcome.verdict = cmp.verdict();
                outcome.message = cmp.describe();
                outcome.actual = Some(actual);
            }
            Err(e) => {
                outcome.verdict = Verdict::Error;
                outcome.message = format!("{:#}", e);
            }
        }
        outcome
    }
}

/// Full batch run against the configured SQLite database.
pub fn run(cfg: &GradeConfig) -> anyhow::Result<RunArtifacts> {
    if !is_in_memory(&cfg.database) {
        if let Some(parent) = cfg.database.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let engine = SqliteEngine::open(&cfg.database)?;
    run_with_engine(cfg, Box::new(engine))
}

/// Full batch run: expected results, every submission, logs, then the CSV report.
pub fn run_with_engine(cfg: &GradeConfig, engine: Box<dyn SqlEngine>) -> anyhow::Result<RunArtifacts> {
    let schema = Schema::load(&cfg.schema_file)?;
    let model_text = std::fs::read_to_string(&cfg.model_file)
        .with_context(|| format!("failed to read model solution {}", cfg.model_file.display()))?;

    let mut grader = Grader::new(engine, schema, cfg.expected_queries);
    let expected = grader.prepare_expected(&model_text)?;
    let unavailable = expected.unavailable_slots();
    if !unavailable.is_empty() {
        tracing::warn!(event = "expected_unavailable", slots = ?unavailable);
    }

    let submissions = crate::submission::discover(&cfg.submissions_dir)?;
    std::fs::create_dir_all(&cfg.logs_dir)
        .with_context(|| format!("failed to create logs dir {}", cfg.logs_dir.display()))?;

    let mut reports = Vec::with_capacity(submissions.len());
    for sub in &submissions {
        tracing::info!(event = "grading", student_id = %sub.student_id);
        let report = grader.grade_submission(sub, &expected);
        crate::report::log::write_submission_log(&report, &cfg.logs_dir)?;
        tracing::info!(
            event = "graded",
            student_id = %report.student_id,
            passed = report.passed(),
            total = cfg.expected_queries
        );
        reports.push(report);
    }

    let artifacts = RunArtifacts {
        expected_queries: cfg.expected_queries,
        unavailable_slots: unavailable,
        reports,
    };
    crate::report::csv::write_report(&artifacts, &cfg.report_file)?;
    Ok(artifacts)
}
