use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeConfig {
    pub version: u32,
    pub expected_queries: usize,
    #[serde(default = "defaults::schema_file")]
    pub schema_file: PathBuf,
    #[serde(default = "defaults::model_file")]
    pub model_file: PathBuf,
    #[serde(default = "defaults::submissions_dir")]
    pub submissions_dir: PathBuf,
    #[serde(default = "defaults::logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "defaults::report_file")]
    pub report_file: PathBuf,
    /// Database the grading queries run against; `:memory:` is allowed.
    #[serde(default = "defaults::database")]
    pub database: PathBuf,
    #[serde(default)]
    pub intake: IntakeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSettings {
    #[serde(default = "defaults::tracking_file")]
    pub tracking_file: PathBuf,
    #[serde(default = "defaults::events_file")]
    pub events_file: PathBuf,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            tracking_file: defaults::tracking_file(),
            events_file: defaults::events_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn schema_file() -> PathBuf {
        "schema.sql".into()
    }
    pub fn model_file() -> PathBuf {
        "model_solution.sql".into()
    }
    pub fn submissions_dir() -> PathBuf {
        "queries".into()
    }
    pub fn logs_dir() -> PathBuf {
        "logs".into()
    }
    pub fn report_file() -> PathBuf {
        "results.csv".into()
    }
    pub fn database() -> PathBuf {
        ".grade/grade.db".into()
    }
    pub fn tracking_file() -> PathBuf {
        "submissions_tracking.json".into()
    }
    pub fn events_file() -> PathBuf {
        "submission_events.log".into()
    }
}

/// A single value returned by the execution capability.
///
/// Ordering follows the engine's native collation: `NULL` sorts first, then
/// numbers, then text, then blobs. Equality is exact, so `Integer(1)` and
/// `Real(1.0)` are different values; on a numeric tie the integer sorts first.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    fn class_rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Integer(_) | Cell::Real(_) => 1,
            Cell::Text(_) => 2,
            Cell::Blob(_) => 3,
        }
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        use Cell::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Real(a), Real(b)) => a.total_cmp(b),
            (Integer(a), Real(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Real(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            (Blob(a), Blob(b)) => a.cmp(b),
            _ => self.class_rank().cmp(&other.class_rank()),
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{:?}", v),
            Cell::Text(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Cell::Blob(b) => {
                f.write_str("x'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                f.write_str("'")
            }
        }
    }
}

/// One result tuple. Rows compare lexicographically over their cells.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Row(pub Vec<Cell>);

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row(cells)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", c)?;
        }
        f.write_str(")")
    }
}

/// Raw output of one statement: column names in order plus the rows as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Rows placed in canonical sorted order; columns kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl fmt::Display for NormalizedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "columns: [{}]", self.columns.join(", "))?;
        writeln!(f, "rows ({}):", self.rows.len())?;
        for r in &self.rows {
            writeln!(f, "  {}", r)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
    Error,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Label used in the aggregate report; an ERROR counts as FAIL there.
    pub fn score_label(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail | Verdict::Error => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Error => "ERROR",
        })
    }
}

/// A student file discovered in the submissions directory.
#[derive(Debug, Clone)]
pub struct Submission {
    pub student_id: String,
    pub file_name: String,
    pub content: String,
}

/// Diagnostic report for one (submission, slot) pair.
#[derive(Debug, Clone)]
pub struct SlotOutcome {
    pub slot: usize,
    pub verdict: Verdict,
    pub expected: Option<NormalizedResult>,
    pub actual: Option<NormalizedResult>,
    /// Discrepancy text for FAIL, exception chain for ERROR, empty for PASS.
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub student_id: String,
    pub outcomes: Vec<SlotOutcome>,
}

impl SubmissionReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_pass()).count()
    }

    pub fn score_row(&self) -> ScoreRow {
        ScoreRow {
            student_id: self.student_id.clone(),
            verdicts: self.outcomes.iter().map(|o| o.verdict).collect(),
        }
    }
}

/// One line of the aggregate report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub student_id: String,
    pub verdicts: Vec<Verdict>,
}

impl ScoreRow {
    pub fn passed(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_pass()).count()
    }

    pub fn total(&self) -> String {
        format!("{}/{}", self.passed(), self.verdicts.len())
    }

    /// Identifier, one cell per slot, then the `k/N` total.
    pub fn to_record(&self) -> Vec<String> {
        let mut rec = Vec::with_capacity(self.verdicts.len() + 2);
        rec.push(self.student_id.clone());
        rec.extend(self.verdicts.iter().map(|v| v.score_label().to_string()));
        rec.push(self.total());
        rec
    }
}
