use crate::model::{ExecutionResult, NormalizedResult};

/// Sort rows into canonical order. Column names are kept exactly as returned.
pub fn normalize(result: ExecutionResult) -> NormalizedResult {
    let mut rows = result.rows;
    rows.sort();
    NormalizedResult {
        columns: result.columns,
        rows,
    }
}

pub fn normalize_opt(result: Option<ExecutionResult>) -> Option<NormalizedResult> {
    result.map(normalize)
}

impl From<NormalizedResult> for ExecutionResult {
    fn from(n: NormalizedResult) -> Self {
        ExecutionResult {
            columns: n.columns,
            rows: n.rows,
        }
    }
}
