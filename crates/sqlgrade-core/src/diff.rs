use crate::model::{NormalizedResult, Row, Verdict};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// The model solution produced nothing for this slot.
    NoExpected,
    /// The submission produced nothing for this slot.
    NoActual,
    Columns {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// In expected, not in actual.
    MissingRows(BTreeSet<Row>),
    /// In actual, not in expected.
    ExtraRows(BTreeSet<Row>),
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &BTreeSet<Row>) -> fmt::Result {
    for r in rows {
        write!(f, "\n  {}", r)?;
    }
    Ok(())
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::NoExpected => f.write_str("no expected result provided"),
            Discrepancy::NoActual => f.write_str("no actual result"),
            Discrepancy::Columns { expected, actual } => write!(
                f,
                "Column mismatch:\nExpected: [{}]\nActual:   [{}]",
                expected.join(", "),
                actual.join(", ")
            ),
            Discrepancy::MissingRows(rows) => {
                write!(f, "Missing rows ({}):", rows.len())?;
                write_rows(f, rows)
            }
            Discrepancy::ExtraRows(rows) => {
                write!(f, "Extra rows ({}):", rows.len())?;
                write_rows(f, rows)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub discrepancies: Vec<Discrepancy>,
}

impl Comparison {
    pub fn verdict(&self) -> Verdict {
        if self.discrepancies.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn missing(&self) -> Option<&BTreeSet<Row>> {
        self.discrepancies.iter().find_map(|d| match d {
            Discrepancy::MissingRows(r) => Some(r),
            _ => None,
        })
    }

    pub fn extra(&self) -> Option<&BTreeSet<Row>> {
        self.discrepancies.iter().find_map(|d| match d {
            Discrepancy::ExtraRows(r) => Some(r),
            _ => None,
        })
    }

    pub fn has_column_mismatch(&self) -> bool {
        self.discrepancies
            .iter()
            .any(|d| matches!(d, Discrepancy::Columns { .. }))
    }

    /// Human-readable text, one paragraph per discrepancy.
    pub fn describe(&self) -> String {
        self.discrepancies
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Diff an actual result against the expected one.
///
/// Rows are compared as sets, so order and duplicates are ignored. Cell
/// equality is exact: no numeric tolerance and no type coercion.
pub fn compare(expected: Option<&NormalizedResult>, actual: Option<&NormalizedResult>) -> Comparison {
    let Some(expected) = expected else {
        return Comparison {
            discrepancies: vec![Discrepancy::NoExpected],
        };
    };
    let Some(actual) = actual else {
        return Comparison {
            discrepancies: vec![Discrepancy::NoActual],
        };
    };

    let mut discrepancies = Vec::new();
    if expected.columns != actual.columns {
        discrepancies.push(Discrepancy::Columns {
            expected: expected.columns.clone(),
            actual: actual.columns.clone(),
        });
    }

    let exp: BTreeSet<&Row> = expected.rows.iter().collect();
    let act: BTreeSet<&Row> = actual.rows.iter().collect();

    let missing: BTreeSet<Row> = exp.difference(&act).map(|r| (*r).clone()).collect();
    let extra: BTreeSet<Row> = act.difference(&exp).map(|r| (*r).clone()).collect();

    if !missing.is_empty() {
        discrepancies.push(Discrepancy::MissingRows(missing));
    }
    if !extra.is_empty() {
        discrepancies.push(Discrepancy::ExtraRows(extra));
    }

    Comparison { discrepancies }
}
