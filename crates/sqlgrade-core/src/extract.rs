//! Splits one submission file into per-slot query texts.
//!
//! A slot `i` starts at the first literal `--i--` in the file. Its payload runs
//! until the next `--<digits>--` marker of any number, or end of file.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Trimmed, non-empty query text.
    Query(String),
    /// Marker present but only whitespace follows it.
    Empty,
    /// Marker not found anywhere in the file.
    Missing,
}

impl Extraction {
    pub fn query(&self) -> Option<&str> {
        match self {
            Extraction::Query(q) => Some(q),
            Extraction::Empty | Extraction::Missing => None,
        }
    }

    /// Why there is nothing to grade, or `None` when a query is present.
    pub fn absence_reason(&self, slot: usize) -> Option<String> {
        match self {
            Extraction::Query(_) => None,
            Extraction::Empty => Some(format!(
                "marker {} found, but no query follows it",
                marker(slot)
            )),
            Extraction::Missing => Some(format!("marker {} is missing", marker(slot))),
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Query(q) => f.write_str(q),
            Extraction::Empty => f.write_str("(empty)"),
            Extraction::Missing => f.write_str("(missing)"),
        }
    }
}

pub fn marker(slot: usize) -> String {
    format!("--{}--", slot)
}

/// Extract slots `1..=expected` from `content`.
pub fn extract_queries(content: &str, expected: usize) -> BTreeMap<usize, Extraction> {
    (1..=expected)
        .map(|slot| (slot, extract_slot(content, slot)))
        .collect()
}

/// Extract a single slot. Only the first occurrence of the marker counts.
pub fn extract_slot(content: &str, slot: usize) -> Extraction {
    let m = marker(slot);
    let Some(start) = content.find(&m) else {
        return Extraction::Missing;
    };
    let body_start = start + m.len();
    let body_end = next_marker(content, body_start).unwrap_or(content.len());
    let payload = content[body_start..body_end].trim();
    if payload.is_empty() {
        Extraction::Empty
    } else {
        Extraction::Query(payload.to_string())
    }
}

/// Byte offset of the next `--<digits>--` at or after `from`.
fn next_marker(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'-' && bytes[i + 1] == b'-' && is_marker_at(bytes, i) {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn is_marker_at(bytes: &[u8], at: usize) -> bool {
    let mut j = at + 2;
    let digits_start = j;
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    j > digits_start && bytes.get(j) == Some(&b'-') && bytes.get(j + 1) == Some(&b'-')
}
