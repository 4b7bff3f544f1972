//! Fulltext relevance scoring
//!
//! Each fulltext pattern rates how similar a column is to its search term,
//! as a percentage:
//!
//! - short operands use normalized edit distance,
//!   `100 * (1 - levenshtein(a, b) / max(len(a), len(b)))`
//! - once either operand reaches the long-text threshold, edit distance is
//!   too expensive and the common-run similarity `2 * common / (len(a) + len(b))`
//!   is used instead
//!
//! The percentage is written to `<column>_score` and its weighted share is
//! added to the row's aggregate `score`. Lengths are in bytes.

use serde::{Deserialize, Serialize};

use crate::value::loose::to_text;
use crate::value::Row;

use super::errors::{FilterError, FilterResult};
use super::pattern::Pattern;

/// Operand length (bytes) from which common-run similarity replaces edit distance
pub const DEFAULT_LONG_TEXT_THRESHOLD: usize = 255;

/// Percentage assigned when both operands are empty
pub const DEFAULT_EMPTY_TEXT_SCORE: f64 = 100.0;

/// Tunables for relevance scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringOptions {
    /// Operand length at which scoring switches algorithms
    pub long_text_threshold: usize,
    /// Score for two empty operands
    pub empty_text_score: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
            empty_text_score: DEFAULT_EMPTY_TEXT_SCORE,
        }
    }
}

/// Edit distance with unit insert, delete and replace costs
pub fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let replace = previous[j] + usize::from(ca != cb);
            let insert = current[j] + 1;
            let delete = previous[j + 1] + 1;
            current[j + 1] = replace.min(insert).min(delete);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Finds the first longest common run: `(pos_a, pos_b, len)`
fn longest_common_run(a: &[u8], b: &[u8]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    for i in 0..a.len() {
        // No run starting here can beat the current best
        if a.len() - i <= best.2 {
            break;
        }
        for j in 0..b.len() {
            let len = a[i..]
                .iter()
                .zip(&b[j..])
                .take_while(|(x, y)| x == y)
                .count();
            if len > best.2 {
                best = (i, j, len);
            }
        }
    }
    best
}

/// Number of bytes the two inputs have in common.
///
/// Takes the first longest common run, then repeats on the remainders to
/// its left and to its right.
pub fn similar_text(a: &[u8], b: &[u8]) -> usize {
    let mut common = 0;
    let mut pending = vec![(a, b)];

    while let Some((a, b)) = pending.pop() {
        let (pos_a, pos_b, len) = longest_common_run(a, b);
        if len == 0 {
            continue;
        }
        common += len;
        if pos_a > 0 && pos_b > 0 {
            pending.push((&a[..pos_a], &b[..pos_b]));
        }
        if pos_a + len < a.len() && pos_b + len < b.len() {
            pending.push((&a[pos_a + len..], &b[pos_b + len..]));
        }
    }

    common
}

/// Similarity of two strings in the range 0 to 100
pub fn similarity_percent(a: &str, b: &str, options: &ScoringOptions) -> f64 {
    let (a, b) = (a.as_bytes(), b.as_bytes());

    if a.len() >= options.long_text_threshold || b.len() >= options.long_text_threshold {
        let total = a.len() + b.len();
        return (similar_text(a, b) * 2) as f64 * 100.0 / total as f64;
    }

    let longest = a.len().max(b.len());
    if longest == 0 {
        return options.empty_text_score;
    }

    100.0 * (1.0 - levenshtein(a, b) as f64 / longest as f64)
}

/// Scores one row against one fulltext pattern.
///
/// Writes `<column>_score` and adds `percent * weight / total_weight` to the
/// row's `score`, which starts at 0. A non-positive `total_weight` adds
/// nothing. Single-column rows have no column to annotate and are rejected.
pub fn score_full_text(
    row: Row,
    pattern: &Pattern,
    total_weight: f64,
    options: &ScoringOptions,
) -> FilterResult<Row> {
    let mut record = match row {
        Row::Columns(record) => record,
        Row::Scalar(_) => return Err(FilterError::FullTextOnSingleColumn),
    };

    let column = pattern.column().ok_or_else(|| {
        FilterError::InvalidPattern(format!("{} (fulltext needs a column)", pattern))
    })?;

    let text = record
        .value(column)
        .map(|v| to_text(&v).into_owned())
        .unwrap_or_default();

    let percent = similarity_percent(&text, pattern.value(), options);
    let contribution = if total_weight > 0.0 {
        percent * (pattern.weight() / total_weight)
    } else {
        0.0
    };

    record.relevance_mut().record(column, percent, contribution);
    Ok(Row::Columns(record))
}
