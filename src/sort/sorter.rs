//! Default multi-key result sorter
//!
//! Stable: rows equal on every key keep their input order.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

use crate::observability::{Event, Logger};
use crate::value::{loose_cmp, Row};

use super::{SortDirection, SortEngine, SortKey};

/// Column used as the implicit tie-breaker for id extraction
const ID_COLUMN: &str = "id";

/// Sorts rows by declared keys using loose ordering
#[derive(Debug, Default)]
pub struct ResultSorter {
    keys: Vec<SortKey>,
    id_tiebreak: bool,
}

impl ResultSorter {
    /// Creates a sorter with no keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared keys in precedence order
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns true while prepared for id extraction and not yet processed
    pub fn breaks_ties_by_id(&self) -> bool {
        self.id_tiebreak
    }

    /// Compares two rows on one key.
    ///
    /// Ordering rules:
    /// - missing values sort before present ones
    /// - present values use loose ordering
    /// - unordered pairs (arrays, objects) are equal
    fn compare(a: &Row, b: &Row, key: &SortKey) -> Ordering {
        let a_val = Self::key_value(a, &key.column);
        let b_val = Self::key_value(b, &key.column);

        let ordering = match (a_val, b_val) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => loose_cmp(&a_val, &b_val).unwrap_or(Ordering::Equal),
        };

        match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    fn key_value<'a>(row: &'a Row, column: &str) -> Option<Cow<'a, Value>> {
        match row {
            Row::Columns(record) => record.value(column),
            Row::Scalar(value) => Some(Cow::Borrowed(value)),
        }
    }
}

impl SortEngine for ResultSorter {
    fn add(&mut self, column: &str, direction: SortDirection) {
        self.keys.push(SortKey {
            column: column.to_string(),
            direction,
        });
    }

    /// Orders `rows`. An id tie-break applies to this call only.
    fn process(&mut self, mut rows: Vec<Row>) -> Vec<Row> {
        let tiebreak = SortKey::asc(ID_COLUMN);
        let break_ties = std::mem::take(&mut self.id_tiebreak);
        let keys: Vec<&SortKey> = self
            .keys
            .iter()
            .chain(break_ties.then_some(&tiebreak))
            .collect();

        rows.sort_by(|a, b| {
            keys.iter()
                .map(|key| Self::compare(a, b, key))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let (count, key_count) = (rows.len().to_string(), keys.len().to_string());
        Logger::trace(
            Event::SortApplied.as_str(),
            &[("keys", key_count.as_str()), ("rows", count.as_str())],
        );

        rows
    }

    fn prepare_for_id_extraction(&mut self) {
        self.id_tiebreak = true;
    }
}
