//! Post-fetch sorting
//!
//! The coordinator only talks to sorting through [`SortEngine`]; the
//! comparator behind it is pluggable. [`ResultSorter`] is the default.

mod sorter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value::Row;

pub use sorter::ResultSorter;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction: {}", other)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Column to sort by (`score` and `<column>_score` included)
    pub column: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sorting contract consumed by the query coordinator
pub trait SortEngine {
    /// Appends a sort key; earlier keys take precedence
    fn add(&mut self, column: &str, direction: SortDirection);

    /// Orders `rows`
    fn process(&mut self, rows: Vec<Row>) -> Vec<Row>;

    /// Called before rows are reduced to their ids; affects the next
    /// [`SortEngine::process`] call only
    fn prepare_for_id_extraction(&mut self);
}
