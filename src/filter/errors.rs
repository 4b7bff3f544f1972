//! Filter error types
//!
//! Error codes:
//! - ROWSIFT_UNSUPPORTED_COMPARISON
//! - ROWSIFT_INVALID_PATTERN
//! - ROWSIFT_FULLTEXT_SINGLE_COLUMN
//! - ROWSIFT_NOT_A_PREDICATE

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Comparison token is not one of the supported operators
    #[error("Unsupported comparison: {0}")]
    UnsupportedComparison(String),

    /// Pattern text could not be parsed
    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(String),

    /// Fulltext scoring needs a named column to annotate
    #[error("you cannot filter by fulltext when selecting a single column")]
    FullTextOnSingleColumn,

    /// A scoring pattern was evaluated as a boolean predicate
    #[error("{0} patterns score rows and cannot be matched")]
    NotAPredicate(&'static str),
}

impl FilterError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::UnsupportedComparison(_) => "ROWSIFT_UNSUPPORTED_COMPARISON",
            FilterError::InvalidPattern(_) => "ROWSIFT_INVALID_PATTERN",
            FilterError::FullTextOnSingleColumn => "ROWSIFT_FULLTEXT_SINGLE_COLUMN",
            FilterError::NotAPredicate(_) => "ROWSIFT_NOT_A_PREDICATE",
        }
    }
}
