//! Query error types
//!
//! Error codes:
//! - ROWSIFT_EMPTY_SQL
//! - ROWSIFT_DUPLICATE_BIND
//! - ROWSIFT_PREPARE_FAILED
//! - ROWSIFT_EXECUTION_FAILED
//! - ROWSIFT_FETCH_FAILED
//! - ROWSIFT_HYDRATION_FAILED
//! - filter codes, passed through

use thiserror::Error;

use crate::filter::FilterError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query errors
#[derive(Debug, Error)]
pub enum QueryError {
    // ==================
    // Configuration errors
    // ==================
    /// Query constructed without SQL text
    #[error("you need to pass in sql to be executed!")]
    EmptySql,

    /// Parameter key bound twice on one query
    #[error("You have already bound {0} to this query.")]
    DuplicateBind(String),

    // ==================
    // Source failures
    // ==================
    /// The source could not prepare the statement
    #[error("Prepare failed: {0}")]
    Prepare(String),

    /// The source failed while binding or executing; carries its message
    #[error("{0}")]
    Execution(String),

    /// The source failed while producing rows
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A fetched row could not be turned into the requested type
    #[error("Hydration failed: {0}")]
    Hydration(#[from] serde_json::Error),

    // ==================
    // Post-fetch processing
    // ==================
    /// Filter configuration or evaluation error
    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl QueryError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::EmptySql => "ROWSIFT_EMPTY_SQL",
            QueryError::DuplicateBind(_) => "ROWSIFT_DUPLICATE_BIND",
            QueryError::Prepare(_) => "ROWSIFT_PREPARE_FAILED",
            QueryError::Execution(_) => "ROWSIFT_EXECUTION_FAILED",
            QueryError::Fetch(_) => "ROWSIFT_FETCH_FAILED",
            QueryError::Hydration(_) => "ROWSIFT_HYDRATION_FAILED",
            QueryError::Filter(err) => err.code(),
        }
    }

    /// Returns true for caller mistakes, as opposed to source failures
    pub fn is_configuration(&self) -> bool {
        match self {
            QueryError::EmptySql | QueryError::DuplicateBind(_) => true,
            QueryError::Filter(FilterError::UnsupportedComparison(_))
            | QueryError::Filter(FilterError::InvalidPattern(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(QueryError::EmptySql.code(), "ROWSIFT_EMPTY_SQL");
        assert_eq!(
            QueryError::Filter(FilterError::FullTextOnSingleColumn).code(),
            "ROWSIFT_FULLTEXT_SINGLE_COLUMN"
        );
    }

    #[test]
    fn test_execution_error_carries_message() {
        let err = QueryError::Execution("table users does not exist".to_string());
        assert_eq!(err.to_string(), "table users does not exist");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(QueryError::DuplicateBind(":id".into()).is_configuration());
        assert!(QueryError::from(FilterError::UnsupportedComparison("~".into())).is_configuration());
        assert!(!QueryError::from(FilterError::FullTextOnSingleColumn).is_configuration());
    }
}
