//! Row source boundary
//!
//! Statement preparation, execution and driver selection live behind these
//! traits. The pipeline only needs to run a statement and read rows back.

use serde_json::Value;

use crate::value::Fields;

/// Error raised by a row source
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for row source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// A prepared statement
pub trait Statement {
    /// Binds a named parameter
    fn bind_value(&mut self, key: &str, value: &Value) -> SourceResult<()>;

    /// Runs the statement; a second call runs it again
    fn execute(&mut self) -> SourceResult<bool>;

    /// Next row, or `None` when exhausted
    fn fetch(&mut self) -> SourceResult<Option<Fields>>;

    /// All remaining rows
    fn fetch_all(&mut self) -> SourceResult<Vec<Fields>>;

    /// Number of selected columns
    fn column_count(&self) -> usize;
}

/// A source of prepared statements
pub trait Database {
    /// Prepares `sql` against the named schema (or the default one)
    fn prepare(&self, schema: Option<&str>, sql: &str) -> SourceResult<Box<dyn Statement>>;

    /// Id generated by the most recent insert on the schema's primary
    fn last_insert_id(&self, schema: Option<&str>) -> SourceResult<i64>;
}
