//! In-memory row source
//!
//! Maps SQL text to a fixed result set. Used by the CLI and by tests; it
//! does not parse SQL.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::value::Fields;

use super::source::{Database, SourceError, SourceResult, Statement};

/// Column name given to rows built from bare scalars
pub const SCALAR_COLUMN: &str = "value";

/// Error raised by the in-memory source
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryError(String);

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MemoryError {}

fn source_error(message: impl Into<String>) -> SourceError {
    Box::new(MemoryError(message.into()))
}

/// A fixed result set: column names and rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Fields>,
}

impl ResultSet {
    /// Creates an empty result set with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Columns it lacks are filled with null.
    pub fn push(&mut self, mut fields: Fields) {
        if self.columns.is_empty() {
            self.columns = fields.keys().cloned().collect();
        }
        for column in &self.columns {
            if !fields.contains_key(column) {
                fields.insert(column.clone(), Value::Null);
            }
        }
        self.rows.push(fields);
    }

    /// Builds a result set from a JSON array.
    ///
    /// Objects become rows and the first object's keys name the columns.
    /// Any other element becomes a single-column row under [`SCALAR_COLUMN`].
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let items = value
            .as_array()
            .ok_or_else(|| "rows must be a JSON array".to_string())?;

        let mut set = ResultSet::default();
        let scalar = items.first().map(|v| !v.is_object()).unwrap_or(false);
        if scalar {
            set.columns = vec![SCALAR_COLUMN.to_string()];
        }

        for (index, item) in items.iter().enumerate() {
            match (scalar, item) {
                (false, Value::Object(fields)) => set.push(fields.clone()),
                (true, item) if !item.is_object() => {
                    let mut fields = Fields::new();
                    fields.insert(SCALAR_COLUMN.to_string(), item.clone());
                    set.rows.push(fields);
                }
                _ => {
                    return Err(format!(
                        "row {} does not match the shape of the first row",
                        index
                    ))
                }
            }
        }

        Ok(set)
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows
    pub fn rows(&self) -> &[Fields] {
        &self.rows
    }
}

/// One recorded statement execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub schema: Option<String>,
    pub sql: String,
    pub binds: Fields,
}

/// Row source backed by registered result sets
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    results: RefCell<HashMap<String, ResultSet>>,
    failures: RefCell<HashMap<String, String>>,
    last_insert_id: Cell<i64>,
    executions: Rc<RefCell<Vec<ExecutionRecord>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows returned for `sql`
    pub fn register(&self, sql: impl Into<String>, result: ResultSet) {
        self.results.borrow_mut().insert(sql.into(), result);
    }

    /// Makes every execution of `sql` fail with `message`
    pub fn fail_with(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.failures.borrow_mut().insert(sql.into(), message.into());
    }

    pub fn set_last_insert_id(&self, id: i64) {
        self.last_insert_id.set(id);
    }

    /// Executions so far, oldest first
    pub fn executions(&self) -> Vec<ExecutionRecord> {
        self.executions.borrow().clone()
    }
}

impl Database for MemoryDatabase {
    fn prepare(&self, schema: Option<&str>, sql: &str) -> SourceResult<Box<dyn Statement>> {
        let result = self
            .results
            .borrow()
            .get(sql)
            .cloned()
            .ok_or_else(|| source_error(format!("no result set registered for: {}", sql)))?;

        Ok(Box::new(MemoryStatement {
            schema: schema.map(str::to_string),
            sql: sql.to_string(),
            result,
            failure: self.failures.borrow().get(sql).cloned(),
            binds: Fields::new(),
            cursor: None,
            executions: Rc::clone(&self.executions),
        }))
    }

    fn last_insert_id(&self, _schema: Option<&str>) -> SourceResult<i64> {
        Ok(self.last_insert_id.get())
    }
}

struct MemoryStatement {
    schema: Option<String>,
    sql: String,
    result: ResultSet,
    failure: Option<String>,
    binds: Fields,
    /// Next row to return; `None` until executed
    cursor: Option<usize>,
    executions: Rc<RefCell<Vec<ExecutionRecord>>>,
}

impl MemoryStatement {
    fn cursor(&self) -> SourceResult<usize> {
        self.cursor
            .ok_or_else(|| source_error("statement has not been executed"))
    }
}

impl Statement for MemoryStatement {
    fn bind_value(&mut self, key: &str, value: &Value) -> SourceResult<()> {
        self.binds.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn execute(&mut self) -> SourceResult<bool> {
        self.executions.borrow_mut().push(ExecutionRecord {
            schema: self.schema.clone(),
            sql: self.sql.clone(),
            binds: self.binds.clone(),
        });

        if let Some(message) = &self.failure {
            return Err(source_error(message.clone()));
        }

        self.cursor = Some(0);
        Ok(true)
    }

    fn fetch(&mut self) -> SourceResult<Option<Fields>> {
        let cursor = self.cursor()?;
        let row = self.result.rows.get(cursor).cloned();
        if row.is_some() {
            self.cursor = Some(cursor + 1);
        }
        Ok(row)
    }

    fn fetch_all(&mut self) -> SourceResult<Vec<Fields>> {
        let cursor = self.cursor()?.min(self.result.rows.len());
        self.cursor = Some(self.result.rows.len());
        Ok(self.result.rows[cursor..].to_vec())
    }

    fn column_count(&self) -> usize {
        self.result.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> MemoryDatabase {
        let db = MemoryDatabase::new();
        db.register(
            "SELECT * FROM t",
            ResultSet::from_json(&json!([{"id": 1, "name": "a"}, {"id": 2}])).unwrap(),
        );
        db
    }

    #[test]
    fn test_result_set_from_objects() {
        let set = ResultSet::from_json(&json!([{"id": 1, "name": "a"}, {"id": 2}])).unwrap();
        assert_eq!(set.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(set.rows()[1].get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_result_set_from_scalars() {
        let set = ResultSet::from_json(&json!([1, "two", null])).unwrap();
        assert_eq!(set.columns(), &[SCALAR_COLUMN.to_string()]);
        assert_eq!(set.rows().len(), 3);
    }

    #[test]
    fn test_result_set_rejects_mixed_shapes() {
        assert!(ResultSet::from_json(&json!([{"id": 1}, 2])).is_err());
        assert!(ResultSet::from_json(&json!([1, {"id": 1}])).is_err());
        assert!(ResultSet::from_json(&json!({"id": 1})).is_err());
    }

    #[test]
    fn test_fetch_requires_execute() {
        let db = db();
        let mut statement = db.prepare(None, "SELECT * FROM t").unwrap();
        assert!(statement.fetch().is_err());

        statement.execute().unwrap();
        assert_eq!(statement.fetch().unwrap().unwrap()["id"], json!(1));
        assert_eq!(statement.fetch_all().unwrap().len(), 1);
        assert_eq!(statement.fetch().unwrap(), None);
    }

    #[test]
    fn test_execute_rewinds() {
        let db = db();
        let mut statement = db.prepare(None, "SELECT * FROM t").unwrap();
        statement.execute().unwrap();
        assert_eq!(statement.fetch_all().unwrap().len(), 2);

        statement.execute().unwrap();
        assert_eq!(statement.fetch_all().unwrap().len(), 2);
        assert_eq!(db.executions().len(), 2);
    }

    #[test]
    fn test_failure_injection() {
        let db = db();
        db.fail_with("SELECT * FROM t", "disk on fire");
        let mut statement = db.prepare(None, "SELECT * FROM t").unwrap();
        assert_eq!(statement.execute().unwrap_err().to_string(), "disk on fire");
        assert_eq!(db.executions().len(), 1);
    }

    #[test]
    fn test_unknown_sql() {
        let db = MemoryDatabase::new();
        assert!(db.prepare(None, "SELECT 1").is_err());
    }
}
