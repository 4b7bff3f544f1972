//! Query coordinator
//!
//! Owns one SQL statement, its named parameters and the post-fetch stages:
//!
//! 1. Statements are prepared and executed lazily, on the first fetch
//! 2. With no filter patterns and no sort keys, rows stream straight from
//!    the source
//! 3. Otherwise every row is materialized, filtered, then sorted

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::filter::{FilterEngine, Pattern};
use crate::observability::{log_event, Event, Logger};
use crate::sort::{ResultSorter, SortDirection, SortEngine};
use crate::value::loose::to_int;
use crate::value::{Fields, Row};

use super::errors::{QueryError, QueryResult};
use super::source::{Database, Statement};

/// Result of [`Query::fetch_ids`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IdList {
    /// The `id` column of every row, in result order
    Ids(Vec<i64>),
    /// The full rows, returned when the first row has no `id`
    Rows(Vec<Row>),
}

impl IdList {
    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            IdList::Ids(ids) => ids.len(),
            IdList::Rows(rows) => rows.len(),
        }
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single SQL query with optional post-fetch filtering and sorting
pub struct Query<'db> {
    id: Uuid,
    database: &'db dyn Database,
    sql: String,
    schema: Option<String>,
    binds: Fields,
    statement: Option<Box<dyn Statement>>,
    executed: bool,
    config: Config,
    filter: Option<FilterEngine>,
    sort: Option<Box<dyn SortEngine>>,
}

impl<'db> Query<'db> {
    /// Creates a query against `schema` (or the database's default).
    ///
    /// Nothing is prepared until the first fetch or [`Query::execute`].
    pub fn new(
        database: &'db dyn Database,
        sql: impl Into<String>,
        schema: Option<&str>,
    ) -> QueryResult<Self> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(QueryError::EmptySql);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            database,
            sql,
            schema: schema.map(str::to_string),
            binds: Fields::new(),
            statement: None,
            executed: false,
            config: Config::default(),
            filter: None,
            sort: None,
        })
    }

    /// Uses `config` for fulltext defaults and scoring
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the sort engine used by [`Query::sort`]
    pub fn with_sort_engine(mut self, engine: Box<dyn SortEngine>) -> Self {
        self.sort = Some(engine);
        self
    }

    /// Correlation id used in log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Target schema, if one was named
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Bound parameters in bind order
    pub fn binds(&self) -> &Fields {
        &self.binds
    }

    /// Returns true once the statement has been executed
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Declared post-fetch filter patterns
    pub fn patterns(&self) -> &[Pattern] {
        self.filter.as_ref().map(FilterEngine::patterns).unwrap_or(&[])
    }

    /// Binds a named parameter. Each key may be bound once.
    pub fn bind_value(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let key = key.into();
        if self.binds.contains_key(&key) {
            return Err(QueryError::DuplicateBind(key));
        }
        self.binds.insert(key, value.into());
        Ok(self)
    }

    /// Adds a post-fetch filter such as `"id < 5"` or
    /// `"title FULLTEXT star wars"`.
    ///
    /// `weight` only matters for fulltext patterns and falls back to the
    /// configured default.
    pub fn filter(&mut self, pattern: &str, weight: Option<f64>) -> QueryResult<&mut Self> {
        let weight = weight.unwrap_or(self.config.default_fulltext_weight);
        let pattern = Pattern::parse(pattern, Some(weight))?;
        Ok(self.filter_pattern(pattern))
    }

    /// Adds an already-built filter pattern
    pub fn filter_pattern(&mut self, pattern: Pattern) -> &mut Self {
        let scoring = self.config.scoring();
        self.filter
            .get_or_insert_with(|| FilterEngine::with_options(scoring))
            .add_pattern(pattern);
        self
    }

    /// Adds a post-fetch sort key; keys apply in declaration order
    pub fn sort(&mut self, column: &str, direction: SortDirection) -> &mut Self {
        self.sort
            .get_or_insert_with(|| Box::new(ResultSorter::new()))
            .add(column, direction);
        self
    }

    /// Prepares (once), binds and runs the statement.
    ///
    /// Calling this again runs the statement again.
    pub fn execute(&mut self) -> QueryResult<bool> {
        self.executed = true;
        let query_id = self.id.to_string();

        let statement = prepared(
            &mut self.statement,
            self.database,
            self.schema.as_deref(),
            &self.sql,
            &query_id,
        )?;

        let outcome = self
            .binds
            .iter()
            .try_for_each(|(key, value)| statement.bind_value(key, value))
            .and_then(|_| statement.execute());

        match outcome {
            Ok(succeeded) => {
                let binds = self.binds.len().to_string();
                log_event(
                    Event::QueryExecuted,
                    &[("binds", binds.as_str()), ("query_id", query_id.as_str())],
                );
                Ok(succeeded)
            }
            Err(err) => {
                let message = err.to_string();
                log_event(
                    Event::QueryFailed,
                    &[("message", message.as_str()), ("query_id", query_id.as_str())],
                );
                Err(QueryError::Execution(message))
            }
        }
    }

    /// First column of the first row, or `None` when there is no row.
    ///
    /// On the post-processing path this is the first column of the first
    /// row that survived filtering and sorting. It is never the whole row;
    /// use [`Query::fetch_row`] for that.
    pub fn fetch_value(&mut self) -> QueryResult<Option<Value>> {
        if !self.has_post_processing() {
            let fields = self.statement_fetch()?;
            return Ok(fields.and_then(|f| f.into_iter().next().map(|(_, v)| v)));
        }

        let first = self.fetch_all()?.into_iter().next();
        Ok(first.map(|row| match row {
            Row::Scalar(value) => value,
            Row::Columns(record) => record.first_value().cloned().unwrap_or(Value::Null),
        }))
    }

    /// First row, or `None` when there is no row
    pub fn fetch_row(&mut self) -> QueryResult<Option<Row>> {
        if !self.has_post_processing() {
            return Ok(self.statement_fetch()?.map(Row::from));
        }
        Ok(self.fetch_all()?.into_iter().next())
    }

    /// All rows after filtering and sorting.
    ///
    /// Single-column result sets come back as [`Row::Scalar`] values.
    pub fn fetch_all(&mut self) -> QueryResult<Vec<Row>> {
        let rows = self.fetch_source_rows()?;

        let rows = match self.filter.as_mut() {
            Some(engine) => engine.process(rows, None)?,
            None => rows,
        };

        Ok(match self.sort.as_mut() {
            Some(engine) => engine.process(rows),
            None => rows,
        })
    }

    /// The `id` of every row, as integers.
    ///
    /// When the first row has no `id` the rows are returned unchanged. The
    /// sort engine is told ids are being extracted before rows are fetched.
    pub fn fetch_ids(&mut self) -> QueryResult<IdList> {
        if let Some(engine) = self.sort.as_mut() {
            engine.prepare_for_id_extraction();
        }

        let rows = self.fetch_all()?;
        match rows.first() {
            None => Ok(IdList::Ids(Vec::new())),
            Some(first) if first.id().is_none() => Ok(IdList::Rows(rows)),
            Some(_) => Ok(IdList::Ids(
                rows.iter()
                    .map(|row| row.id().map(to_int).unwrap_or(0))
                    .collect(),
            )),
        }
    }

    /// First row deserialized into `T`. Filters and sort keys are not applied.
    pub fn fetch_object<T: DeserializeOwned>(&mut self) -> QueryResult<Option<T>> {
        match self.statement_fetch()? {
            Some(fields) => Ok(Some(serde_json::from_value(Value::Object(fields))?)),
            None => Ok(None),
        }
    }

    /// Every row deserialized into `T`. Filters and sort keys are not applied.
    pub fn fetch_objects<T: DeserializeOwned>(&mut self) -> QueryResult<Vec<T>> {
        self.ensure_executed()?;
        let records = self
            .statement
            .as_mut()
            .ok_or_else(|| QueryError::Fetch("statement not prepared".to_string()))?
            .fetch_all()
            .map_err(|e| QueryError::Fetch(e.to_string()))?;

        records
            .into_iter()
            .map(|fields| serde_json::from_value(Value::Object(fields)).map_err(QueryError::from))
            .collect()
    }

    /// Id generated by the last insert on this query's schema
    pub fn last_insert_id(&self) -> QueryResult<i64> {
        self.database
            .last_insert_id(self.schema.as_deref())
            .map_err(|e| QueryError::Fetch(e.to_string()))
    }

    fn has_post_processing(&self) -> bool {
        let filtering = self
            .filter
            .as_ref()
            .map(|f| !f.patterns().is_empty())
            .unwrap_or(false);
        filtering || self.sort.is_some()
    }

    fn ensure_executed(&mut self) -> QueryResult<()> {
        if !self.executed {
            self.execute()?;
        }
        Ok(())
    }

    fn statement_fetch(&mut self) -> QueryResult<Option<Fields>> {
        self.ensure_executed()?;
        self.statement
            .as_mut()
            .ok_or_else(|| QueryError::Fetch("statement not prepared".to_string()))?
            .fetch()
            .map_err(|e| QueryError::Fetch(e.to_string()))
    }

    /// Materializes every source row
    fn fetch_source_rows(&mut self) -> QueryResult<Vec<Row>> {
        self.ensure_executed()?;
        let statement = self
            .statement
            .as_mut()
            .ok_or_else(|| QueryError::Fetch("statement not prepared".to_string()))?;

        let records = statement
            .fetch_all()
            .map_err(|e| QueryError::Fetch(e.to_string()))?;
        let single_column = statement.column_count() == 1;

        let rows: Vec<Row> = records
            .into_iter()
            .map(|fields| {
                if single_column {
                    Row::Scalar(fields.into_iter().map(|(_, v)| v).last().unwrap_or(Value::Null))
                } else {
                    Row::from(fields)
                }
            })
            .collect();

        let count = rows.len().to_string();
        let query_id = self.id.to_string();
        Logger::trace(
            Event::RowsFetched.as_str(),
            &[("query_id", query_id.as_str()), ("rows", count.as_str())],
        );

        Ok(rows)
    }
}

/// Prepares the statement into `slot` on first use
fn prepared<'s>(
    slot: &'s mut Option<Box<dyn Statement>>,
    database: &dyn Database,
    schema: Option<&str>,
    sql: &str,
    query_id: &str,
) -> QueryResult<&'s mut Box<dyn Statement>> {
    if slot.is_none() {
        let statement = database.prepare(schema, sql).map_err(|err| {
            let message = err.to_string();
            log_event(
                Event::QueryFailed,
                &[("message", message.as_str()), ("query_id", query_id)],
            );
            QueryError::Prepare(message)
        })?;
        Logger::trace(Event::QueryPrepared.as_str(), &[("query_id", query_id)]);
        *slot = Some(statement);
    }

    slot.as_mut()
        .ok_or_else(|| QueryError::Prepare(sql.to_string()))
}
