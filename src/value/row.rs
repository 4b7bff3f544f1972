//! Result row representation
//!
//! A result set is either a list of records (column name to value) or, when
//! exactly one column was selected, a flat list of scalars. The shape is
//! decided once per result set.

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Ordered column name to value mapping
pub type Fields = Map<String, Value>;

/// Name of the aggregate relevance field
pub const SCORE_FIELD: &str = "score";

/// Suffix of the per-column relevance fields
pub const SCORE_SUFFIX: &str = "_score";

/// Relevance annotations written by fulltext scoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relevance {
    /// Accumulated weighted score
    score: f64,
    /// Per-column percentages, in first-scored order
    columns: Vec<(String, f64)>,
}

impl Relevance {
    /// Aggregate score
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Percentage recorded for `column`, if it was scored
    pub fn column(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, percent)| *percent)
    }

    /// Iterates per-column percentages in first-scored order
    pub fn columns(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns.iter().map(|(name, p)| (name.as_str(), *p))
    }

    /// Records `percent` for `column` and adds `contribution` to the aggregate.
    ///
    /// Scoring the same column again replaces its percentage; the aggregate
    /// keeps both contributions.
    pub fn record(&mut self, column: &str, percent: f64, contribution: f64) {
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = percent,
            None => self.columns.push((column.to_string(), percent)),
        }
        self.score += contribution;
    }

    /// Resolves a synthetic field name (`score` or `<column>_score`)
    fn lookup(&self, name: &str) -> Option<f64> {
        if name == SCORE_FIELD {
            return Some(self.score);
        }
        name.strip_suffix(SCORE_SUFFIX)
            .and_then(|column| self.column(column))
    }
}

/// A named-column row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Fields,
    relevance: Option<Relevance>,
}

impl Record {
    /// Creates a record with no relevance annotations
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            relevance: None,
        }
    }

    /// Real column values
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Relevance annotations, if any fulltext pattern touched this row
    pub fn relevance(&self) -> Option<&Relevance> {
        self.relevance.as_ref()
    }

    /// Relevance annotations, created at score 0 on first touch
    pub fn relevance_mut(&mut self) -> &mut Relevance {
        self.relevance.get_or_insert_with(Relevance::default)
    }

    /// Resolves a column by name.
    ///
    /// Once relevance is present, `score` and `<column>_score` resolve to the
    /// annotations even if a real column has the same name.
    pub fn value(&self, name: &str) -> Option<Cow<'_, Value>> {
        if let Some(percent) = self.relevance.as_ref().and_then(|r| r.lookup(name)) {
            return Some(Cow::Owned(Value::from(percent)));
        }
        self.fields.get(name).map(Cow::Borrowed)
    }

    /// First real column value
    pub fn first_value(&self) -> Option<&Value> {
        self.fields.values().next()
    }

    /// Consumes the record, materialising annotations as ordinary fields
    pub fn into_fields(self) -> Fields {
        let mut fields = self.fields;
        if let Some(relevance) = self.relevance {
            fields.insert(SCORE_FIELD.to_string(), Value::from(relevance.score));
            for (column, percent) in relevance.columns {
                fields.insert(format!("{}{}", column, SCORE_SUFFIX), Value::from(percent));
            }
        }
        fields
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self::new(fields)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let relevance = self.relevance.as_ref();
        for (key, value) in &self.fields {
            // Shadowed by an annotation below
            if relevance.and_then(|r| r.lookup(key)).is_some() {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        if let Some(relevance) = relevance {
            map.serialize_entry(SCORE_FIELD, &relevance.score)?;
            for (column, percent) in &relevance.columns {
                map.serialize_entry(&format!("{}{}", column, SCORE_SUFFIX), percent)?;
            }
        }
        map.end()
    }
}

/// One result row
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Named columns
    Columns(Record),
    /// Bare value of a single-column result set
    Scalar(Value),
}

impl Row {
    /// Returns true for single-column rows
    pub fn is_scalar(&self) -> bool {
        matches!(self, Row::Scalar(_))
    }

    /// Returns the record, if this is a named-column row
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Row::Columns(record) => Some(record),
            Row::Scalar(_) => None,
        }
    }

    /// Value a pattern or sort key on `column` sees.
    ///
    /// Scalar rows ignore the column. Missing columns are `null`.
    pub fn target(&self, column: Option<&str>) -> Cow<'_, Value> {
        match (self, column) {
            (Row::Scalar(value), _) => Cow::Borrowed(value),
            (Row::Columns(record), Some(column)) => {
                record.value(column).unwrap_or(Cow::Owned(Value::Null))
            }
            (Row::Columns(_), None) => Cow::Owned(Value::Null),
        }
    }

    /// The row's `id` column, if present and not null
    pub fn id(&self) -> Option<&Value> {
        match self {
            Row::Columns(record) => record.fields.get("id").filter(|v| !v.is_null()),
            Row::Scalar(_) => None,
        }
    }

    /// Converts to a plain JSON value with annotations materialised
    pub fn into_value(self) -> Value {
        match self {
            Row::Columns(record) => Value::Object(record.into_fields()),
            Row::Scalar(value) => value,
        }
    }
}

impl From<Fields> for Row {
    fn from(fields: Fields) -> Self {
        Row::Columns(Record::new(fields))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Row::Columns(record) => record.serialize(serializer),
            Row::Scalar(value) => value.serialize(serializer),
        }
    }
}
