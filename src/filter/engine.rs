//! Filter engine
//!
//! Drives every declared pattern over every row:
//!
//! 1. Boolean patterns are ANDed in declaration order; the first miss drops
//!    the row and skips its remaining patterns
//! 2. Fulltext patterns never drop a row; they annotate it with relevance
//! 3. Surviving rows keep their input order

use serde_json::Value;

use crate::observability::{Event, Logger};
use crate::value::Row;

use super::errors::{FilterError, FilterResult};
use super::fulltext::{score_full_text, ScoringOptions};
use super::matcher::Matcher;
use super::pattern::Pattern;
use super::store::{MembershipCache, PatternStore};

/// Applies declared patterns to materialized rows
#[derive(Debug, Default)]
pub struct FilterEngine {
    store: PatternStore,
    options: ScoringOptions,
}

impl FilterEngine {
    /// Creates an engine with default scoring options
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given scoring options
    pub fn with_options(options: ScoringOptions) -> Self {
        Self {
            store: PatternStore::new(),
            options,
        }
    }

    /// Appends a pattern
    pub fn add_pattern(&mut self, pattern: Pattern) {
        self.store.add(pattern);
    }

    /// Replaces all patterns. The membership cache is kept.
    pub fn set_patterns(&mut self, patterns: Vec<Pattern>) {
        self.store.set(patterns);
    }

    /// Declared patterns in order
    pub fn patterns(&self) -> &[Pattern] {
        self.store.patterns()
    }

    /// Membership cache
    pub fn cache(&self) -> &MembershipCache {
        self.store.cache()
    }

    /// Scoring options
    pub fn options(&self) -> &ScoringOptions {
        &self.options
    }

    /// Sum of fulltext pattern weights
    pub fn total_weight(&self) -> f64 {
        self.store.total_weight()
    }

    /// Checks a single value against a boolean pattern using this engine's cache
    pub fn matches(&mut self, value: &Value, pattern: &Pattern) -> FilterResult<bool> {
        Matcher::matches(value, pattern, &mut self.store.cache)
    }

    /// Filters and scores `rows`.
    ///
    /// `total_weight` defaults to [`FilterEngine::total_weight`]. Fulltext
    /// patterns against a single-column result set fail before any row is
    /// evaluated.
    pub fn process(&mut self, rows: Vec<Row>, total_weight: Option<f64>) -> FilterResult<Vec<Row>> {
        let single_column = rows.first().map(Row::is_scalar).unwrap_or(false);
        if single_column && self.store.has_fulltext() {
            return Err(FilterError::FullTextOnSingleColumn);
        }

        let total_weight = total_weight.unwrap_or_else(|| self.store.total_weight());
        let rows_in = rows.len();

        let PatternStore { patterns, cache } = &mut self.store;
        let mut filtered = Vec::with_capacity(rows_in);

        'rows: for mut row in rows {
            for pattern in patterns.iter() {
                if pattern.is_fulltext() {
                    row = score_full_text(row, pattern, total_weight, &self.options)?;
                    continue;
                }

                let value = row.target(pattern.column());
                if !Matcher::matches(&value, pattern, cache)? {
                    continue 'rows;
                }
            }
            filtered.push(row);
        }

        let (rows_in, rows_out, count) = (
            rows_in.to_string(),
            filtered.len().to_string(),
            patterns.len().to_string(),
        );
        Logger::trace(
            Event::FilterApplied.as_str(),
            &[
                ("patterns", count.as_str()),
                ("rows_in", rows_in.as_str()),
                ("rows_out", rows_out.as_str()),
            ],
        );

        Ok(filtered)
    }
}
