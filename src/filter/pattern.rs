//! Filter pattern definitions
//!
//! A pattern is one declared condition: column, comparison, literal and an
//! optional fulltext weight. Patterns are immutable once built.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{FilterError, FilterResult};

/// Weight of a fulltext pattern declared without one
pub const DEFAULT_FULLTEXT_WEIGHT: f64 = 1.0;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Comparison {
    /// `=`, `==` or `===` (all loose)
    Equal,
    /// `<>` or `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// Case-insensitive substring containment
    Like,
    /// Membership in a comma-delimited list
    In,
    /// Negated membership
    NotIn,
    /// Fuzzy relevance scoring; never excludes a row
    FullText,
}

impl Comparison {
    /// Canonical token
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Like => "LIKE",
            Comparison::In => "IN",
            Comparison::NotIn => "NOT IN",
            Comparison::FullText => "FULLTEXT",
        }
    }

    /// Returns true for the scoring comparison
    pub fn is_fulltext(&self) -> bool {
        matches!(self, Comparison::FullText)
    }

    /// Returns true for list membership comparisons
    pub fn is_membership(&self) -> bool {
        matches!(self, Comparison::In | Comparison::NotIn)
    }
}

impl FromStr for Comparison {
    type Err = FilterError;

    fn from_str(token: &str) -> FilterResult<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        match normalized.as_str() {
            "=" | "==" | "===" => Ok(Comparison::Equal),
            "<>" | "!=" => Ok(Comparison::NotEqual),
            "<" => Ok(Comparison::Less),
            "<=" => Ok(Comparison::LessOrEqual),
            ">" => Ok(Comparison::Greater),
            ">=" => Ok(Comparison::GreaterOrEqual),
            "LIKE" => Ok(Comparison::Like),
            "IN" => Ok(Comparison::In),
            "NOT IN" => Ok(Comparison::NotIn),
            "FULLTEXT" => Ok(Comparison::FullText),
            _ => Err(FilterError::UnsupportedComparison(token.to_string())),
        }
    }
}

impl TryFrom<String> for Comparison {
    type Error = FilterError;

    fn try_from(token: String) -> FilterResult<Self> {
        token.parse()
    }
}

impl From<Comparison> for String {
    fn from(comparison: Comparison) -> Self {
        comparison.as_str().to_string()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_weight() -> f64 {
    DEFAULT_FULLTEXT_WEIGHT
}

/// A single declared filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Column under test; ignored for single-column result sets
    #[serde(default)]
    column: Option<String>,
    /// Comparison operator
    comparison: Comparison,
    /// Right-hand literal (search term for fulltext, list for membership)
    value: String,
    /// Relative contribution to aggregate relevance (fulltext only)
    #[serde(default = "default_weight")]
    weight: f64,
}

impl Pattern {
    /// Create a pattern on a named column
    pub fn new(column: impl Into<String>, comparison: Comparison, value: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            comparison,
            value: value.into(),
            weight: DEFAULT_FULLTEXT_WEIGHT,
        }
    }

    /// Create a column-less pattern for single-column result sets
    pub fn scalar(comparison: Comparison, value: impl Into<String>) -> Self {
        Self {
            column: None,
            comparison,
            value: value.into(),
            weight: DEFAULT_FULLTEXT_WEIGHT,
        }
    }

    /// Create a fulltext pattern
    pub fn fulltext(column: impl Into<String>, term: impl Into<String>, weight: f64) -> Self {
        Self::new(column, Comparison::FullText, term).with_weight(weight)
    }

    /// Sets the fulltext weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Parses a textual pattern such as `"id < 5"`, `"console = nintendo"`,
    /// `"id IN 1,2,3"` or `"title FULLTEXT star wars"`.
    ///
    /// The column may be omitted (`"< 5"`) for single-column result sets.
    /// `weight` falls back to [`DEFAULT_FULLTEXT_WEIGHT`].
    pub fn parse(text: &str, weight: Option<f64>) -> FilterResult<Self> {
        let captures = pattern_regex()?
            .captures(text)
            .ok_or_else(|| FilterError::InvalidPattern(text.to_string()))?;

        let comparison: Comparison = captures["op"].trim().parse()?;
        let column = captures.name("column").map(|m| m.as_str().to_string());
        let value = captures
            .name("value")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(Self {
            column,
            comparison,
            value,
            weight: weight.unwrap_or(DEFAULT_FULLTEXT_WEIGHT),
        })
    }

    /// Column under test
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Comparison operator
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Raw right-hand literal
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Fulltext weight
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns true if this is a scoring pattern
    pub fn is_fulltext(&self) -> bool {
        self.comparison.is_fulltext()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "{} {} {}", column, self.comparison, self.value),
            None => write!(f, "{} {}", self.comparison, self.value),
        }
    }
}

fn pattern_regex() -> FilterResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, String>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            // The whole run of operator characters is the token, so unknown
            // symbols such as `=>` or `=~` reach `Comparison::from_str` intact
            Regex::new(
                r"^\s*(?:(?P<column>[^\s=<>!~]+)\s*?)?(?P<op>[=<>!~]+|(?i:not\s+in|in|like|fulltext)(?:\s+|$))\s*(?P<value>.*?)\s*$",
            )
            .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| FilterError::InvalidPattern(e.clone()))
}
