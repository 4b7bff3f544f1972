//! Boolean pattern evaluation
//!
//! Non-fulltext comparisons only. Literals are quote-stripped before use and
//! every comparison goes through the loose rules in [`crate::value::loose`].

use std::cmp::Ordering;

use serde_json::Value;

use crate::value::loose::{loose_cmp, loose_eq, to_text};

use super::errors::{FilterError, FilterResult};
use super::pattern::{Comparison, Pattern};
use super::store::{MembershipCache, QUOTE_CHARS};

/// Evaluates boolean patterns against single values
pub struct Matcher;

impl Matcher {
    /// Checks if `value` satisfies `pattern`.
    ///
    /// Membership lists are resolved through `cache`. Fulltext patterns are
    /// rejected: they score rows instead of matching them.
    pub fn matches(value: &Value, pattern: &Pattern, cache: &mut MembershipCache) -> FilterResult<bool> {
        let literal = Value::String(pattern.value().replace(&QUOTE_CHARS[..], ""));

        let matched = match pattern.comparison() {
            Comparison::Equal => loose_eq(value, &literal),
            Comparison::NotEqual => !loose_eq(value, &literal),
            Comparison::Less => Self::ordered(value, &literal, |o| o == Ordering::Less),
            Comparison::LessOrEqual => Self::ordered(value, &literal, |o| o != Ordering::Greater),
            Comparison::Greater => Self::ordered(value, &literal, |o| o == Ordering::Greater),
            Comparison::GreaterOrEqual => Self::ordered(value, &literal, |o| o != Ordering::Less),
            Comparison::Like => Self::like(value, &literal),
            Comparison::In => Self::member(value, cache.members(pattern)),
            Comparison::NotIn => !Self::member(value, cache.members(pattern)),
            Comparison::FullText => return Err(FilterError::NotAPredicate(Comparison::FullText.as_str())),
        };

        Ok(matched)
    }

    /// Unordered operands never satisfy an ordering comparison
    fn ordered(value: &Value, literal: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
        loose_cmp(value, literal).map(accept).unwrap_or(false)
    }

    /// Case-insensitive substring containment
    fn like(value: &Value, literal: &Value) -> bool {
        let haystack = to_text(value).to_ascii_lowercase();
        let needle = to_text(literal).to_ascii_lowercase();
        haystack.contains(&needle)
    }

    fn member(value: &Value, members: &[Value]) -> bool {
        members.iter().any(|m| loose_eq(value, m))
    }
}
