//! Pattern storage and membership-list cache

use std::collections::HashMap;

use serde_json::Value;

use crate::observability::{Event, Logger};

use super::pattern::{Comparison, Pattern};

/// Characters stripped from literals before comparison
pub(crate) const QUOTE_CHARS: [char; 3] = ['\'', '"', '`'];

/// Parsed `IN` / `NOT IN` lists, built once per distinct literal.
///
/// Keyed by comparison and literal, so `IN a,b` and `NOT IN a,b` hold
/// separate (identical) lists.
#[derive(Debug, Default)]
pub struct MembershipCache {
    lists: HashMap<(Comparison, String), Vec<Value>>,
    builds: usize,
}

impl MembershipCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed members of `pattern`'s literal, parsing on first use
    pub fn members(&mut self, pattern: &Pattern) -> &[Value] {
        let key = (pattern.comparison(), pattern.value().to_string());
        let builds = &mut self.builds;
        self.lists.entry(key).or_insert_with(|| {
            *builds += 1;
            let members = split_members(pattern.value());
            let count = members.len().to_string();
            Logger::trace(
                Event::MembershipListCached.as_str(),
                &[
                    ("comparison", pattern.comparison().as_str()),
                    ("members", count.as_str()),
                ],
            );
            members
        })
    }

    /// Number of lists parsed so far
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Number of cached lists
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns true if nothing has been cached
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Splits a comma-delimited literal into members.
///
/// Each member is trimmed of whitespace and quote characters.
pub fn split_members(literal: &str) -> Vec<Value> {
    literal
        .split(',')
        .map(|member| {
            let trimmed = member.trim().trim_matches(&QUOTE_CHARS[..]);
            Value::String(trimmed.to_string())
        })
        .collect()
}

/// Declared patterns plus their membership cache.
///
/// Patterns keep declaration order. Replacing them leaves the cache intact:
/// entries are keyed by literal, so stale ones are merely unused.
#[derive(Debug, Default)]
pub struct PatternStore {
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) cache: MembershipCache,
}

impl PatternStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pattern
    pub fn add(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    /// Replaces all patterns
    pub fn set(&mut self, patterns: Vec<Pattern>) {
        self.patterns = patterns;
    }

    /// Declared patterns in order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Membership cache
    pub fn cache(&self) -> &MembershipCache {
        &self.cache
    }

    /// Returns true if any pattern scores rows
    pub fn has_fulltext(&self) -> bool {
        self.patterns.iter().any(Pattern::is_fulltext)
    }

    /// Sum of fulltext weights
    pub fn total_weight(&self) -> f64 {
        self.patterns
            .iter()
            .filter(|p| p.is_fulltext())
            .map(Pattern::weight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_members() {
        assert_eq!(split_members("1,2,3"), vec![json!("1"), json!("2"), json!("3")]);
        assert_eq!(split_members(" 'a', \"b\" ,`c`"), vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(split_members(""), vec![json!("")]);
    }

    #[test]
    fn test_cache_builds_once_per_literal() {
        let mut cache = MembershipCache::new();
        let pattern = Pattern::new("id", Comparison::In, "1,2,3");

        for _ in 0..10 {
            assert_eq!(cache.members(&pattern).len(), 3);
        }
        assert_eq!(cache.builds(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_separates_in_and_not_in() {
        let mut cache = MembershipCache::new();
        let inside = Pattern::new("id", Comparison::In, "a,b");
        let outside = Pattern::new("id", Comparison::NotIn, "a,b");

        let a = cache.members(&inside).to_vec();
        let b = cache.members(&outside).to_vec();

        assert_eq!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_total_weight() {
        let mut store = PatternStore::new();
        store.add(Pattern::fulltext("title", "x", 30.0));
        store.add(Pattern::new("id", Comparison::Less, "5"));
        store.add(Pattern::fulltext("body", "y", 70.0));

        assert!(store.has_fulltext());
        assert_eq!(store.total_weight(), 100.0);
        assert_eq!(store.patterns().len(), 3);

        store.set(vec![Pattern::new("id", Comparison::Equal, "1")]);
        assert!(!store.has_fulltext());
        assert_eq!(store.total_weight(), 0.0);
    }
}
