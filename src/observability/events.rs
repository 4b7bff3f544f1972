//! Observable pipeline events
//!
//! Events are explicit and typed; log lines carry their string form.

use std::fmt;

/// Observable events in the fetch, filter and sort pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Statement lifecycle
    /// Statement prepared against a source
    QueryPrepared,
    /// Statement executed successfully
    QueryExecuted,
    /// Statement preparation or execution failed
    QueryFailed,
    /// Rows materialized from the statement
    RowsFetched,

    // Post-fetch processing
    /// Filter patterns applied
    FilterApplied,
    /// Membership list parsed and cached
    MembershipListCached,
    /// Sort keys applied
    SortApplied,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::QueryPrepared => "QUERY_PREPARED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryFailed => "QUERY_FAILED",
            Event::RowsFetched => "ROWS_FETCHED",

            Event::FilterApplied => "FILTER_APPLIED",
            Event::MembershipListCached => "MEMBERSHIP_LIST_CACHED",
            Event::SortApplied => "SORT_APPLIED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::QueryFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::QueryPrepared,
            Event::QueryExecuted,
            Event::QueryFailed,
            Event::RowsFetched,
            Event::FilterApplied,
            Event::MembershipListCached,
            Event::SortApplied,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::QueryFailed.is_failure());
        assert!(!Event::QueryExecuted.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::FilterApplied), "FILTER_APPLIED");
    }
}
