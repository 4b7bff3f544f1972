//! Observability for the row pipeline
//!
//! Structured JSON logging with typed event names.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on filtering, scoring or sorting
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use rowsift::observability::{Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! Logger::trace(Event::FilterApplied.as_str(), &[("rows_out", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its natural severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    if event.is_failure() {
        Logger::error(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}
