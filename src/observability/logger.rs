//! Structured JSON logger
//!
//! - One log line = one JSON object = one event
//! - `event` first, `severity` second, remaining keys sorted
//! - Synchronous, no buffering; ERROR and above go to stderr
//! - A process-wide minimum severity drops quieter lines

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::{Map, Value};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-call pipeline detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(level: u8) -> Self {
        match level {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

/// Keys every line starts with; fields may not override them
const RESERVED_KEYS: [&str; 2] = ["event", "severity"];

/// Renders one log line, newline included.
///
/// `event` and `severity` come first and the remaining fields follow in key
/// order, so identical calls always produce identical bytes.
pub fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut line = Map::new();
    line.insert("event".to_string(), Value::from(event));
    line.insert("severity".to_string(), Value::from(severity.as_str()));

    let mut sorted: Vec<&(&str, &str)> = fields
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(key))
        .collect();
    sorted.sort_by_key(|(key, _)| *key);
    for (key, value) in sorted {
        line.insert(key.to_string(), Value::from(*value));
    }

    let mut rendered = Value::Object(line).to_string();
    rendered.push('\n');
    rendered
}

/// A structured logger that outputs JSON lines.
///
/// Lines below ERROR go to stdout, ERROR and FATAL to stderr.
pub struct Logger;

impl Logger {
    /// Sets the process-wide minimum severity
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    /// Current minimum severity
    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Returns true if lines at `severity` are written
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Log an event at `severity`
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }

        let line = format_line(severity, event, fields);
        // Logging never fails the pipeline
        if severity >= Severity::Error {
            let _ = Self::write_line(&mut io::stderr().lock(), &line);
        } else {
            let _ = Self::write_line(&mut io::stdout().lock(), &line);
        }
    }

    fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    /// Log at TRACE level
    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}
