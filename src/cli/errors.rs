//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code and a JSON
//! error object carrying [`CliError::code_str`].

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::query::QueryError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be used
    #[error("{0}")]
    Config(String),

    /// Input could not be read or output written
    #[error("{0}")]
    Io(String),

    /// Malformed command-line argument
    #[error("{0}")]
    InvalidArgument(String),

    /// The pipeline rejected the run; keeps the pipeline's error code
    #[error("{message}")]
    Query { code: &'static str, message: String },
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(_) => "ROWSIFT_CLI_CONFIG_ERROR",
            CliError::Io(_) => "ROWSIFT_CLI_IO_ERROR",
            CliError::InvalidArgument(_) => "ROWSIFT_CLI_INVALID_ARGUMENT",
            CliError::Query { code, .. } => code,
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            CliError::Config(message)
            | CliError::Io(message)
            | CliError::InvalidArgument(message)
            | CliError::Query { message, .. } => message,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Query {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
