//! Pipeline configuration
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::fulltext::{DEFAULT_EMPTY_TEXT_SCORE, DEFAULT_LONG_TEXT_THRESHOLD};
use crate::filter::{ScoringOptions, DEFAULT_FULLTEXT_WEIGHT};
use crate::observability::{Event, Logger, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// File is not valid configuration JSON
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        "ROWSIFT_CONFIG_ERROR"
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Operand length (bytes) at which fulltext scoring switches from edit
    /// distance to common-run similarity (default: 255)
    #[serde(default = "default_long_text_threshold")]
    pub long_text_threshold: usize,

    /// Weight of fulltext patterns declared without one (default: 1.0)
    #[serde(default = "default_fulltext_weight")]
    pub default_fulltext_weight: f64,

    /// Score given when both fulltext operands are empty (default: 100.0)
    #[serde(default = "default_empty_text_score")]
    pub empty_text_score: f64,

    /// Minimum log severity (default: "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_long_text_threshold() -> usize {
    DEFAULT_LONG_TEXT_THRESHOLD
}
fn default_fulltext_weight() -> f64 {
    DEFAULT_FULLTEXT_WEIGHT
}
fn default_empty_text_score() -> f64 {
    DEFAULT_EMPTY_TEXT_SCORE
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_text_threshold: default_long_text_threshold(),
            default_fulltext_weight: default_fulltext_weight(),
            empty_text_score: default_empty_text_score(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;

        let path_str = path.to_string_lossy();
        Logger::info(Event::ConfigLoaded.as_str(), &[("path", path_str.as_ref())]);

        Ok(config)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.long_text_threshold == 0 {
            return Err(ConfigError::Invalid(
                "long_text_threshold must be greater than 0".to_string(),
            ));
        }

        if !self.default_fulltext_weight.is_finite() || self.default_fulltext_weight < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_fulltext_weight must be a finite non-negative number, got {}",
                self.default_fulltext_weight
            )));
        }

        if !(0.0..=100.0).contains(&self.empty_text_score) {
            return Err(ConfigError::Invalid(format!(
                "empty_text_score must be between 0 and 100, got {}",
                self.empty_text_score
            )));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }

    /// Applies the log level to the process-wide logger
    pub fn apply_logging(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }

    /// Fulltext scoring options
    pub fn scoring(&self) -> ScoringOptions {
        ScoringOptions {
            long_text_threshold: self.long_text_threshold,
            empty_text_score: self.empty_text_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.long_text_threshold, 255);
        assert_eq!(config.default_fulltext_weight, 1.0);
        assert_eq!(config.empty_text_score, 100.0);
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rowsift.json");
        fs::write(&path, r#"{"long_text_threshold": 64, "log_level": "error"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.long_text_threshold, 64);
        assert_eq!(config.scoring().long_text_threshold, 64);
        assert_eq!(config.severity().unwrap(), Severity::Error);
    }

    #[test]
    fn test_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            Config::from_json(r#"{"long_text_threshold": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(Config::from_json(r#"{"default_fulltext_weight": -1}"#).is_err());
        assert!(Config::from_json(r#"{"empty_text_score": 101}"#).is_err());
        assert!(Config::from_json(r#"{"log_level": "loud"}"#).is_err());
        assert!(matches!(Config::from_json("not json"), Err(ConfigError::Parse(_))));
    }
}
