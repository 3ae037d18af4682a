//! Engine configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "path": { "delimiters": [":", "."], "wildcard": "*" },
//!   "log_level": "warn"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};
use crate::path::PathConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Get error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "WILDCHECK_CONFIG_READ",
            ConfigError::Parse(_) => "WILDCHECK_CONFIG_PARSE",
            ConfigError::Invalid(_) => "WILDCHECK_CONFIG_INVALID",
        }
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Path syntax (delimiters and wildcard token)
    #[serde(default)]
    pub path: PathConfig,

    /// Minimum log severity (default "warn")
    #[serde(default)]
    pub log_level: Severity,
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;

        let shown = path.display().to_string();
        log_event(Event::ConfigLoaded, &[("path", shown.as_str())]);

        Ok(config)
    }

    /// Validate path syntax
    pub fn validate(&self) -> ConfigResult<()> {
        if self.path.delimiters.is_empty() {
            return Err(ConfigError::Invalid("path.delimiters must not be empty".into()));
        }

        if self.path.wildcard.is_empty() {
            return Err(ConfigError::Invalid("path.wildcard must not be empty".into()));
        }

        if let Some(d) = self
            .path
            .delimiters
            .iter()
            .find(|d| self.path.wildcard.contains(**d))
        {
            return Err(ConfigError::Invalid(format!(
                "path.wildcard '{}' must not contain the delimiter '{}'",
                self.path.wildcard, d
            )));
        }

        Ok(())
    }

    /// Installs `log_level` as the process-wide log threshold.
    pub fn apply_logging(&self) {
        Logger::set_threshold(self.log_level);
    }
}
