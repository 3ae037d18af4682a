//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code after a
//! `{"status":"error"}` object has been written.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::rules::ValidationError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Input document or rule file is malformed
    InvalidInput,
    /// Rule declaration or handler error raised during the run
    RuleError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "WILDCHECK_CLI_CONFIG_ERROR",
            Self::IoError => "WILDCHECK_CLI_IO_ERROR",
            Self::InvalidInput => "WILDCHECK_CLI_INVALID_INPUT",
            Self::RuleError => "WILDCHECK_CLI_RULE_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug, Error)]
#[error("{}: {message}", code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Malformed input
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_input(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(format!("{} ({})", e, e.code()))
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidRuleSet(_) => Self::invalid_input(format!("{} ({})", e, e.code())),
            _ => Self::new(CliErrorCode::RuleError, format!("{} ({})", e, e.code())),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
