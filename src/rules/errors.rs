//! # Rule Errors
//!
//! Two families share one type:
//!
//! - configuration errors (bad rule names, wrong parameter counts, malformed
//!   rule sets) abort the rule being processed
//! - handler errors are raised by rule bodies and passed through unchanged
//!
//! A rule that simply does not hold is not an error; it becomes a
//! `ValidationFailure`.

use thiserror::Error;

/// Result type for rule and validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rule engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Rule '{rule}' requires at least {expected} parameter(s), got {actual}")]
    InvalidParameterCount {
        rule: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Invalid parameter for rule '{rule}': {reason}")]
    InvalidParameter { rule: String, reason: String },

    #[error("Invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("Rule '{0}' needs a presence verifier but none is configured")]
    MissingPresenceVerifier(String),

    #[error("Rule '{rule}' handler failed: {message}")]
    Handler { rule: String, message: String },
}

impl ValidationError {
    /// Creates a handler error for `rule`.
    pub fn handler(rule: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Handler {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error for `rule`.
    pub fn invalid_parameter(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidParameter {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidParameterCount { .. } => "WILDCHECK_INVALID_PARAMETER_COUNT",
            ValidationError::UnknownRule(_) => "WILDCHECK_UNKNOWN_RULE",
            ValidationError::InvalidParameter { .. } => "WILDCHECK_INVALID_PARAMETER",
            ValidationError::InvalidRuleSet(_) => "WILDCHECK_INVALID_RULE_SET",
            ValidationError::MissingPresenceVerifier(_) => "WILDCHECK_MISSING_PRESENCE_VERIFIER",
            ValidationError::Handler { .. } => "WILDCHECK_HANDLER_ERROR",
        }
    }

    /// True for caller/configuration mistakes, false for handler errors.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, ValidationError::Handler { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ValidationError::UnknownRule("x".into()).code(), "WILDCHECK_UNKNOWN_RULE");
        assert_eq!(
            ValidationError::handler("x", "boom").code(),
            "WILDCHECK_HANDLER_ERROR"
        );
    }

    #[test]
    fn test_configuration_classification() {
        let count = ValidationError::InvalidParameterCount {
            rule: "required_if".into(),
            expected: 2,
            actual: 1,
        };
        assert!(count.is_configuration_error());
        assert!(!ValidationError::handler("x", "boom").is_configuration_error());
    }

    #[test]
    fn test_display_names_rule() {
        let err = ValidationError::InvalidParameterCount {
            rule: "between".into(),
            expected: 2,
            actual: 0,
        };
        let display = format!("{}", err);
        assert!(display.contains("between"));
        assert!(display.contains('2'));
    }
}
