//! Observable events for wildcheck
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Engine configuration loaded
    ConfigLoaded,

    // Registry
    /// Custom rule registered through the extension API
    RegistryExtended,

    // Validation runs
    /// Validation run begins
    RunStart,
    /// Validation run complete
    RunComplete,
    /// A rule did not hold for an attribute
    RuleFailed,
    /// A rule declaration was rejected (bad parameters, unknown rule)
    ConfigurationError,
    /// A rule handler raised an error
    HandlerError,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RegistryExtended => "REGISTRY_EXTENDED",
            Event::RunStart => "VALIDATION_RUN_BEGIN",
            Event::RunComplete => "VALIDATION_RUN_COMPLETE",
            Event::RuleFailed => "RULE_FAILED",
            Event::ConfigurationError => "RULE_CONFIGURATION_ERROR",
            Event::HandlerError => "RULE_HANDLER_ERROR",
        }
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
            Event::RegistryExtended,
            Event::RunStart,
            Event::RunComplete,
            Event::RuleFailed,
            Event::ConfigurationError,
            Event::HandlerError,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::RunStart), "VALIDATION_RUN_BEGIN");
    }
}
