//! Observability subsystem for wildcheck
//!
//! This module provides:
//! - Structured logging (JSON, one record per line, stderr)
//! - Validation counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on validation outcomes
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use wildcheck::observability::{Event, Logger, Severity, ValidationMetrics};
//!
//! Logger::set_threshold(Severity::Info);
//! Logger::info(Event::RunStart.as_str(), &[("patterns", "3")]);
//!
//! let metrics = ValidationMetrics::new();
//! metrics.increment_runs();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, ValidationMetrics};

/// Log a lifecycle event at INFO
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::info(event.as_str(), fields);
}
