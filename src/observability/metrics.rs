//! Validation metrics
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Thread-safe but lock-minimal; one instance may be shared by every
//!   validator a factory builds

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for validation runs
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    /// Completed runs
    runs: AtomicU64,
    /// (pattern, rule) pairs evaluated
    rules_evaluated: AtomicU64,
    /// Handler calls, one per element for iterated patterns
    handler_invocations: AtomicU64,
    /// Invocations skipped by the applicability policy
    skipped: AtomicU64,
    /// Failures recorded (after collapsing)
    failures: AtomicU64,
    /// Rule declarations rejected as configuration errors
    configuration_errors: AtomicU64,
}

impl ValidationMetrics {
    /// Create a new metrics instance with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment completed runs
    pub fn increment_runs(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment evaluated (pattern, rule) pairs
    pub fn increment_rules_evaluated(&self) {
        self.rules_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment handler invocations
    pub fn increment_handler_invocations(&self) {
        self.handler_invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment skipped invocations
    pub fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment recorded failures
    pub fn increment_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment configuration errors
    pub fn increment_configuration_errors(&self) {
        self.configuration_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            rules_evaluated: self.rules_evaluated.load(Ordering::Relaxed),
            handler_invocations: self.handler_invocations.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            configuration_errors: self.configuration_errors.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub runs: u64,
    pub rules_evaluated: u64,
    pub handler_invocations: u64,
    pub skipped: u64,
    pub failures: u64,
    pub configuration_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let snapshot = ValidationMetrics::new().snapshot();
        assert_eq!(snapshot.runs, 0);
        assert_eq!(snapshot.handler_invocations, 0);
        assert_eq!(snapshot.failures, 0);
    }

    #[test]
    fn test_increment_counters() {
        let metrics = ValidationMetrics::new();
        metrics.increment_runs();
        metrics.increment_rules_evaluated();
        metrics.increment_rules_evaluated();
        metrics.increment_handler_invocations();
        metrics.increment_skipped();
        metrics.increment_failures();
        metrics.increment_configuration_errors();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.runs, 1);
        assert_eq!(snapshot.rules_evaluated, 2);
        assert_eq!(snapshot.handler_invocations, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.configuration_errors, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = ValidationMetrics::new();
        metrics.increment_failures();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["failures"], 1);
        assert_eq!(json["runs"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(ValidationMetrics::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let m = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.increment_handler_invocations();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().handler_invocations, 800);
    }
}
