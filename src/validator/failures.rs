//! Failure collection
//!
//! Failures are kept at pattern granularity: a wildcard pattern whose rule
//! fails on three elements still yields a single record.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// One failed (pattern, rule) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// The declared pattern, never an expanded element path
    pub attribute: String,
    /// Canonical rule name
    pub rule: String,
    /// Rule parameters as declared
    pub parameters: Vec<String>,
}

/// Failures of a run: pattern -> rule -> parameters.
///
/// Serializes as `{"pattern": {"rule": ["param", ...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FailureSet {
    failures: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl FailureSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure. Returns false if (attribute, rule) was already
    /// recorded; the parameters are then overwritten with the latest ones.
    pub fn record(&mut self, attribute: &str, rule: &str, parameters: &[String]) -> bool {
        self.failures
            .entry(attribute.to_string())
            .or_default()
            .insert(rule.to_string(), parameters.to_vec())
            .is_none()
    }

    /// True if (attribute, rule) failed.
    pub fn contains(&self, attribute: &str, rule: &str) -> bool {
        self.failures
            .get(attribute)
            .map(|rules| rules.contains_key(rule))
            .unwrap_or(false)
    }

    /// Failed rules of `attribute`, in failure order.
    pub fn get(&self, attribute: &str) -> Option<&IndexMap<String, Vec<String>>> {
        self.failures.get(attribute)
    }

    /// Attributes with at least one failure
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.failures.keys().map(String::as_str)
    }

    /// All failures in recording order.
    pub fn iter(&self) -> impl Iterator<Item = ValidationFailure> + '_ {
        self.failures.iter().flat_map(|(attribute, rules)| {
            rules.iter().map(move |(rule, parameters)| ValidationFailure {
                attribute: attribute.clone(),
                rule: rule.clone(),
                parameters: parameters.clone(),
            })
        })
    }

    /// Number of (attribute, rule) records
    pub fn len(&self) -> usize {
        self.failures.values().map(IndexMap::len).sum()
    }

    /// True if nothing failed
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Drops all records
    pub fn clear(&mut self) {
        self.failures.clear();
    }

    /// JSON form, see the type docs.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
