//! Read-only view of a validation run handed to rule handlers and policies

use serde_json::Value;

use super::presence::PresenceVerifier;
use super::registry::RuleRegistry;
use super::spec::AttributeRuleSet;
use super::value::is_filled;
use crate::path::PathResolver;

/// Everything a rule handler may look at besides its own value.
///
/// Lookups of other attributes go through the run's `PathResolver`, so a
/// cross-field rule sees exactly the same wildcard semantics as the attribute
/// under test.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    data: &'a Value,
    files: Option<&'a Value>,
    rules: &'a AttributeRuleSet,
    registry: &'a RuleRegistry,
    resolver: &'a PathResolver,
    verifier: Option<&'a dyn PresenceVerifier>,
}

impl<'a> RuleContext<'a> {
    /// Creates a context over `data`.
    pub fn new(
        data: &'a Value,
        rules: &'a AttributeRuleSet,
        registry: &'a RuleRegistry,
        resolver: &'a PathResolver,
    ) -> Self {
        Self {
            data,
            files: None,
            rules,
            registry,
            resolver,
            verifier: None,
        }
    }

    /// Adds a secondary tree consulted when `data` has no value.
    pub fn with_files(mut self, files: Option<&'a Value>) -> Self {
        self.files = files;
        self
    }

    /// Adds the presence verifier used by `exists` / `unique`.
    pub fn with_verifier(mut self, verifier: Option<&'a dyn PresenceVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Value of `attribute`: the data tree first, then the files tree.
    /// Absent attributes resolve to null.
    pub fn value(&self, attribute: &str) -> Value {
        let value = self.resolver.resolve(self.data, attribute, &Value::Null);
        if !value.is_null() {
            return value;
        }
        match self.files {
            Some(files) => self.resolver.resolve(files, attribute, &Value::Null),
            None => value,
        }
    }

    /// True if `attribute` resolves to a filled value.
    pub fn is_present(&self, attribute: &str) -> bool {
        is_filled(&self.value(attribute))
    }

    /// True if the path of `attribute` exists, even when it holds null.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.resolver.contains(self.data, attribute)
            || self
                .files
                .map(|files| self.resolver.contains(files, attribute))
                .unwrap_or(false)
    }

    /// True if `attribute` declares any of the given rules.
    pub fn has_rule(&self, attribute: &str, names: &[&str]) -> bool {
        self.rules.has_rule(attribute, names)
    }

    /// True if `rule` is registered as implicit.
    pub fn is_implicit(&self, rule: &str) -> bool {
        self.registry.is_implicit(rule)
    }

    /// The primary data tree.
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// The rule set of the run.
    pub fn rules(&self) -> &'a AttributeRuleSet {
        self.rules
    }

    /// The resolver of the run.
    pub fn resolver(&self) -> &'a PathResolver {
        self.resolver
    }

    /// The configured presence verifier, if any.
    pub fn presence_verifier(&self) -> Option<&'a dyn PresenceVerifier> {
        self.verifier
    }
}
