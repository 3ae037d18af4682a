//! # Rule Registry
//!
//! Maps canonical rule names to handlers. Each entry carries its own
//! `implicit` and `iteration_exempt` flags, set together at registration.
//!
//! The registry is built during setup and then shared read-only (behind an
//! `Arc`) by every validation run.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::builtin;
use super::context::RuleContext;
use super::errors::ValidationResult;
use super::spec::canonical_rule_name;
use crate::observability::{Event, Logger};

/// A rule body.
///
/// Receives the attribute pattern (never the expanded element path), the
/// value under test, the rule parameters and read access to the rest of the
/// data. Returns `Ok(false)` when the rule does not hold.
pub trait RuleHandler: Send + Sync {
    fn check(
        &self,
        attribute: &str,
        value: &Value,
        parameters: &[String],
        ctx: &RuleContext<'_>,
    ) -> ValidationResult<bool>;
}

impl<F> RuleHandler for F
where
    F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool> + Send + Sync,
{
    fn check(
        &self,
        attribute: &str,
        value: &Value,
        parameters: &[String],
        ctx: &RuleContext<'_>,
    ) -> ValidationResult<bool> {
        self(attribute, value, parameters, ctx)
    }
}

/// Message replacer: `(message, attribute, rule, parameters) -> message`.
pub type Replacer = Arc<dyn Fn(&str, &str, &str, &[String]) -> String + Send + Sync>;

/// One registered rule.
#[derive(Clone)]
pub struct RuleRegistration {
    handler: Arc<dyn RuleHandler>,
    implicit: bool,
    iteration_exempt: bool,
}

impl RuleRegistration {
    /// Creates a registration.
    pub fn new(handler: Arc<dyn RuleHandler>, implicit: bool, iteration_exempt: bool) -> Self {
        Self {
            handler,
            implicit,
            iteration_exempt,
        }
    }

    /// The rule body
    pub fn handler(&self) -> &dyn RuleHandler {
        self.handler.as_ref()
    }

    /// Whether the rule may run on absent attributes
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// Whether the rule receives whole wildcard collections
    pub fn is_iteration_exempt(&self) -> bool {
        self.iteration_exempt
    }
}

impl fmt::Debug for RuleRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistration")
            .field("implicit", &self.implicit)
            .field("iteration_exempt", &self.iteration_exempt)
            .finish_non_exhaustive()
    }
}

/// Registry of rule handlers and message replacers.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, RuleRegistration>,
    replacers: HashMap<String, Replacer>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Creates a registry pre-loaded with the built-in rule library.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Creates a registry with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            replacers: HashMap::new(),
        }
    }

    /// Registers `handler` under `name` with explicit flags.
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register_rule<F>(&mut self, name: &str, handler: F, implicit: bool, iteration_exempt: bool)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.register_handler(name, Arc::new(handler), implicit, iteration_exempt);
    }

    /// Registers a handler trait object under `name` with explicit flags.
    pub fn register_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn RuleHandler>,
        implicit: bool,
        iteration_exempt: bool,
    ) {
        let name = canonical_rule_name(name);
        self.rules.insert(
            name,
            RuleRegistration::new(handler, implicit, iteration_exempt),
        );
    }

    /// Registers a custom rule.
    ///
    /// Custom rules are always iteration-exempt: on a wildcard pattern they
    /// receive the whole matched collection.
    pub fn add_extension<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.register_rule(name, handler, false, true);
        let rule = canonical_rule_name(name);
        Logger::trace(
            Event::RegistryExtended.as_str(),
            &[("implicit", "false"), ("rule", rule.as_str())],
        );
    }

    /// Registers a custom rule that also runs on absent attributes.
    pub fn add_implicit_extension<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        self.register_rule(name, handler, true, true);
        let rule = canonical_rule_name(name);
        Logger::trace(
            Event::RegistryExtended.as_str(),
            &[("implicit", "true"), ("rule", rule.as_str())],
        );
    }

    /// Registers a message replacer for `name`.
    pub fn add_replacement<F>(&mut self, name: &str, replacer: F)
    where
        F: Fn(&str, &str, &str, &[String]) -> String + Send + Sync + 'static,
    {
        self.replacers
            .insert(canonical_rule_name(name), Arc::new(replacer));
    }

    /// Looks up a rule by any spelling of its name.
    pub fn get(&self, name: &str) -> Option<&RuleRegistration> {
        self.rules.get(&canonical_rule_name(name))
    }

    /// Looks up the replacer for a rule.
    pub fn replacer(&self, name: &str) -> Option<&Replacer> {
        self.replacers.get(&canonical_rule_name(name))
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True if `name` is registered as implicit.
    pub fn is_implicit(&self, name: &str) -> bool {
        self.get(name).map(RuleRegistration::is_implicit).unwrap_or(false)
    }

    /// True if `name` is registered as iteration-exempt.
    pub fn is_iteration_exempt(&self, name: &str) -> bool {
        self.get(name)
            .map(RuleRegistration::is_iteration_exempt)
            .unwrap_or(false)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .field("replacers", &self.replacers.len())
            .finish()
    }
}
