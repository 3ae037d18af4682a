//! Validation run
//!
//! A `Validator` binds one data tree and one rule set to a shared registry and
//! walks the rule set in insertion order:
//!
//! 1. resolve the pattern through the `PathResolver`
//! 2. decide whether the (pattern, rule) pair iterates
//! 3. ask the applicability policy per value
//! 4. invoke the handler, recording at most one failure per (pattern, rule)
//!
//! Configuration and handler errors stop the run and propagate. Failures
//! recorded before the error stay in place.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::failures::FailureSet;
use super::messages::{MessageBag, MessageFormatter};
use crate::observability::{log_event, Event, Logger, ValidationMetrics};
use crate::path::PathResolver;
use crate::rules::{
    ApplicabilityPolicy, AttributeRuleSet, DefaultApplicability, IntoRules, PresenceVerifier,
    RuleContext, RuleRegistry, RuleSpec, ValidationError, ValidationResult,
};

/// One validation run over a data tree.
pub struct Validator {
    data: Value,
    files: Option<Value>,
    rules: AttributeRuleSet,
    registry: Arc<RuleRegistry>,
    resolver: PathResolver,
    policy: Arc<dyn ApplicabilityPolicy>,
    verifier: Option<Arc<dyn PresenceVerifier>>,
    metrics: Option<Arc<ValidationMetrics>>,
    failures: FailureSet,
    messages: MessageBag,
    custom_messages: IndexMap<String, String>,
    fallback_messages: IndexMap<String, String>,
    attribute_names: IndexMap<String, String>,
}

impl Validator {
    /// Creates a validator with the built-in registry, default path syntax and
    /// the default applicability policy.
    pub fn new(data: Value, rules: AttributeRuleSet) -> Self {
        Self {
            data,
            files: None,
            rules,
            registry: Arc::new(RuleRegistry::new()),
            resolver: PathResolver::default(),
            policy: Arc::new(DefaultApplicability),
            verifier: None,
            metrics: None,
            failures: FailureSet::new(),
            messages: MessageBag::new(),
            custom_messages: IndexMap::new(),
            fallback_messages: IndexMap::new(),
            attribute_names: IndexMap::new(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn ApplicabilityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_presence_verifier(mut self, verifier: Arc<dyn PresenceVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ValidationMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Secondary tree consulted when the data tree has no value for a pattern.
    pub fn with_files(mut self, files: Value) -> Self {
        self.files = Some(files);
        self
    }

    /// Inline messages keyed by `rule` or `attribute.rule`.
    pub fn with_messages(mut self, messages: IndexMap<String, String>) -> Self {
        self.custom_messages = messages;
        self
    }

    pub fn with_fallback_messages(mut self, messages: IndexMap<String, String>) -> Self {
        self.fallback_messages = messages;
        self
    }

    /// Human names used for `:attribute` instead of the display name.
    pub fn with_attribute_names(mut self, names: IndexMap<String, String>) -> Self {
        self.attribute_names = names;
        self
    }

    // =========================================================================
    // Registry extensions
    // =========================================================================
    //
    // The registry is shared with the factory and possibly other validators;
    // mutation clones it first.

    /// Registers a custom, iteration-exempt rule for this validator only.
    pub fn add_extension<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut self.registry).add_extension(name, handler);
    }

    /// Registers a custom rule that is implicit and iteration-exempt.
    pub fn add_implicit_extension<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut self.registry).add_implicit_extension(name, handler);
    }

    /// Registers a message replacer for `name`.
    pub fn add_replacement<F>(&mut self, name: &str, replacer: F)
    where
        F: Fn(&str, &str, &str, &[String]) -> String + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.registry).add_replacement(name, replacer);
    }

    /// Appends `rules` to each of `patterns` when `condition` holds for the
    /// data tree.
    pub fn sometimes<R, C>(&mut self, patterns: &[&str], rules: R, condition: C) -> ValidationResult<()>
    where
        R: IntoRules,
        C: FnOnce(&Value) -> bool,
    {
        if !condition(&self.data) {
            return Ok(());
        }
        let rules = rules.into_rules()?;
        for pattern in patterns {
            self.rules.add(*pattern, rules.clone())?;
        }
        Ok(())
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// True if `rule` on `pattern` runs once per element of `value`.
    pub fn is_iterable(&self, pattern: &str, rule: &str, value: &Value) -> bool {
        matches!(value, Value::Array(_) | Value::Object(_))
            && self.resolver.has_wildcard(pattern)
            && !self.registry.is_iteration_exempt(rule)
    }

    /// Evaluates one (pattern, rule) pair and records its failure, if any.
    ///
    /// Returns true if the rule held.
    pub fn validate_attribute(&mut self, pattern: &str, rule: &RuleSpec) -> ValidationResult<bool> {
        if let Some(metrics) = &self.metrics {
            metrics.increment_rules_evaluated();
        }

        let failed = match self.evaluate(pattern, rule) {
            Ok(failed) => failed,
            Err(err) => {
                self.report_error(pattern, rule, &err);
                return Err(err);
            }
        };

        if failed {
            self.add_failure(pattern, rule);
        }
        Ok(!failed)
    }

    /// Runs every declared (pattern, rule) pair in order.
    ///
    /// Returns true if nothing failed. Earlier results are discarded.
    pub fn run(&mut self) -> ValidationResult<bool> {
        self.failures.clear();
        self.messages = MessageBag::new();

        let patterns = self.rules.len().to_string();
        log_event(Event::RunStart, &[("patterns", patterns.as_str())]);

        for (pattern, rule) in self.rules.pairs() {
            self.validate_attribute(&pattern, &rule)?;
        }

        if let Some(metrics) = &self.metrics {
            metrics.increment_runs();
        }
        let failures = self.failures.len().to_string();
        log_event(Event::RunComplete, &[("failures", failures.as_str())]);

        Ok(self.failures.is_empty())
    }

    /// Runs the validator; true if every rule held.
    pub fn passes(&mut self) -> ValidationResult<bool> {
        self.run()
    }

    /// Runs the validator; true if any rule failed.
    pub fn fails(&mut self) -> ValidationResult<bool> {
        self.run().map(|passed| !passed)
    }

    /// Failures of the last run.
    pub fn failed(&self) -> &FailureSet {
        &self.failures
    }

    /// Messages of the last run.
    pub fn messages(&self) -> &MessageBag {
        &self.messages
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn rules(&self) -> &AttributeRuleSet {
        &self.rules
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext::new(&self.data, &self.rules, &self.registry, &self.resolver)
            .with_files(self.files.as_ref())
            .with_verifier(self.verifier.as_deref())
    }

    /// Returns true if the pair failed.
    fn evaluate(&self, pattern: &str, rule: &RuleSpec) -> ValidationResult<bool> {
        let registration = self
            .registry
            .get(&rule.name)
            .ok_or_else(|| ValidationError::UnknownRule(rule.name.clone()))?;
        let handler = registration.handler();
        let ctx = self.context();
        let value = ctx.value(pattern);

        let values = if self.is_iterable(pattern, &rule.name, &value) {
            let mut elements = children_of(value);
            if elements.is_empty() {
                elements.push(Value::Null);
            }
            elements
        } else {
            vec![value]
        };

        let mut failed = false;
        // Every element is checked; the first failure does not stop the loop.
        for value in &values {
            if !self.policy.is_applicable(&rule.name, pattern, value, &ctx) {
                if let Some(metrics) = &self.metrics {
                    metrics.increment_skipped();
                }
                continue;
            }
            if let Some(metrics) = &self.metrics {
                metrics.increment_handler_invocations();
            }
            if !handler.check(pattern, value, &rule.parameters, &ctx)? {
                failed = true;
            }
        }

        Ok(failed)
    }

    fn add_failure(&mut self, pattern: &str, rule: &RuleSpec) {
        if !self.failures.record(pattern, &rule.name, &rule.parameters) {
            return;
        }
        if let Some(metrics) = &self.metrics {
            metrics.increment_failures();
        }

        let message = MessageFormatter {
            custom: &self.custom_messages,
            fallback: &self.fallback_messages,
            attribute_names: &self.attribute_names,
            registry: &self.registry,
            resolver: &self.resolver,
        }
        .format(pattern, &rule.name, &rule.parameters);
        self.messages.add(pattern, message);

        Logger::info(
            Event::RuleFailed.as_str(),
            &[("pattern", pattern), ("rule", rule.name.as_str())],
        );
    }

    fn report_error(&self, pattern: &str, rule: &RuleSpec, err: &ValidationError) {
        let detail = err.to_string();
        let fields = [
            ("code", err.code()),
            ("message", detail.as_str()),
            ("pattern", pattern),
            ("rule", rule.name.as_str()),
        ];

        if err.is_configuration_error() {
            if let Some(metrics) = &self.metrics {
                metrics.increment_configuration_errors();
            }
            Logger::warn(Event::ConfigurationError.as_str(), &fields);
        } else {
            Logger::error(Event::HandlerError.as_str(), &fields);
        }
    }
}

/// Children of a container in native order.
fn children_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => vec![other],
    }
}
