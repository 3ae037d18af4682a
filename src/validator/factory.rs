//! Validator factory
//!
//! Holds the process-wide pieces every run shares: the rule registry, the
//! path syntax, the applicability policy, the presence verifier, metrics and
//! fallback messages. Registration happens here during setup; validators made
//! afterwards get a read-only `Arc` of the registry.
//!
//! Registering on the factory after validators exist clones the registry, so
//! runs already made keep the snapshot they were built with.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::engine::Validator;
use crate::config::EngineConfig;
use crate::observability::ValidationMetrics;
use crate::path::PathResolver;
use crate::rules::{
    ApplicabilityPolicy, AttributeRuleSet, DefaultApplicability, PresenceVerifier, RuleContext,
    RuleRegistry, ValidationResult,
};

/// Builds validators that share one registry.
pub struct Factory {
    registry: Arc<RuleRegistry>,
    resolver: PathResolver,
    policy: Arc<dyn ApplicabilityPolicy>,
    verifier: Option<Arc<dyn PresenceVerifier>>,
    metrics: Arc<ValidationMetrics>,
    fallback_messages: IndexMap<String, String>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    /// Factory with the built-in rules and default path syntax.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RuleRegistry::new()),
            resolver: PathResolver::default(),
            policy: Arc::new(DefaultApplicability),
            verifier: None,
            metrics: Arc::new(ValidationMetrics::new()),
            fallback_messages: IndexMap::new(),
        }
    }

    /// Factory using the path syntax of `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new().with_resolver(PathResolver::new(config.path.clone()))
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn set_policy(&mut self, policy: Arc<dyn ApplicabilityPolicy>) {
        self.policy = policy;
    }

    pub fn set_presence_verifier(&mut self, verifier: Arc<dyn PresenceVerifier>) {
        self.verifier = Some(verifier);
    }

    /// Message used when a validator has no inline message for `rule`.
    pub fn add_fallback_message(&mut self, rule: &str, message: impl Into<String>) {
        self.fallback_messages
            .insert(crate::rules::canonical_rule_name(rule), message.into());
    }

    /// Registers a custom, iteration-exempt rule.
    pub fn extend<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut self.registry).add_extension(name, handler);
    }

    /// Registers a custom rule that is implicit and iteration-exempt.
    pub fn extend_implicit<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut self.registry).add_implicit_extension(name, handler);
    }

    /// Registers a rule with explicit flags.
    pub fn register_rule<F>(&mut self, name: &str, handler: F, implicit: bool, iteration_exempt: bool)
    where
        F: Fn(&str, &Value, &[String], &RuleContext<'_>) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut self.registry).register_rule(name, handler, implicit, iteration_exempt);
    }

    /// Registers a message replacer.
    pub fn replacer<F>(&mut self, name: &str, replacer: F)
    where
        F: Fn(&str, &str, &str, &[String]) -> String + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.registry).add_replacement(name, replacer);
    }

    /// Builds a validator over `data`.
    pub fn make(&self, data: Value, rules: AttributeRuleSet) -> Validator {
        let validator = Validator::new(data, rules)
            .with_registry(Arc::clone(&self.registry))
            .with_resolver(self.resolver.clone())
            .with_policy(Arc::clone(&self.policy))
            .with_metrics(Arc::clone(&self.metrics))
            .with_fallback_messages(self.fallback_messages.clone());

        match &self.verifier {
            Some(verifier) => validator.with_presence_verifier(Arc::clone(verifier)),
            None => validator,
        }
    }

    /// Builds a validator with inline messages and attribute names.
    pub fn make_with_messages(
        &self,
        data: Value,
        rules: AttributeRuleSet,
        messages: IndexMap<String, String>,
        attribute_names: IndexMap<String, String>,
    ) -> Validator {
        self.make(data, rules)
            .with_messages(messages)
            .with_attribute_names(attribute_names)
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn metrics(&self) -> &Arc<ValidationMetrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathConfig;
    use crate::rules::MemoryPresenceVerifier;
    use serde_json::json;

    fn always_false(_: &str, _: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
        Ok(false)
    }

    #[test]
    fn test_validators_share_registry() {
        let mut factory = Factory::new();
        factory.extend("FooBar", always_false);

        let rules = AttributeRuleSet::new().with("x", "foo_bar").unwrap();
        let mut v = factory.make(json!({"x": 1}), rules);
        assert!(v.fails().unwrap());
        assert!(v.registry().is_iteration_exempt("foo_bar"));
    }

    #[test]
    fn test_later_registration_does_not_touch_made_validator() {
        let mut factory = Factory::new();
        let v = factory.make(json!({}), AttributeRuleSet::new());
        factory.extend("late", always_false);

        assert!(!v.registry().contains("late"));
        assert!(factory.registry().contains("late"));
    }

    #[test]
    fn test_fallback_and_replacer() {
        let mut factory = Factory::new();
        factory.extend("FooBar", always_false);
        factory.add_fallback_message("FooBar", ":attribute is :what");
        factory.replacer("foo-bar", |m, _, _, p| m.replace(":what", &p[0]));

        let rules = AttributeRuleSet::new().with("name", "foo_bar:wrong").unwrap();
        let mut v = factory.make(json!({"name": "x"}), rules);
        v.run().unwrap();
        assert_eq!(v.messages().first("name"), Some("name is wrong"));
    }

    #[test]
    fn test_implicit_extension_with_inline_messages() {
        let mut factory = Factory::new();
        factory.extend_implicit("present", always_false);

        let rules = AttributeRuleSet::new().with("nick_name", "present").unwrap();
        let mut messages = IndexMap::new();
        messages.insert("nick_name.present".to_string(), ":attribute must be sent".to_string());
        let mut names = IndexMap::new();
        names.insert("nick_name".to_string(), "Nickname".to_string());

        let mut v = factory.make_with_messages(json!({}), rules, messages, names);
        assert!(v.fails().unwrap());
        assert_eq!(v.messages().first("nick_name"), Some("Nickname must be sent"));
        assert!(factory.registry().is_implicit("present"));
    }

    #[test]
    fn test_presence_verifier_is_passed_through() {
        let mut factory = Factory::new();
        let tables = MemoryPresenceVerifier::from_value(&json!({"users": [{"email": "a"}]})).unwrap();
        factory.set_presence_verifier(Arc::new(tables));

        let rules = AttributeRuleSet::new().with("email", "exists:users").unwrap();
        let mut v = factory.make(json!({"email": "a"}), rules.clone());
        assert!(v.passes().unwrap());

        let mut v = factory.make(json!({"email": "b"}), rules);
        assert!(v.fails().unwrap());
    }

    #[test]
    fn test_metrics_shared_across_runs() {
        let factory = Factory::new();
        for _ in 0..3 {
            let rules = AttributeRuleSet::new().with("a", "required").unwrap();
            factory.make(json!({"a": 1}), rules).run().unwrap();
        }
        assert_eq!(factory.metrics().snapshot().runs, 3);
    }

    #[test]
    fn test_from_config_uses_path_syntax() {
        let config = EngineConfig {
            path: PathConfig {
                delimiters: vec!['/'],
                wildcard: "#".into(),
            },
            ..EngineConfig::default()
        };
        let factory = Factory::from_config(&config);
        let rules = AttributeRuleSet::new().with("items/#/sku", "required").unwrap();
        let mut v = factory.make(json!({"items": [{"sku": "a"}, {"sku": ""}]}), rules);
        assert!(v.fails().unwrap());
        assert!(v.failed().contains("items/#/sku", "required"));
    }
}
