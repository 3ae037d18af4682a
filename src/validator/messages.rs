//! Failure messages
//!
//! Message lookup order for a failed (attribute, rule):
//!
//! 1. inline `attribute.rule`
//! 2. inline `rule`
//! 3. factory fallback messages (`rule`)
//! 4. the built-in default line
//!
//! `:attribute` is replaced first, then the rule's replacer runs. A replacer
//! registered through `add_replacement` wins over the built-in one.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::path::PathResolver;
use crate::rules::RuleRegistry;

/// Messages per attribute, in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBag {
    messages: IndexMap<String, Vec<String>>,
}

impl MessageBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `message` under `attribute` unless it is already there.
    pub fn add(&mut self, attribute: &str, message: impl Into<String>) {
        let message = message.into();
        let list = self.messages.entry(attribute.to_string()).or_default();
        if !list.contains(&message) {
            list.push(message);
        }
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.messages.get(attribute).map(|m| !m.is_empty()).unwrap_or(false)
    }

    pub fn get(&self, attribute: &str) -> &[String] {
        self.messages.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).first().map(String::as_str)
    }

    /// Every message, attribute by attribute.
    pub fn all(&self) -> Vec<&str> {
        self.messages
            .values()
            .flat_map(|list| list.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Renders failure messages for one validator.
pub struct MessageFormatter<'a> {
    pub custom: &'a IndexMap<String, String>,
    pub fallback: &'a IndexMap<String, String>,
    pub attribute_names: &'a IndexMap<String, String>,
    pub registry: &'a RuleRegistry,
    pub resolver: &'a PathResolver,
}

impl<'a> MessageFormatter<'a> {
    /// Full message for a failed (attribute, rule).
    pub fn format(&self, attribute: &str, rule: &str, parameters: &[String]) -> String {
        let template = self.template(attribute, rule);
        let message = template.replace(":attribute", &self.attribute_name(attribute));

        match self.registry.replacer(rule) {
            Some(replacer) => replacer(&message, attribute, rule, parameters),
            None => self.replace_builtin(message, attribute, rule, parameters),
        }
    }

    fn template(&self, attribute: &str, rule: &str) -> String {
        let specific = format!("{}.{}", attribute, rule);
        self.custom
            .get(&specific)
            .or_else(|| self.custom.get(rule))
            .or_else(|| self.fallback.get(rule))
            .cloned()
            .unwrap_or_else(|| default_message(rule).to_string())
    }

    /// Custom name if one was given, otherwise the display name with
    /// underscores turned into spaces.
    pub fn attribute_name(&self, attribute: &str) -> String {
        match self.attribute_names.get(attribute) {
            Some(name) => name.clone(),
            None => self.resolver.display_name(attribute).replace('_', " "),
        }
    }

    fn attribute_list(&self, parameters: &[String]) -> String {
        parameters
            .iter()
            .map(|p| self.attribute_name(p))
            .collect::<Vec<_>>()
            .join(" / ")
    }

    fn replace_builtin(&self, message: String, attribute: &str, rule: &str, parameters: &[String]) -> String {
        let first = parameters.first().map(String::as_str).unwrap_or("");
        let second = parameters.get(1).map(String::as_str).unwrap_or("");

        match rule {
            "same" | "different" => message.replace(":other", &self.attribute_name(first)),
            "confirmed" => {
                let confirmation = format!("{}_confirmation", attribute);
                message.replace(":other", &self.attribute_name(&confirmation))
            }
            "required_if" => message
                .replace(":other", &self.attribute_name(first))
                .replace(":value", second),
            "required_with" | "required_with_all" | "required_without" | "required_without_all" => {
                message.replace(":values", &self.attribute_list(parameters))
            }
            "in" | "not_in" => message.replace(":values", &parameters.join(", ")),
            "size" => message.replace(":size", first),
            "min" => message.replace(":min", first),
            "max" => message.replace(":max", first),
            "between" => message.replace(":min", first).replace(":max", second),
            "before" | "after" => message.replace(":date", first),
            _ => message,
        }
    }
}

fn default_message(rule: &str) -> &'static str {
    match rule {
        "required" => "The :attribute field is required.",
        "required_with" | "required_with_all" => {
            "The :attribute field is required when :values is present."
        }
        "required_without" | "required_without_all" => {
            "The :attribute field is required when :values is not present."
        }
        "required_if" => "The :attribute field is required when :other is :value.",
        "accepted" => "The :attribute must be accepted.",
        "confirmed" => "The :attribute confirmation does not match.",
        "same" => "The :attribute and :other must match.",
        "different" => "The :attribute and :other must be different.",
        "numeric" => "The :attribute must be a number.",
        "integer" => "The :attribute must be an integer.",
        "size" => "The :attribute must be :size.",
        "min" => "The :attribute must be at least :min.",
        "max" => "The :attribute may not be greater than :max.",
        "between" => "The :attribute must be between :min and :max.",
        "in" | "not_in" => "The selected :attribute is invalid.",
        "alpha" => "The :attribute may only contain letters.",
        "alpha_num" => "The :attribute may only contain letters and numbers.",
        "alpha_dash" => "The :attribute may only contain letters, numbers, and dashes.",
        "regex" => "The :attribute format is invalid.",
        "date" => "The :attribute is not a valid date.",
        "before" => "The :attribute must be a date before :date.",
        "after" => "The :attribute must be a date after :date.",
        "exists" => "The selected :attribute is invalid.",
        "unique" => "The :attribute has already been taken.",
        _ => "The :attribute field is invalid.",
    }
}
