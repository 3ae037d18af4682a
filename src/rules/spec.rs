//! Rule specifications and attribute rule sets
//!
//! Rules are written as `name` or `name:param1,param2`, several per attribute
//! joined with `|`:
//!
//! ```text
//! "email"        => "required|exists:users,email"
//! "items:*:sku"  => ["required", "regex:/^[A-Z]{3}-\d+$/"]
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ValidationError, ValidationResult};

/// Canonical form of a rule name: snake_case.
///
/// `RequiredWith`, `required_with` and `required-with` all map to
/// `required_with`. Registration and lookup both go through this function.
pub fn canonical_rule_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut after_lower = false;

    for c in name.trim().chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            after_lower = false;
        } else if c.is_uppercase() {
            if after_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            after_lower = false;
        } else {
            out.push(c);
            after_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    out
}

fn starts_with_regex(text: &str) -> bool {
    text.split_once(':')
        .map(|(name, _)| canonical_rule_name(name) == "regex")
        .unwrap_or(false)
}

/// A rule name plus its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Canonical rule name
    pub name: String,
    /// Parameters in declaration order
    pub parameters: Vec<String>,
}

impl RuleSpec {
    /// Creates a rule spec, canonicalising the name.
    pub fn new<I, S>(name: &str, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: canonical_rule_name(name),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `name` or `name:p1,p2`.
    ///
    /// The `regex` rule takes its whole parameter text verbatim, since
    /// patterns routinely contain commas.
    pub fn parse(text: &str) -> ValidationResult<Self> {
        let text = text.trim();
        let (name, raw) = match text.split_once(':') {
            Some((name, raw)) => (name, Some(raw)),
            None => (text, None),
        };

        let name = canonical_rule_name(name);
        if name.is_empty() {
            return Err(ValidationError::InvalidRuleSet(format!(
                "empty rule name in '{}'",
                text
            )));
        }

        let parameters = match raw {
            None => Vec::new(),
            Some(raw) if name == "regex" => vec![raw.to_string()],
            Some(raw) => raw.split(',').map(|p| p.trim().to_string()).collect(),
        };

        Ok(Self { name, parameters })
    }

    /// Parses a `|`-separated rule list.
    ///
    /// A `regex:` entry takes the rest of the text, `|` included, so it must
    /// come last. Use the array form to put rules after a regex.
    pub fn parse_list(text: &str) -> ValidationResult<Vec<Self>> {
        let mut rules = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let (part, tail) = if starts_with_regex(rest) {
                (rest, "")
            } else {
                rest.split_once('|').unwrap_or((rest, ""))
            };
            if !part.trim().is_empty() {
                rules.push(Self::parse(part)?);
            }
            rest = tail;
        }

        Ok(rules)
    }

    /// Returns the parameter at `index`, if any.
    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.parameters.is_empty() {
            write!(f, ":{}", self.parameters.join(","))?;
        }
        Ok(())
    }
}

/// Anything that can be turned into an ordered rule list.
pub trait IntoRules {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>>;
}

impl IntoRules for &str {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        RuleSpec::parse_list(self)
    }
}

impl IntoRules for String {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        RuleSpec::parse_list(&self)
    }
}

impl IntoRules for &[&str] {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        self.iter().map(|rule| RuleSpec::parse(rule)).collect()
    }
}

impl<const N: usize> IntoRules for [&str; N] {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        self.as_slice().into_rules()
    }
}

impl IntoRules for Vec<&str> {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        self.as_slice().into_rules()
    }
}

impl IntoRules for RuleSpec {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        Ok(vec![self])
    }
}

impl IntoRules for Vec<RuleSpec> {
    fn into_rules(self) -> ValidationResult<Vec<RuleSpec>> {
        Ok(self)
    }
}

/// Ordered mapping from attribute pattern to its rules.
///
/// Insertion order is evaluation order. Rules may be appended to an existing
/// pattern (conditional rules) before a run consumes the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRuleSet {
    rules: IndexMap<String, Vec<RuleSpec>>,
}

impl AttributeRuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rules to `pattern`, creating the entry if needed.
    pub fn add(&mut self, pattern: impl Into<String>, rules: impl IntoRules) -> ValidationResult<()> {
        let rules = rules.into_rules()?;
        self.rules.entry(pattern.into()).or_default().extend(rules);
        Ok(())
    }

    /// Builder form of [`AttributeRuleSet::add`].
    pub fn with(mut self, pattern: impl Into<String>, rules: impl IntoRules) -> ValidationResult<Self> {
        self.add(pattern, rules)?;
        Ok(self)
    }

    /// Builds a rule set from JSON.
    ///
    /// Accepts an object whose values are either `|`-joined rule strings or
    /// arrays of rule strings.
    pub fn from_value(value: &Value) -> ValidationResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ValidationError::InvalidRuleSet("rule set must be a JSON object".into())
        })?;

        let mut set = Self::new();
        for (pattern, rules) in object {
            match rules {
                Value::String(text) => set.add(pattern.as_str(), text.as_str())?,
                Value::Array(items) => {
                    let mut specs = Vec::with_capacity(items.len());
                    for item in items {
                        let text = item.as_str().ok_or_else(|| {
                            ValidationError::InvalidRuleSet(format!(
                                "rules for '{}' must be strings",
                                pattern
                            ))
                        })?;
                        specs.push(RuleSpec::parse(text)?);
                    }
                    set.add(pattern.as_str(), specs)?;
                }
                _ => {
                    return Err(ValidationError::InvalidRuleSet(format!(
                        "rules for '{}' must be a string or an array",
                        pattern
                    )))
                }
            }
        }

        Ok(set)
    }

    /// Rules declared for `pattern`.
    pub fn get(&self, pattern: &str) -> Option<&[RuleSpec]> {
        self.rules.get(pattern).map(Vec::as_slice)
    }

    /// True if `pattern` declares any of the given (canonical) rule names.
    pub fn has_rule(&self, pattern: &str, names: &[&str]) -> bool {
        self.rules
            .get(pattern)
            .map(|rules| rules.iter().any(|r| names.contains(&r.name.as_str())))
            .unwrap_or(false)
    }

    /// Iterates patterns and rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleSpec])> {
        self.rules.iter().map(|(p, r)| (p.as_str(), r.as_slice()))
    }

    /// Flattened (pattern, rule) pairs in evaluation order.
    pub fn pairs(&self) -> Vec<(String, RuleSpec)> {
        self.rules
            .iter()
            .flat_map(|(pattern, rules)| rules.iter().map(move |r| (pattern.clone(), r.clone())))
            .collect()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no pattern is declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
