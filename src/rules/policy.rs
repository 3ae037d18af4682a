//! Applicability policies
//!
//! A policy decides, per invocation, whether a rule runs at all. The default
//! policy skips non-implicit rules on absent values and honours `sometimes`.

use serde_json::Value;

use super::context::RuleContext;
use super::value::is_filled;

/// Decides whether `rule` should run for `attribute` with `value`.
pub trait ApplicabilityPolicy: Send + Sync {
    fn is_applicable(&self, rule: &str, attribute: &str, value: &Value, ctx: &RuleContext<'_>) -> bool;
}

/// Runs a rule when the value is present or the rule is implicit, and, for
/// attributes marked `sometimes`, only when the attribute exists in the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApplicability;

impl ApplicabilityPolicy for DefaultApplicability {
    fn is_applicable(&self, rule: &str, attribute: &str, value: &Value, ctx: &RuleContext<'_>) -> bool {
        let present_or_implicit = is_filled(value) || ctx.is_implicit(rule);
        present_or_implicit && passes_optional_check(attribute, ctx)
    }
}

fn passes_optional_check(attribute: &str, ctx: &RuleContext<'_>) -> bool {
    if ctx.has_rule(attribute, &["sometimes"]) {
        ctx.has_attribute(attribute)
    } else {
        true
    }
}

/// Runs every rule unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysApplicable;

impl ApplicabilityPolicy for AlwaysApplicable {
    fn is_applicable(&self, _: &str, _: &str, _: &Value, _: &RuleContext<'_>) -> bool {
        true
    }
}
