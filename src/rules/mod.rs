//! Rule subsystem for wildcheck
//!
//! This module provides:
//! - Rule specifications (`name:param1,param2`) and per-attribute rule sets
//! - The rule registry with implicit and iteration-exempt flags
//! - The built-in rule library
//! - Applicability policies deciding whether a rule runs at all
//! - Presence verification for `exists` / `unique`
//!
//! # Design Principles
//!
//! - Rule names are canonicalised once, at registration and at lookup
//! - Handlers see other attributes only through `RuleContext`
//! - A bad rule declaration is an error, never a validation failure

mod builtin;
mod context;
mod errors;
mod policy;
mod presence;
mod registry;
mod spec;
pub mod value;

pub use builtin::require_parameter_count;
pub use context::RuleContext;
pub use errors::{ValidationError, ValidationResult};
pub use policy::{AlwaysApplicable, ApplicabilityPolicy, DefaultApplicability};
pub use presence::{MemoryPresenceVerifier, PresenceVerifier};
pub use registry::{Replacer, RuleHandler, RuleRegistration, RuleRegistry};
pub use spec::{canonical_rule_name, AttributeRuleSet, IntoRules, RuleSpec};
