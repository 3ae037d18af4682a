//! Validation runs for wildcheck
//!
//! This module provides:
//! - `Validator`: one run over one data tree and one rule set
//! - `Factory`: shared registry, policy and presence verifier for many runs
//! - `FailureSet` / `MessageBag`: the outcome of a run
//!
//! # Usage
//!
//! ```ignore
//! use serde_json::json;
//! use wildcheck::rules::AttributeRuleSet;
//! use wildcheck::validator::Factory;
//!
//! let factory = Factory::new();
//! let rules = AttributeRuleSet::new().with("items:*:sku", "required|alpha_dash")?;
//! let mut validator = factory.make(json!({"items": [{"sku": "a-1"}]}), rules);
//! assert!(validator.passes()?);
//! ```

mod engine;
mod factory;
mod failures;
mod messages;

pub use engine::Validator;
pub use factory::Factory;
pub use failures::{FailureSet, ValidationFailure};
pub use messages::{MessageBag, MessageFormatter};
