//! wildcheck - wildcard-aware path resolution and rule validation for JSON
//!
//! - `path`: resolves attribute patterns (`items:*:sku`) against a tree
//! - `rules`: rule specs, the rule registry and the built-in rule library
//! - `validator`: validation runs and the factory that builds them
//! - `config`, `observability`, `cli`: the ambient stack

pub mod cli;
pub mod config;
pub mod observability;
pub mod path;
pub mod rules;
pub mod validator;
