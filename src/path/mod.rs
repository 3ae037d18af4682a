//! Path resolution subsystem for wildcheck
//!
//! Attribute patterns address values inside a nested JSON tree:
//!
//! - `user:name` / `user.name` - literal segments, one per level
//! - `items:0:sku` - decimal segments index into arrays
//! - `items:*:sku` - wildcard segments fan out over every child
//!
//! # Design Principles
//!
//! - The resolver never mutates the tree
//! - Missing segments never produce partial results
//! - Unresolvable paths are not errors; they yield the caller's default

mod resolver;

pub use resolver::{PathConfig, PathResolver, DEFAULT_DELIMITERS, DEFAULT_WILDCARD};
