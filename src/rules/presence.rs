//! Presence verification for `exists` / `unique`
//!
//! The rule library never talks to storage itself. It asks a
//! `PresenceVerifier` how many records match, and the caller decides what
//! "records" means. `MemoryPresenceVerifier` keeps collections of JSON rows in
//! memory and serves tests and the CLI.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::value::{as_text, loose_eq};

/// Count oracle consulted by the `exists` and `unique` rules.
pub trait PresenceVerifier: Send + Sync {
    /// Counts rows of `collection` whose `column` equals `value`.
    ///
    /// When `excluded_id` is given, rows whose `id_column` equals it are not
    /// counted. `extra` adds `column == value` conditions.
    fn count(
        &self,
        collection: &str,
        column: &str,
        value: &Value,
        excluded_id: Option<&str>,
        id_column: Option<&str>,
        extra: &[(String, String)],
    ) -> ValidationResult<u64>;

    /// Counts rows of `collection` whose `column` is one of `values`.
    fn multi_count(
        &self,
        collection: &str,
        column: &str,
        values: &[Value],
        extra: &[(String, String)],
    ) -> ValidationResult<u64>;
}

/// In-memory collections of JSON rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryPresenceVerifier {
    collections: HashMap<String, Vec<Map<String, Value>>>,
}

impl MemoryPresenceVerifier {
    /// Creates an empty verifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a verifier from `{"collection": [{row}, ...], ...}`.
    pub fn from_value(value: &Value) -> ValidationResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ValidationError::invalid_parameter("exists", "collections must be a JSON object")
        })?;

        let mut verifier = Self::new();
        for (name, rows) in object {
            let rows = rows.as_array().ok_or_else(|| {
                ValidationError::invalid_parameter(
                    "exists",
                    format!("collection '{}' must be an array of objects", name),
                )
            })?;
            for row in rows {
                let row = row.as_object().ok_or_else(|| {
                    ValidationError::invalid_parameter(
                        "exists",
                        format!("collection '{}' must be an array of objects", name),
                    )
                })?;
                verifier.insert(name, row.clone());
            }
        }
        Ok(verifier)
    }

    /// Adds a row to `collection`.
    pub fn insert(&mut self, collection: &str, row: Map<String, Value>) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(row);
    }

    fn rows(&self, collection: &str) -> &[Map<String, Value>] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn matches_extra(row: &Map<String, Value>, extra: &[(String, String)]) -> bool {
    extra.iter().all(|(column, expected)| {
        row.get(column)
            .and_then(as_text)
            .map(|actual| actual == *expected)
            .unwrap_or(false)
    })
}

impl PresenceVerifier for MemoryPresenceVerifier {
    fn count(
        &self,
        collection: &str,
        column: &str,
        value: &Value,
        excluded_id: Option<&str>,
        id_column: Option<&str>,
        extra: &[(String, String)],
    ) -> ValidationResult<u64> {
        let id_column = id_column.unwrap_or("id");
        let count = self
            .rows(collection)
            .iter()
            .filter(|row| row.get(column).map(|v| loose_eq(v, value)).unwrap_or(false))
            .filter(|row| match excluded_id {
                Some(id) => row.get(id_column).and_then(as_text).as_deref() != Some(id),
                None => true,
            })
            .filter(|row| matches_extra(row, extra))
            .count();
        Ok(count as u64)
    }

    fn multi_count(
        &self,
        collection: &str,
        column: &str,
        values: &[Value],
        extra: &[(String, String)],
    ) -> ValidationResult<u64> {
        let count = self
            .rows(collection)
            .iter()
            .filter(|row| {
                row.get(column)
                    .map(|v| values.iter().any(|candidate| loose_eq(v, candidate)))
                    .unwrap_or(false)
            })
            .filter(|row| matches_extra(row, extra))
            .count();
        Ok(count as u64)
    }
}
