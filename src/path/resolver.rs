//! Wildcard-aware path resolver
//!
//! Resolution walks the pattern left to right. A literal segment descends one
//! level; a wildcard segment collects every child of the current node. When the
//! wildcard is not the last segment, the remaining suffix is resolved against
//! each child and the results are gathered into a list. Patterns carrying more
//! than one wildcard splice list results into the output (one level only).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Segment delimiters recognised when no configuration is given.
pub const DEFAULT_DELIMITERS: [char; 2] = [':', '.'];

/// Wildcard token recognised when no configuration is given.
pub const DEFAULT_WILDCARD: &str = "*";

/// Pattern syntax configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Characters separating pattern segments.
    #[serde(default = "default_delimiters")]
    pub delimiters: Vec<char>,
    /// Segment text that matches every child at its level.
    #[serde(default = "default_wildcard")]
    pub wildcard: String,
}

fn default_delimiters() -> Vec<char> {
    DEFAULT_DELIMITERS.to_vec()
}

fn default_wildcard() -> String {
    DEFAULT_WILDCARD.to_string()
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            delimiters: default_delimiters(),
            wildcard: default_wildcard(),
        }
    }
}

/// Resolves attribute patterns against a JSON tree.
///
/// The resolver is stateless apart from its syntax configuration, so one
/// instance can be shared by every lookup of a validation run (including the
/// cross-field lookups rule handlers perform).
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    config: PathConfig,
}

impl PathResolver {
    /// Creates a resolver with the given pattern syntax.
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }

    /// Returns the pattern syntax in use.
    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Resolves `pattern` against `tree`, returning `default` when the path
    /// cannot be followed.
    ///
    /// A pattern that is itself a key of `tree` resolves directly, without
    /// being split, so attribute names containing delimiter characters still
    /// work.
    pub fn resolve(&self, tree: &Value, pattern: &str, default: &Value) -> Value {
        if let Some(direct) = child(tree, pattern) {
            return direct.clone();
        }

        let spans = self.spans(pattern);
        let wildcards = spans
            .iter()
            .filter(|(start, end)| self.is_wildcard(&pattern[*start..*end]))
            .count();

        let mut current = tree;
        for (n, (start, end)) in spans.iter().enumerate() {
            let segment = &pattern[*start..*end];

            if !self.is_wildcard(segment) {
                match child(current, segment) {
                    Some(next) => current = next,
                    None => return default.clone(),
                }
                continue;
            }

            let items = match children(current) {
                Some(items) => items,
                None => return default.clone(),
            };

            // Last segment: the children themselves are the result.
            let Some((suffix_start, _)) = spans.get(n + 1) else {
                return Value::Array(items.into_iter().cloned().collect());
            };
            let suffix = &pattern[*suffix_start..];

            let mut collected = Vec::with_capacity(items.len());
            for item in items {
                match self.resolve(item, suffix, default) {
                    Value::Array(inner) if wildcards > 1 => collected.extend(inner),
                    other => collected.push(other),
                }
            }
            return Value::Array(collected);
        }

        current.clone()
    }

    /// Resolves `pattern`, mapping an unresolvable path (or an explicit null)
    /// to `None`.
    pub fn get(&self, tree: &Value, pattern: &str) -> Option<Value> {
        match self.resolve(tree, pattern, &Value::Null) {
            Value::Null => None,
            value => Some(value),
        }
    }

    /// Returns true if the path exists in `tree`, even when it holds null.
    ///
    /// A wildcard segment only requires a container at its level.
    pub fn contains(&self, tree: &Value, pattern: &str) -> bool {
        if child(tree, pattern).is_some() {
            return true;
        }

        let mut current = tree;
        for segment in self.segments(pattern) {
            if self.is_wildcard(segment) {
                return children(current).is_some();
            }
            match child(current, segment) {
                Some(next) => current = next,
                None => return false,
            }
        }
        true
    }

    /// Splits a pattern into its segments.
    pub fn segments<'p>(&self, pattern: &'p str) -> Vec<&'p str> {
        self.spans(pattern)
            .into_iter()
            .map(|(start, end)| &pattern[start..end])
            .collect()
    }

    /// Returns true if `segment` is the wildcard token.
    pub fn is_wildcard(&self, segment: &str) -> bool {
        segment == self.config.wildcard
    }

    /// Returns true if the pattern contains a wildcard bounded by delimiters
    /// or the pattern edges.
    ///
    /// `a:*:b`, `*:b` and `a:*` qualify; `a*b` and `a:b*` do not.
    pub fn has_wildcard(&self, pattern: &str) -> bool {
        self.wildcard_count(pattern) > 0
    }

    /// Counts delimiter-bounded wildcard segments.
    pub fn wildcard_count(&self, pattern: &str) -> usize {
        self.segments(pattern)
            .into_iter()
            .filter(|segment| self.is_wildcard(segment))
            .count()
    }

    /// Human-facing form of a pattern: an inner index or wildcard segment is
    /// dropped together with its trailing delimiter, so `contacts:*:email`
    /// reads as `contacts:email`.
    ///
    /// Drops do not overlap. A segment right after a dropped one stays, so
    /// `a:*:*:b` reads as `a:*:b`.
    pub fn display_name(&self, pattern: &str) -> String {
        let spans = self.spans(pattern);
        let last = spans.len().saturating_sub(1);

        let mut out = String::with_capacity(pattern.len());
        let mut previous_dropped = false;
        for (n, &(start, end)) in spans.iter().enumerate() {
            let segment = &pattern[start..end];
            let droppable = n > 0
                && n < last
                && !previous_dropped
                && (self.is_wildcard(segment) || index_of(segment).is_some());

            if !droppable {
                let next = spans.get(n + 1).map(|&(s, _)| s).unwrap_or(pattern.len());
                out.push_str(&pattern[start..next]);
            }
            previous_dropped = droppable;
        }
        out
    }

    /// Byte spans of each segment in `pattern`.
    fn spans(&self, pattern: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        for (i, c) in pattern.char_indices() {
            if self.config.delimiters.contains(&c) {
                spans.push((start, i));
                start = i + c.len_utf8();
            }
        }
        spans.push((start, pattern.len()));
        spans
    }
}

/// Looks up a direct child by key (objects) or decimal index (arrays).
fn child<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => index_of(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Immediate children of a container, in iteration order.
fn children(node: &Value) -> Option<Vec<&Value>> {
    match node {
        Value::Object(map) => Some(map.values().collect()),
        Value::Array(items) => Some(items.iter().collect()),
        _ => None,
    }
}

/// Parses a canonical decimal index (`0`, `17`; never `01` or `+1`).
fn index_of(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment.len() == 1 || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}
