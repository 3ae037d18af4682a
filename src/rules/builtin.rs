//! Built-in rule library
//!
//! Every rule here is a plain function with the `RuleHandler` signature,
//! registered by canonical name in `register_builtins`.

use regex::RegexBuilder;
use serde_json::Value;

use super::context::RuleContext;
use super::errors::{ValidationError, ValidationResult};
use super::registry::RuleRegistry;
use super::value::{as_number, as_text, is_filled, is_integer, loose_eq, parse_date, parse_date_text, size_of};

/// Rules that make size checks read numbers as numbers.
const NUMERIC_RULES: [&str; 2] = ["numeric", "integer"];

/// Registers the built-in library into `registry`.
pub fn register_builtins(registry: &mut RuleRegistry) {
    // Presence family: implicit, so they run on absent attributes.
    registry.register_rule("required", validate_required, true, false);
    registry.register_rule("required_with", validate_required_with, true, false);
    registry.register_rule("required_with_all", validate_required_with_all, true, false);
    registry.register_rule("required_without", validate_required_without, true, false);
    registry.register_rule("required_without_all", validate_required_without_all, true, false);
    registry.register_rule("required_if", validate_required_if, true, false);
    registry.register_rule("accepted", validate_accepted, true, false);

    registry.register_rule("sometimes", validate_sometimes, false, false);
    registry.register_rule("confirmed", validate_confirmed, false, false);
    registry.register_rule("same", validate_same, false, false);
    registry.register_rule("different", validate_different, false, false);

    registry.register_rule("array", validate_array, false, false);
    registry.register_rule("numeric", validate_numeric, false, false);
    registry.register_rule("integer", validate_integer, false, false);
    registry.register_rule("digits", validate_digits, false, false);
    registry.register_rule("digits_between", validate_digits_between, false, false);
    registry.register_rule("size", validate_size, false, false);
    registry.register_rule("min", validate_min, false, false);
    registry.register_rule("max", validate_max, false, false);
    registry.register_rule("between", validate_between, false, false);
    registry.register_rule("in", validate_in, false, false);
    registry.register_rule("not_in", validate_not_in, false, false);

    registry.register_rule("alpha", validate_alpha, false, false);
    registry.register_rule("alpha_num", validate_alpha_num, false, false);
    registry.register_rule("alpha_dash", validate_alpha_dash, false, false);
    registry.register_rule("regex", validate_regex, false, false);
    registry.register_rule("ip", validate_ip, false, false);

    registry.register_rule("date", validate_date, false, false);
    registry.register_rule("before", validate_before, false, false);
    registry.register_rule("after", validate_after, false, false);

    // `exists` checks a whole wildcard collection in one query.
    registry.register_rule("exists", validate_exists, false, true);
    registry.register_rule("unique", validate_unique, false, false);
}

/// Fails with a configuration error when fewer than `count` parameters are given.
pub fn require_parameter_count(rule: &str, count: usize, parameters: &[String]) -> ValidationResult<()> {
    if parameters.len() < count {
        return Err(ValidationError::InvalidParameterCount {
            rule: rule.to_string(),
            expected: count,
            actual: parameters.len(),
        });
    }
    Ok(())
}

fn numeric_parameter(rule: &str, parameter: &str) -> ValidationResult<f64> {
    parameter
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::invalid_parameter(rule, format!("'{}' is not a number", parameter)))
}

fn attribute_size(attribute: &str, value: &Value, ctx: &RuleContext<'_>) -> f64 {
    size_of(value, ctx.has_rule(attribute, &NUMERIC_RULES))
}

// =============================================================================
// Presence
// =============================================================================

fn validate_required(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(is_filled(value))
}

fn validate_required_with(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("required_with", 1, parameters)?;
    if parameters.iter().any(|other| ctx.is_present(other)) {
        return Ok(is_filled(value));
    }
    Ok(true)
}

fn validate_required_with_all(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("required_with_all", 1, parameters)?;
    if parameters.iter().all(|other| ctx.is_present(other)) {
        return Ok(is_filled(value));
    }
    Ok(true)
}

fn validate_required_without(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("required_without", 1, parameters)?;
    if parameters.iter().any(|other| !ctx.is_present(other)) {
        return Ok(is_filled(value));
    }
    Ok(true)
}

fn validate_required_without_all(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("required_without_all", 1, parameters)?;
    if parameters.iter().all(|other| !ctx.is_present(other)) {
        return Ok(is_filled(value));
    }
    Ok(true)
}

fn validate_required_if(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("required_if", 2, parameters)?;
    let other = as_text(&ctx.value(&parameters[0]));
    let triggered = other
        .map(|text| parameters[1..].iter().any(|candidate| *candidate == text))
        .unwrap_or(false);
    if triggered {
        return Ok(is_filled(value));
    }
    Ok(true)
}

fn validate_accepted(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    let accepted = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "yes" | "on" | "1" | "true"),
        _ => false,
    };
    Ok(accepted)
}

fn validate_sometimes(_: &str, _: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(true)
}

// =============================================================================
// Cross-field
// =============================================================================

fn validate_confirmed(attribute: &str, value: &Value, _: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    let confirmation = ctx.value(&format!("{}_confirmation", attribute));
    Ok(!confirmation.is_null() && loose_eq(value, &confirmation))
}

fn validate_same(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("same", 1, parameters)?;
    let other = ctx.value(&parameters[0]);
    Ok(!other.is_null() && loose_eq(value, &other))
}

fn validate_different(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("different", 1, parameters)?;
    let other = ctx.value(&parameters[0]);
    Ok(!other.is_null() && !loose_eq(value, &other))
}

// =============================================================================
// Numbers and sizes
// =============================================================================

fn validate_numeric(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(as_number(value).is_some())
}

fn validate_integer(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(is_integer(value))
}

fn validate_array(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(matches!(value, Value::Array(_) | Value::Object(_)))
}

/// Digit string (or non-negative integer) of the given length.
fn digit_count(value: &Value) -> Option<usize> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_u64() => n.to_string(),
        _ => return None,
    };
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        Some(text.len())
    } else {
        None
    }
}

fn validate_digits(_: &str, value: &Value, parameters: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("digits", 1, parameters)?;
    let expected = numeric_parameter("digits", &parameters[0])?;
    Ok(digit_count(value).map(|n| n as f64 == expected).unwrap_or(false))
}

fn validate_digits_between(_: &str, value: &Value, parameters: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("digits_between", 2, parameters)?;
    let min = numeric_parameter("digits_between", &parameters[0])?;
    let max = numeric_parameter("digits_between", &parameters[1])?;
    Ok(digit_count(value)
        .map(|n| (n as f64) >= min && (n as f64) <= max)
        .unwrap_or(false))
}

fn validate_size(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("size", 1, parameters)?;
    let expected = numeric_parameter("size", &parameters[0])?;
    Ok(attribute_size(attribute, value, ctx) == expected)
}

fn validate_min(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("min", 1, parameters)?;
    let min = numeric_parameter("min", &parameters[0])?;
    Ok(attribute_size(attribute, value, ctx) >= min)
}

fn validate_max(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("max", 1, parameters)?;
    let max = numeric_parameter("max", &parameters[0])?;
    Ok(attribute_size(attribute, value, ctx) <= max)
}

fn validate_between(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("between", 2, parameters)?;
    let min = numeric_parameter("between", &parameters[0])?;
    let max = numeric_parameter("between", &parameters[1])?;
    let size = attribute_size(attribute, value, ctx);
    Ok(size >= min && size <= max)
}

fn validate_in(_: &str, value: &Value, parameters: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(as_text(value)
        .map(|text| parameters.iter().any(|p| *p == text))
        .unwrap_or(false))
}

fn validate_not_in(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    validate_in(attribute, value, parameters, ctx).map(|found| !found)
}

// =============================================================================
// Text shape
// =============================================================================

fn text_all(value: &Value, accept: impl Fn(char) -> bool) -> bool {
    match value {
        Value::String(s) => !s.is_empty() && s.chars().all(accept),
        _ => false,
    }
}

fn validate_alpha(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(text_all(value, char::is_alphabetic))
}

fn validate_alpha_num(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(text_all(value, char::is_alphanumeric))
}

fn validate_alpha_dash(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(text_all(value, |c| c.is_alphanumeric() || c == '_' || c == '-'))
}

/// Accepts `/pattern/flags` (flags `i`, `m`, `s`, `x`; `u` is implied) or a
/// bare pattern.
fn validate_regex(_: &str, value: &Value, parameters: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("regex", 1, parameters)?;
    let raw = parameters[0].as_str();

    let (pattern, flags) = match (raw.strip_prefix('/'), raw.rfind('/')) {
        (Some(_), Some(end)) if end > 0 => (&raw[1..end], &raw[end + 1..]),
        _ => (raw, ""),
    };

    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'u' => builder.unicode(true),
            other => {
                return Err(ValidationError::invalid_parameter(
                    "regex",
                    format!("unsupported flag '{}'", other),
                ))
            }
        };
    }
    let regex = builder
        .build()
        .map_err(|e| ValidationError::invalid_parameter("regex", e.to_string()))?;

    let matched = match value {
        Value::String(_) | Value::Number(_) => as_text(value).map(|t| regex.is_match(&t)).unwrap_or(false),
        _ => false,
    };
    Ok(matched)
}

fn validate_ip(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(value
        .as_str()
        .map(|s| s.parse::<std::net::IpAddr>().is_ok())
        .unwrap_or(false))
}

// =============================================================================
// Dates
// =============================================================================

fn validate_date(_: &str, value: &Value, _: &[String], _: &RuleContext<'_>) -> ValidationResult<bool> {
    Ok(parse_date(value).is_some())
}

/// The bound is a date literal or, failing that, another attribute's value.
fn date_bound(parameter: &str, ctx: &RuleContext<'_>) -> Option<chrono::NaiveDateTime> {
    parse_date_text(parameter).or_else(|| parse_date(&ctx.value(parameter)))
}

fn validate_before(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("before", 1, parameters)?;
    Ok(match (parse_date(value), date_bound(&parameters[0], ctx)) {
        (Some(date), Some(bound)) => date < bound,
        _ => false,
    })
}

fn validate_after(_: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("after", 1, parameters)?;
    Ok(match (parse_date(value), date_bound(&parameters[0], ctx)) {
        (Some(date), Some(bound)) => date > bound,
        _ => false,
    })
}

// =============================================================================
// Presence verifier backed
// =============================================================================

/// Pairs trailing parameters into `column == value` conditions.
fn extra_conditions(parameters: &[String]) -> Vec<(String, String)> {
    parameters
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// `exists:collection[,column[,extra_column,extra_value...]]`
///
/// A collection value (wildcard pattern, since `exists` is iteration-exempt)
/// passes only if every element is found.
fn validate_exists(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("exists", 1, parameters)?;
    let verifier = ctx
        .presence_verifier()
        .ok_or_else(|| ValidationError::MissingPresenceVerifier("exists".into()))?;

    let collection = parameters[0].as_str();
    let column = parameters.get(1).map(String::as_str).unwrap_or(attribute);
    let extra = extra_conditions(parameters.get(2..).unwrap_or(&[]));

    match value {
        Value::Array(items) => {
            let found = verifier.multi_count(collection, column, items, &extra)?;
            Ok(found >= items.len() as u64)
        }
        Value::Object(map) => {
            let items: Vec<Value> = map.values().cloned().collect();
            let found = verifier.multi_count(collection, column, &items, &extra)?;
            Ok(found >= items.len() as u64)
        }
        scalar => Ok(verifier.count(collection, column, scalar, None, None, &extra)? >= 1),
    }
}

/// `unique:collection[,column[,except_id[,id_column[,extra_column,extra_value...]]]]`
fn validate_unique(attribute: &str, value: &Value, parameters: &[String], ctx: &RuleContext<'_>) -> ValidationResult<bool> {
    require_parameter_count("unique", 1, parameters)?;
    let verifier = ctx
        .presence_verifier()
        .ok_or_else(|| ValidationError::MissingPresenceVerifier("unique".into()))?;

    let collection = parameters[0].as_str();
    let column = parameters.get(1).map(String::as_str).unwrap_or(attribute);

    let (excluded_id, id_column) = match parameters.get(2) {
        Some(id) => {
            let id = if id.eq_ignore_ascii_case("null") { None } else { Some(id.as_str()) };
            (id, Some(parameters.get(3).map(String::as_str).unwrap_or("id")))
        }
        None => (None, None),
    };
    let extra = extra_conditions(parameters.get(4..).unwrap_or(&[]));

    Ok(verifier.count(collection, column, value, excluded_id, id_column, &extra)? == 0)
}
