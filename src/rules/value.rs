//! Value helpers shared by the rule library and the applicability policy

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Returns true if the value counts as present: not null, not a blank
/// string, not an empty array or object.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Scalar text form used for list membership and loose comparison.
///
/// Arrays and objects have no text form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric reading of a number or a numeric string.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// True for integers and integer strings.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

/// Equality with scalar coercion: `"1"` equals `1`.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (left, right) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => as_text(left) == as_text(right),
    }
}

/// Size of a value as the size-family rules see it.
///
/// Numbers count as themselves when the attribute carries a numeric rule,
/// containers count their elements, everything else counts characters.
pub fn size_of(value: &Value, numeric: bool) -> f64 {
    if numeric {
        if let Some(n) = as_number(value) {
            return n;
        }
    }
    match value {
        Value::Array(items) => items.len() as f64,
        Value::Object(map) => map.len() as f64,
        other => as_text(other).map(|s| s.chars().count() as f64).unwrap_or(0.0),
    }
}

/// Parses a date or date-time from text.
///
/// Accepted forms: `2024-01-31`, `2024-01-31 13:45:00`,
/// `2024-01-31T13:45:00` and RFC 3339.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc())
}

/// Parses a date out of a string value.
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    value.as_str().and_then(parse_date_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_filled() {
        assert!(!is_filled(&Value::Null));
        assert!(!is_filled(&json!("   ")));
        assert!(!is_filled(&json!([])));
        assert!(!is_filled(&json!({})));
        assert!(is_filled(&json!(0)));
        assert!(is_filled(&json!(false)));
        assert!(is_filled(&json!("x")));
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(&json!("1"), &json!(1)));
        assert!(loose_eq(&json!([1]), &json!([1])));
        assert!(!loose_eq(&json!([1]), &json!("1")));
        assert!(!loose_eq(&json!("bar"), &json!("boom")));
    }

    #[test]
    fn test_size_of() {
        assert_eq!(size_of(&json!("héllo"), false), 5.0);
        assert_eq!(size_of(&json!("42"), true), 42.0);
        assert_eq!(size_of(&json!("42"), false), 2.0);
        assert_eq!(size_of(&json!([1, 2, 3]), false), 3.0);
    }

    #[test]
    fn test_parse_date_forms() {
        assert!(parse_date_text("2012-01-01").is_some());
        assert!(parse_date_text("2012-01-01 10:00:00").is_some());
        assert!(parse_date_text("2012-01-01T10:00:00+02:00").is_some());
        assert!(parse_date_text("start").is_none());
        assert!(parse_date(&json!(20120101)).is_none());
    }
}
