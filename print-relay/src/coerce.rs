//! Coerce-or-default for loosely typed command values
//!
//! Each helper takes a JSON value and either uses it, when it already has
//! the expected type, or falls back to the caller's default. None of them
//! fail.

use serde_json::Value;

/// Integer value, or `default` for anything else (floats and booleans included)
pub fn int_or(value: &Value, default: i64) -> i64 {
    value.as_i64().unwrap_or(default)
}

/// String value, or `default` for anything else
pub fn string_or(value: &Value, default: &str) -> String {
    value.as_str().unwrap_or(default).to_string()
}

/// Integer or boolean (`true` = 1, `false` = 0), else `default`
pub fn level_or(value: &Value, default: i64) -> i64 {
    match value {
        Value::Bool(b) => *b as i64,
        other => other.as_i64().unwrap_or(default),
    }
}

/// Truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text form of any value
///
/// Strings are used as they are, `null` is empty, everything else is
/// rendered as JSON.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_or() {
        assert_eq!(int_or(&json!(4), 1), 4);
        assert_eq!(int_or(&json!("4"), 1), 1);
        assert_eq!(int_or(&json!(2.5), 1), 1);
        assert_eq!(int_or(&json!(true), 2), 2);
    }

    #[test]
    fn test_string_or() {
        assert_eq!(string_or(&json!("FULL"), "PART"), "FULL");
        assert_eq!(string_or(&json!(null), "PART"), "PART");
        assert_eq!(string_or(&json!(3), "normal"), "normal");
    }

    #[test]
    fn test_level_or() {
        assert_eq!(level_or(&json!(true), 1), 1);
        assert_eq!(level_or(&json!(false), 1), 0);
        assert_eq!(level_or(&json!(2), 1), 2);
        assert_eq!(level_or(&json!("double"), 1), 1);
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("no")));
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!({})));
    }

    #[test]
    fn test_display_string() {
        assert_eq!(display_string(&json!("héllo")), "héllo");
        assert_eq!(display_string(&json!(null)), "");
        assert_eq!(display_string(&json!(12)), "12");
        assert_eq!(display_string(&json!(true)), "true");
        assert_eq!(display_string(&json!([1, 2])), "[1,2]");
    }
}
