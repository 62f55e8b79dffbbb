//! Value helpers shared by the filter, facet and sort stages.
//!
//! Stored values are plain [`serde_json::Value`]s. These helpers pin down the
//! three conversions the pipeline relies on:
//!
//! - [`stringify_value`]: the textual form used for facet keys, identifiers
//!   and string comparisons (`3.0` renders as `"3"`, strings are not quoted);
//! - [`as_number`] / [`coerce_number`]: strict and lenient numeric views;
//! - [`values_equal`]: strict type+value equality with numbers compared by
//!   value, so `1` equals `1.0` but never `"1"`.

use serde_json::{Number, Value};

/// Render a value as text.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => stringify_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn stringify_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) => stringify_float(f),
        None => n.to_string(),
    }
}

/// Shortest round-trip text, switching to exponent form outside
/// `[1e-6, 1e21)` with an explicit sign on the exponent (`1e+21`).
fn stringify_float(f: f64) -> String {
    let magnitude = f.abs();
    if f == 0.0 || (1e-6..1e21).contains(&magnitude) {
        return format!("{f}");
    }
    let text = format!("{f:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}

/// The numeric value of a JSON number, `None` for every other type.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Numeric view of a value for range comparisons.
///
/// Numbers are taken as-is and strings are parsed after trimming. Anything
/// else (booleans, null, arrays, objects, non-numeric strings) is not numeric.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => as_number(value),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Strict type+value equality.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify_value(&json!("red")), "red");
        assert_eq!(stringify_value(&json!(3)), "3");
        assert_eq!(stringify_value(&json!(3.0)), "3");
        assert_eq!(stringify_value(&json!(9.99)), "9.99");
        assert_eq!(stringify_value(&json!(-4)), "-4");
        assert_eq!(stringify_value(&json!(true)), "true");
        assert_eq!(stringify_value(&json!(null)), "null");
    }

    #[test]
    fn test_stringify_extreme_floats() {
        assert_eq!(stringify_value(&json!(1e21)), "1e+21");
        assert_eq!(stringify_value(&json!(-2.5e22)), "-2.5e+22");
        assert_eq!(stringify_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(stringify_value(&json!(1.5e-7)), "1.5e-7");
        assert_eq!(stringify_value(&json!(0.000001)), "0.000001");
        assert_eq!(stringify_value(&json!(0.0)), "0");
    }

    #[test]
    fn test_stringify_compound() {
        assert_eq!(stringify_value(&json!(["a", 1, null])), "a,1,");
        assert_eq!(stringify_value(&json!({"k": 1})), "{\"k\":1}");
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(as_number(&json!(5)), Some(5.0));
        assert_eq!(as_number(&json!("5")), None);
        assert_eq!(coerce_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!(null)), None);
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!("red"), &json!("red")));
        assert!(!values_equal(&json!("1"), &json!(1)));
        assert!(!values_equal(&json!(true), &json!("true")));
        assert!(values_equal(&json!(null), &json!(null)));
    }
}
