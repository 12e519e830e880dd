//! Accessors for loosely typed JSON fields.
//!
//! Both document encodings store numbers either as JSON numbers or as
//! numeric strings, and ids either as strings or integers. These helpers
//! accept both and return `None` for anything else (including `null`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a number or a numeric string.
pub fn loose_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Reads an integer layer id (fractional values are rejected).
#[allow(clippy::cast_possible_truncation)] // range checked before the cast
pub fn loose_i32(value: &Value) -> Option<i32> {
    let n = loose_f64(value)?;
    if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return None;
    }
    Some(n as i32)
}

/// Reads a string or a number as a string. Empty strings are `None`.
pub fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `deserialize_with` adaptor for optional loose numbers.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_f64(&value))
}

/// `deserialize_with` adaptor for optional loose integers.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn option_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_i32(&value))
}

/// `deserialize_with` adaptor for optional loose strings.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_string(&value))
}

/// `deserialize_with` adaptor for a required loose string.
///
/// # Errors
///
/// Fails if the value is neither a non-empty string nor a number.
pub fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    loose_string(&value).ok_or_else(|| serde::de::Error::custom("expected a string or number id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(loose_f64(&json!(1.5)), Some(1.5));
        assert_eq!(loose_f64(&json!(" 2.25 ")), Some(2.25));
        assert_eq!(loose_f64(&json!("abc")), None);
        assert_eq!(loose_f64(&Value::Null), None);
    }

    #[test]
    fn integer_layers() {
        assert_eq!(loose_i32(&json!(15)), Some(15));
        assert_eq!(loose_i32(&json!("12")), Some(12));
        assert_eq!(loose_i32(&json!(1.5)), None);
    }

    #[test]
    fn ids_from_numbers() {
        assert_eq!(loose_string(&json!(42)), Some("42".to_string()));
        assert_eq!(loose_string(&json!("")), None);
        assert_eq!(loose_string(&json!(null)), None);
    }
}
