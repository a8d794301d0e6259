//! Forgiving field decoders for stored and fed recipe data.
//!
//! A field of the wrong JSON type decodes as absent instead of failing the
//! whole record. Numbers written as strings are parsed.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Diet;

type Decoded<T, E> = std::result::Result<T, E>;

/// Strings and numbers become trimmed text; anything else is absent
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Decoded<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Decoded<String, D::Error> {
    text(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Decoded<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite()))
}

/// Whole non-negative counts; fractional values round to nearest
pub(crate) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Decoded<Option<u32>, D::Error> {
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v.round() as u32))
}

pub(crate) fn diet<'de, D: Deserializer<'de>>(deserializer: D) -> Decoded<Option<Diet>, D::Error> {
    Ok(Diet::deserialize(Value::deserialize(deserializer)?).ok())
}

/// Arrays keep their string items; a single string splits on commas
pub(crate) fn tags<'de, D: Deserializer<'de>>(deserializer: D) -> Decoded<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}
