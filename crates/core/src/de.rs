//! Lenient field decoders. The order API is loosely typed: numbers arrive as
//! strings, phones as numbers, and garbage must never sink a whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::Amount;

/// Non-negative finite amount; anything else decodes as `None`.
pub(crate) fn amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|amount| amount.is_finite() && *amount >= 0.0))
}

/// Strings pass through, numbers are rendered, everything else is `None`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    text(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn quantity<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|q| q.is_finite() && *q >= 0.0).map(|q| q as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }))
}

/// `null` reads as the type's default, same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
