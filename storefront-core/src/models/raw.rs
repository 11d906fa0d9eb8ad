//! Field extraction helpers for loosely shaped API JSON.
//!
//! The commerce API is not consistent about identifier keys (`id` vs `_id`),
//! numeric encodings (numbers vs numeric strings) or image shapes (a URL vs
//! an object with a `url`). These helpers normalize those shapes so the
//! entity constructors can stay strict.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// A JSON object as received from the API.
pub(crate) type RawObject = Map<String, Value>;

/// Returns the object behind a value, or an error naming what was expected.
pub(crate) fn as_object<'a>(value: &'a Value, what: &'static str) -> Result<&'a RawObject, CoreError> {
    value
        .as_object()
        .ok_or_else(|| CoreError::InvalidData(format!("{what} is not an object")))
}

/// Unwraps a `{ "data": ... }` envelope when present.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Returns the first present, non-null value among `keys`.
fn first<'a>(obj: &'a RawObject, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Reads an unsigned integer from a number or numeric string.
pub(crate) fn opt_u64(obj: &RawObject, keys: &[&str]) -> Option<u64> {
    match first(obj, keys)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn req_u64(obj: &RawObject, keys: &[&'static str]) -> Result<u64, CoreError> {
    opt_u64(obj, keys).ok_or_else(|| missing(keys))
}

fn missing(keys: &[&'static str]) -> CoreError {
    CoreError::MissingField(keys.first().copied().unwrap_or("field"))
}

/// Reads a non-empty string.
pub(crate) fn opt_str(obj: &RawObject, keys: &[&str]) -> Option<String> {
    match first(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn req_str(obj: &RawObject, keys: &[&'static str]) -> Result<String, CoreError> {
    opt_str(obj, keys).ok_or_else(|| missing(keys))
}

/// Reads a decimal from a number or numeric string.
pub(crate) fn opt_decimal(obj: &RawObject, keys: &[&str]) -> Option<Decimal> {
    match first(obj, keys)? {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

pub(crate) fn req_decimal(obj: &RawObject, keys: &[&'static str]) -> Result<Decimal, CoreError> {
    opt_decimal(obj, keys).ok_or_else(|| missing(keys))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Reads a boolean, accepting `1`/`0` and `"true"`/`"false"` as well.
pub(crate) fn opt_bool(obj: &RawObject, keys: &[&str]) -> Option<bool> {
    match first(obj, keys)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|v| v != 0),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads an image URL from a string, an `{ url }` object, or the first
/// element of an array of either.
pub(crate) fn opt_image(obj: &RawObject, keys: &[&str]) -> Option<String> {
    fn image_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(o) => opt_str(o, &["url", "src", "image"]),
            Value::Array(items) => items.iter().find_map(image_of),
            _ => None,
        }
    }
    keys.iter().filter_map(|k| obj.get(*k)).find_map(image_of)
}

/// Reads every image URL from an array field.
pub(crate) fn images(obj: &RawObject, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => opt_str(o, &["url", "src"]),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Returns the elements of an array payload (after envelope unwrapping).
pub(crate) fn array_items(value: Value) -> Result<Vec<Value>, CoreError> {
    match unwrap_envelope(value) {
        Value::Array(items) => Ok(items),
        // Paginated responses nest the rows one level further down.
        Value::Object(mut obj) => match obj.remove("items").or_else(|| obj.remove("results")) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CoreError::InvalidData("expected an array payload".to_string())),
        },
        _ => Err(CoreError::InvalidData("expected an array payload".to_string())),
    }
}
