//! # Value Helpers
//!
//! Small accessors over `serde_json::Value` trees shared by every converter.

use serde_json::{Map, Number, Value};

/// Reads a string field. Numbers and booleans are stringified.
pub(crate) fn get_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_to_string)
}

/// Stringifies a scalar.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a boolean field. The strings `"true"` / `"false"` are accepted.
pub(crate) fn get_bool(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// Reads a non-negative integer field.
pub(crate) fn get_u64(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Reads a numeric field, keeping integer / float distinction.
pub(crate) fn get_number(value: &Value, key: &str) -> Option<Number> {
    match value.get(key)? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => serde_json::from_str::<Number>(s).ok(),
        _ => None,
    }
}

/// Accepts a single string or a list of strings.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}

/// Iterates a map, or a RAML 0.8 style list of single-key maps.
pub(crate) fn named_entries(value: Option<&Value>) -> Vec<(String, Value)> {
    match value {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect(),
        _ => Vec::new(),
    }
}

/// Inserts `key` only when the value is present.
pub(crate) fn insert_opt<T: Into<Value>>(
    map: &mut Map<String, Value>,
    key: &str,
    value: Option<T>,
) {
    if let Some(v) = value {
        map.insert(key.to_string(), v.into());
    }
}

/// Inserts a string list only when it is not empty.
pub(crate) fn insert_list(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(
            key.to_string(),
            Value::Array(values.iter().cloned().map(Value::String).collect()),
        );
    }
}

/// Inserts a nested object only when it has entries.
pub(crate) fn insert_object(map: &mut Map<String, Value>, key: &str, value: Map<String, Value>) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::Object(value));
    }
}

/// Parses text that looks like a JSON document (`{` / `[` prefix).
pub(crate) fn parse_embedded_json(text: &str) -> Option<Value> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).ok()
    } else {
        None
    }
}
