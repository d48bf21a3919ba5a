//! Lookup helpers over loosely-typed webhook JSON
//!
//! Every helper is total: missing keys, wrong types and empty values all
//! resolve to `None`, never to a panic.

use serde_json::Value;

/// Text form of a JSON value, `None` when absent, empty, zero or `false`
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Text at a JSON pointer (e.g., `/sdk/name`)
pub fn text_at(value: &Value, pointer: &str) -> Option<String> {
    text(value.pointer(pointer))
}

/// Whether the value is truthy (`true`, non-empty string, non-zero number)
pub fn truthy(value: Option<&Value>) -> bool {
    text(value).is_some()
}

/// First present candidate, else the default literal
pub fn first_present<I>(candidates: I, default: &str) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .next()
        .unwrap_or_else(|| default.to_string())
}

/// Look up a tag value by key
///
/// Tags arrive as `[["key", "value"], ...]`. The first pair whose key matches
/// exactly wins. `{"key": ..., "value": ...}` entries are accepted too.
/// Returns `None` when nothing matches or `tags` is not an array.
pub fn get_tag_value<'a>(tags: &'a Value, key: &str) -> Option<&'a Value> {
    tags.as_array()?.iter().find_map(|tag| match tag {
        Value::Array(pair) if pair.first().and_then(Value::as_str) == Some(key) => {
            Some(pair.get(1).unwrap_or(&Value::Null))
        }
        Value::Object(map) if map.get("key").and_then(Value::as_str) == Some(key) => {
            Some(map.get("value").unwrap_or(&Value::Null))
        }
        _ => None,
    })
}

/// Text of a tag value
pub fn tag_text(tags: &Value, key: &str) -> Option<String> {
    text(get_tag_value(tags, key))
}
