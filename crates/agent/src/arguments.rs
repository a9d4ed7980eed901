//! Argument normalization for model-produced tool calls.
//!
//! Model backends disagree about where tool arguments live: some send a
//! parsed object, some a JSON-encoded string, some nest the object under an
//! `args`/`arguments`/`parameters` wrapper, and some send nothing at all.
//! This module converts all of those shapes into a plain string-keyed map
//! exactly once, at the boundary, so the untyped shape never leaks into the
//! executor or the tools.

use serde_json::{Map, Value};
use tracing::warn;

/// Wrapper field names that backends use for the actual argument object.
const WRAPPER_FIELDS: &[&str] = &["args", "arguments", "parameters"];

/// Normalize an untrusted raw argument value into a string-keyed map.
///
/// The repair steps run in order, first match wins:
/// 1. If the value is an object with an `args`/`arguments`/`parameters`
///    wrapper field, unwrap it.
/// 2. If the value (wrapped or not) is a string, parse it as JSON; a parse
///    failure degrades to an empty map with a warning.
/// 3. If the result is empty but the original carried a nested `parameters`
///    object, use that instead.
///
/// Never panics, never errors; any unexpected shape degrades to an empty
/// map. Running it on an already-normalized map returns the same map.
pub fn normalize_arguments(raw: &Value) -> Map<String, Value> {
    let unwrapped = unwrap_field(raw).unwrap_or(raw);
    let mut result = coerce_to_map(unwrapped);

    // An empty result with a nested `parameters` object usually means the
    // wrapper itself was the arguments and the real payload is one level
    // down.
    if result.is_empty()
        && let Some(params) = raw.get("parameters")
        && let Some(map) = params.as_object()
    {
        result = map.clone();
    }

    result
}

fn unwrap_field(raw: &Value) -> Option<&Value> {
    let obj = raw.as_object()?;
    WRAPPER_FIELDS.iter().find_map(|f| obj.get(*f))
}

fn coerce_to_map(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Map::new();
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    warn!(
                        shape = %describe_shape(&other),
                        "Tool arguments parsed to a non-object; treating as empty"
                    );
                    Map::new()
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse tool arguments string; treating as empty");
                    Map::new()
                }
            }
        }
        _ => Map::new(),
    }
}

/// A short human-readable description of a raw argument value's shape,
/// for diagnostics when a call cannot be repaired.
pub fn describe_shape(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "boolean".into(),
        Value::Number(_) => "number".into(),
        Value::String(s) => format!("string of {} chars", s.len()),
        Value::Array(a) => format!("array of {} items", a.len()),
        Value::Object(m) => {
            let mut keys: Vec<&str> = m.keys().map(String::as_str).collect();
            keys.sort_unstable();
            format!("object with keys [{}]", keys.join(", "))
        }
    }
}
