//! JSON Schema repair for model APIs.
//!
//! Tool argument schemas are produced by generic converters and carry two
//! defects model APIs reject or mishandle:
//!
//! 1. a `$schema` meta-marker that chat-completion endpoints refuse, and
//! 2. missing `required` entries for fields models empirically omit unless
//!    the schema insists on them (e.g. the query string of a search tool).
//!
//! [`sanitize`] fixes both before a schema is sent to a provider.

use serde_json::Value;

/// Sanitize a tool parameter schema for transmission to a model API.
///
/// Recursively removes every `$schema` key and force-marks each name in
/// `required` as a required top-level property. Idempotent.
pub fn sanitize(mut schema: Value, required: &[&str]) -> Value {
    strip_meta(&mut schema);
    force_required(&mut schema, required);
    schema
}

fn strip_meta(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("$schema");
            for nested in map.values_mut() {
                strip_meta(nested);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strip_meta(item);
            }
        }
        _ => {}
    }
}

fn force_required(schema: &mut Value, required: &[&str]) {
    if required.is_empty() {
        return;
    }
    let Value::Object(map) = schema else {
        return;
    };

    let entries = map
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(list) = entries else {
        // Malformed converter output; replace rather than guess.
        *entries = Value::Array(required.iter().map(|f| Value::String((*f).into())).collect());
        return;
    };

    for field in required {
        let already = list.iter().any(|v| v.as_str() == Some(field));
        if !already {
            list.push(Value::String((*field).into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_top_level_meta_marker() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {}
        });
        let clean = sanitize(schema, &[]);
        assert!(clean.get("$schema").is_none());
        assert_eq!(clean["type"], "object");
    }

    #[test]
    fn strips_nested_meta_markers() {
        let schema = json!({
            "type": "object",
            "properties": {
                "filters": {
                    "$schema": "http://json-schema.org/draft-07/schema#",
                    "type": "array",
                    "items": { "$schema": "x", "type": "string" }
                }
            }
        });
        let clean = sanitize(schema, &[]);
        assert!(clean["properties"]["filters"].get("$schema").is_none());
        assert!(clean["properties"]["filters"]["items"].get("$schema").is_none());
    }

    #[test]
    fn forces_required_field() {
        let schema = json!({
            "type": "object",
            "properties": { "query": { "type": "string" } }
        });
        let clean = sanitize(schema, &["query"]);
        assert_eq!(clean["required"], json!(["query"]));
    }

    #[test]
    fn does_not_duplicate_existing_required() {
        let schema = json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });
        let clean = sanitize(schema, &["query"]);
        assert_eq!(clean["required"], json!(["query"]));
    }

    #[test]
    fn appends_to_existing_required() {
        let schema = json!({
            "type": "object",
            "required": ["object"]
        });
        let clean = sanitize(schema, &["query"]);
        assert_eq!(clean["required"], json!(["object", "query"]));
    }

    #[test]
    fn idempotent() {
        let schema = json!({
            "$schema": "x",
            "type": "object",
            "properties": { "query": { "type": "string" } }
        });
        let once = sanitize(schema, &["query"]);
        let twice = sanitize(once.clone(), &["query"]);
        assert_eq!(once, twice);
    }
}
