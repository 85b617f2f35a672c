//! Conversion of JSON-schema parameters into OpenAI strict-mode form
//!
//! Strict mode requires, at every object level:
//! - `additionalProperties: false`
//! - a `properties` map, even when empty
//! - `required` listing every property
//!
//! Optional properties get `"null"` added to their type instead.

use crate::error::{EvalError, Result};
use serde_json::{json, Map, Value};

/// Deepest nesting accepted before the schema is treated as circular
pub const MAX_SCHEMA_DEPTH: usize = 50;

/// Keywords strict mode rejects; they are stripped at every level
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "default",
    "nullable",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
];

const COMBINERS: &[&str] = &["anyOf", "oneOf", "allOf"];

/// Convert a parameters schema to strict mode.
///
/// The input is never mutated; the result is an independent copy whose
/// root always has `type`, `properties`, `required` and
/// `additionalProperties`.
pub fn convert_to_strict_mode_schema(parameters: &Value) -> Result<Value> {
    let mut schema = parameters.clone();
    if let Value::Object(map) = &mut schema {
        apply_strict_mode(map, 0)?;
    }

    let properties = schema
        .get("properties")
        .cloned()
        .unwrap_or_else(|| json!({}));
    let required = schema.get("required").cloned().unwrap_or_else(|| json!([]));

    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    }))
}

fn apply_strict_mode(schema: &mut Map<String, Value>, depth: usize) -> Result<()> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(EvalError::SchemaDepthExceeded {
            max_depth: MAX_SCHEMA_DEPTH,
        });
    }

    for keyword in UNSUPPORTED_KEYWORDS {
        schema.remove(*keyword);
    }

    match schema.get("type").and_then(Value::as_str) {
        Some("object") => apply_to_object(schema, depth)?,
        Some("array") => {
            if let Some(Value::Object(items)) = schema.get_mut("items") {
                apply_strict_mode(items, depth + 1)?;
            }
        }
        _ => {}
    }

    for combiner in COMBINERS {
        if let Some(Value::Array(options)) = schema.get_mut(*combiner) {
            for option in options.iter_mut() {
                if let Value::Object(option) = option {
                    apply_strict_mode(option, depth + 1)?;
                }
            }
        }
    }

    Ok(())
}

fn apply_to_object(schema: &mut Map<String, Value>, depth: usize) -> Result<()> {
    schema.insert("additionalProperties".to_string(), Value::Bool(false));

    let required: Vec<String> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut properties = match schema.remove("properties") {
        Some(Value::Object(properties)) => properties,
        _ => Map::new(),
    };

    let mut all_names = Vec::with_capacity(properties.len());
    for (name, property) in properties.iter_mut() {
        if let Value::Object(property) = property {
            apply_strict_mode(property, depth + 1)?;
            if !required.contains(name) {
                make_nullable(property);
            }
        }
        all_names.push(Value::String(name.clone()));
    }

    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), Value::Array(all_names));
    Ok(())
}

/// Union a property's type with `"null"`, leaving untyped properties alone
fn make_nullable(property: &mut Map<String, Value>) {
    match property.get_mut("type") {
        Some(Value::String(ty)) => {
            let ty = std::mem::take(ty);
            property.insert("type".to_string(), json!([ty, "null"]));
        }
        Some(Value::Array(types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(Value::String("null".to_string()));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_object(levels: usize) -> Value {
        let mut schema = json!({"type": "string"});
        for _ in 0..levels {
            schema = json!({
                "type": "object",
                "properties": {"child": schema},
                "required": ["child"],
            });
        }
        schema
    }

    fn assert_strict_at_every_level(schema: &Value) {
        if schema["type"] == "object" {
            assert_eq!(schema["additionalProperties"], false);
            let properties = schema["properties"].as_object().unwrap();
            let required: Vec<&str> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            for (name, property) in properties {
                assert!(required.contains(&name.as_str()));
                assert_strict_at_every_level(property);
            }
        }
    }

    #[test]
    fn test_optional_params_become_nullable_and_required() {
        let input = json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "integer", "minimum": 1, "default": 10},
                "tags": {"type": ["array", "null"], "items": {"type": "string"}},
            },
            "required": ["query"],
        });
        let strict = convert_to_strict_mode_schema(&input).unwrap();

        assert_eq!(strict["required"], json!(["query", "limit", "tags"]));
        assert_eq!(strict["properties"]["query"]["type"], "string");
        assert_eq!(
            strict["properties"]["limit"],
            json!({"type": ["integer", "null"]})
        );
        assert_eq!(strict["properties"]["tags"]["type"], json!(["array", "null"]));
        assert_eq!(strict["additionalProperties"], false);
    }

    #[test]
    fn test_input_schema_is_not_mutated() {
        let input = json!({
            "type": "object",
            "properties": {"limit": {"type": "integer", "maximum": 5}},
        });
        let before = input.clone();
        let _ = convert_to_strict_mode_schema(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_missing_properties_added() {
        let strict = convert_to_strict_mode_schema(&json!({"type": "object"})).unwrap();
        assert_eq!(strict["properties"], json!({}));
        assert_eq!(strict["required"], json!([]));
    }

    #[test]
    fn test_ten_levels_convert_successfully() {
        let strict = convert_to_strict_mode_schema(&nested_object(10)).unwrap();
        assert_strict_at_every_level(&strict);
    }

    #[test]
    fn test_sixty_levels_hit_depth_guard() {
        let err = convert_to_strict_mode_schema(&nested_object(60)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("maximum depth"));
        assert!(msg.contains("circular reference"));
    }

    #[test]
    fn test_array_items_and_combiners_are_converted() {
        let input = json!({
            "type": "object",
            "properties": {
                "filters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"field": {"type": "string", "pattern": "^a"}},
                    },
                },
                "target": {
                    "anyOf": [
                        {"type": "object", "properties": {"id": {"type": "string"}}},
                        {"type": "string", "format": "uri"},
                    ],
                },
            },
        });
        let strict = convert_to_strict_mode_schema(&input).unwrap();

        let item = &strict["properties"]["filters"]["items"];
        assert_eq!(item["additionalProperties"], false);
        assert_eq!(item["required"], json!(["field"]));
        assert!(item["properties"]["field"].get("pattern").is_none());

        let options = strict["properties"]["target"]["anyOf"].as_array().unwrap();
        assert_eq!(options[0]["additionalProperties"], false);
        assert!(options[1].get("format").is_none());
    }
}
