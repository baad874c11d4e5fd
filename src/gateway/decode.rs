//! Strict decoding of model output.
//!
//! Model text is parsed as JSON and checked against the declared output
//! schema before it becomes a typed value. Any mismatch is a
//! [`GatewayError`]; nothing half-populated leaves this module.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use super::prompts::{analysis_result_schema, recommendation_set_schema};
use super::types::{AnalysisResult, RecommendationSet};
use crate::error::GatewayError;

pub fn decode_analysis_result(text: &str) -> Result<AnalysisResult, GatewayError> {
    let value = parse_output(text)?;
    decode_against(value, &analysis_result_schema())
}

/// Missing or null top-level lists are read as empty; everything inside a
/// list must match the schema.
pub fn decode_recommendation_set(text: &str) -> Result<RecommendationSet, GatewayError> {
    let mut value = parse_output(text)?;
    if let Value::Object(map) = &mut value {
        for key in ["recommendedRecipes", "recommendedRestaurants"] {
            let entry = map.entry(key).or_insert(Value::Null);
            if entry.is_null() {
                *entry = Value::Array(Vec::new());
            }
        }
    }
    decode_against(value, &recommendation_set_schema())
}

fn parse_output(text: &str) -> Result<Value, GatewayError> {
    let text = strip_markdown_json(text);
    if text.is_empty() {
        error!("Model returned empty output");
        return Err(GatewayError::EmptyOutput);
    }

    let value: Value = serde_json::from_str(&text).map_err(|e| {
        let truncated = if text.len() > 500 {
            format!("{}...", truncate_chars(&text, 500))
        } else {
            text.clone()
        };
        let msg = format!("{}. Raw response (first 500 chars): {}", e, truncated);
        error!("Failed to parse model output as JSON: {}", msg);
        GatewayError::MalformedOutput(msg)
    })?;

    if value.is_null() {
        error!("Model returned null output");
        return Err(GatewayError::EmptyOutput);
    }
    Ok(value)
}

fn decode_against<T: DeserializeOwned>(value: Value, schema: &Value) -> Result<T, GatewayError> {
    check_schema(&value, schema, "$").map_err(|msg| {
        error!("Model output does not match schema: {}", msg);
        GatewayError::SchemaMismatch(msg)
    })?;
    serde_json::from_value(value).map_err(|e| GatewayError::SchemaMismatch(e.to_string()))
}

/// Check `value` against the subset of JSON Schema used by our output
/// schemas: `type` (object, array, string, number), `required`,
/// `properties` and `items`. Extra properties are tolerated.
fn check_schema(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    match schema["type"].as_str() {
        Some("object") => {
            let map = value
                .as_object()
                .ok_or_else(|| format!("{}: expected object, got {}", path, type_name(value)))?;

            if let Some(required) = schema["required"].as_array() {
                for field in required.iter().filter_map(Value::as_str) {
                    if !map.contains_key(field) {
                        return Err(format!("{}: missing required field '{}'", path, field));
                    }
                }
            }
            if let Some(properties) = schema["properties"].as_object() {
                for (name, property_schema) in properties {
                    if let Some(field_value) = map.get(name) {
                        check_schema(field_value, property_schema, &format!("{}.{}", path, name))?;
                    }
                }
            }
            Ok(())
        }
        Some("array") => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("{}: expected array, got {}", path, type_name(value)))?;
            for (i, item) in items.iter().enumerate() {
                check_schema(item, &schema["items"], &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        Some("string") if !value.is_string() => {
            Err(format!("{}: expected string, got {}", path, type_name(value)))
        }
        Some("number") if !value.is_number() => {
            Err(format!("{}: expected number, got {}", path, type_name(value)))
        }
        _ => Ok(()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Strip markdown code fences from a model response if present.
/// Some providers wrap JSON in ```json ... ``` even when told not to.
pub(crate) fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove opening fence (with optional language tag)
        let after_open = match trimmed.find('\n') {
            Some(pos) => &trimmed[pos + 1..],
            None => trimmed.trim_start_matches('`'),
        };
        let cleaned = after_open.trim_end();
        match cleaned.strip_suffix("```") {
            Some(inner) => inner.trim().to_string(),
            None => cleaned.to_string(),
        }
    } else {
        trimmed.to_string()
    }
}
