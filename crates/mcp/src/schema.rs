//! Strict function-schema normalization.
//!
//! Converts a backend's declared input schema into the strict schema
//! the model requires: every declared property becomes required, with
//! optionality preserved by widening the property's type to a
//! `[T, "null"]` union, and `additionalProperties` defaults to false.
//! The transform is pure and order-preserving — identical input always
//! yields identical output, and property order survives into the
//! `required` list.

use crate::backend::ToolDescriptor;
use llm::FunctionSchema;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use thiserror::Error;

/// A malformed tool schema, rejected at registration time.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SchemaError(String);

/// Normalize a backend tool declaration into a strict function schema.
pub fn normalize(descriptor: &ToolDescriptor) -> Result<FunctionSchema, SchemaError> {
    let parameters = strict_node(&descriptor.input_schema, "object")?;
    let parameters = serde_json::from_value(Value::Object(parameters))
        .map_err(|e| SchemaError(format!("not a valid parameter schema: {e}")))?;

    Ok(FunctionSchema {
        name: descriptor.name.clone(),
        description: descriptor.description.clone(),
        strict: true,
        parameters,
    })
}

/// Rewrite one schema node; `default_type` applies when the node
/// declares no `type` ("object" at the root, "string" for properties).
fn strict_node(node: &Map<String, Value>, default_type: &str) -> Result<Map<String, Value>, SchemaError> {
    let declared = match node.get("type") {
        Some(ty) => validated_type(ty)?,
        None => Value::String(default_type.to_owned()),
    };

    let mut out = Map::new();
    out.insert("type".to_owned(), declared.clone());

    if let Some(text) = node.get("description").or_else(|| node.get("title")) {
        out.insert("description".to_owned(), text.clone());
    }
    if let Some(options) = node.get("enum") {
        out.insert("enum".to_owned(), options.clone());
    }

    match primary_kind(&declared) {
        "object" => strict_object(node, &mut out)?,
        "array" => strict_array(node, &mut out)?,
        _ => {}
    }

    Ok(out)
}

/// Apply the forced-required rewrite to an object node.
fn strict_object(node: &Map<String, Value>, out: &mut Map<String, Value>) -> Result<(), SchemaError> {
    let empty = Map::new();
    let properties = match node.get("properties") {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(SchemaError(format!(
                "'properties' must be an object, got: {other}"
            )));
        }
        None => &empty,
    };

    let originally_required = match node.get("required") {
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| match name {
                Value::String(s) => Ok(s.as_str()),
                other => Err(SchemaError(format!(
                    "'required' entries must be strings, got: {other}"
                ))),
            })
            .collect::<Result<BTreeSet<_>, _>>()?,
        Some(other) => {
            return Err(SchemaError(format!(
                "'required' must be an array, got: {other}"
            )));
        }
        None => BTreeSet::new(),
    };

    let mut strict_properties = Map::new();
    let mut required = Vec::with_capacity(properties.len());
    for (name, prop) in properties {
        let Value::Object(prop) = prop else {
            return Err(SchemaError(format!(
                "property '{name}' must be an object schema"
            )));
        };
        let mut strict = strict_node(prop, "string")?;
        if !originally_required.contains(name.as_str()) {
            let widened = nullable(&strict["type"]);
            strict.insert("type".to_owned(), widened);
        }
        strict_properties.insert(name.clone(), Value::Object(strict));
        required.push(Value::String(name.clone()));
    }

    out.insert("properties".to_owned(), Value::Object(strict_properties));
    out.insert("required".to_owned(), Value::Array(required));
    out.insert(
        "additionalProperties".to_owned(),
        node.get("additionalProperties")
            .cloned()
            .unwrap_or(Value::Bool(false)),
    );
    Ok(())
}

/// Recurse into an array node's item schema.
fn strict_array(node: &Map<String, Value>, out: &mut Map<String, Value>) -> Result<(), SchemaError> {
    match node.get("items") {
        Some(Value::Object(items)) => {
            let strict = strict_node(items, "string")?;
            out.insert("items".to_owned(), Value::Object(strict));
        }
        Some(other) => {
            return Err(SchemaError(format!(
                "'items' must be an object schema, got: {other}"
            )));
        }
        None => {}
    }
    Ok(())
}

/// A `type` is a string or a union of strings.
fn validated_type(ty: &Value) -> Result<Value, SchemaError> {
    match ty {
        Value::String(_) => Ok(ty.clone()),
        Value::Array(entries) if entries.iter().all(Value::is_string) => Ok(ty.clone()),
        other => Err(SchemaError(format!(
            "'type' must be a string or an array of strings, got: {other}"
        ))),
    }
}

/// The kind that drives recursion; for a union, the first non-null entry.
fn primary_kind(ty: &Value) -> &str {
    match ty {
        Value::String(s) => s,
        Value::Array(entries) => entries
            .iter()
            .filter_map(Value::as_str)
            .find(|s| *s != "null")
            .unwrap_or("null"),
        _ => "string",
    }
}

/// Widen a type to a union with `"null"`; already-nullable unions pass
/// through unchanged so the transform is idempotent.
fn nullable(ty: &Value) -> Value {
    match ty {
        Value::String(s) => json!([s, "null"]),
        Value::Array(entries) => {
            if entries.iter().any(|e| e == "null") {
                ty.clone()
            } else {
                let mut widened = entries.clone();
                widened.push(json!("null"));
                Value::Array(widened)
            }
        }
        _ => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(input_schema: Value) -> ToolDescriptor {
        let Value::Object(input_schema) = input_schema else {
            panic!("input schema must be an object");
        };
        ToolDescriptor {
            name: "subject".into(),
            description: "a tool".into(),
            input_schema,
        }
    }

    fn parameters(input_schema: Value) -> Value {
        let schema = normalize(&descriptor(input_schema)).unwrap();
        serde_json::to_value(&schema.parameters).unwrap()
    }

    #[test]
    fn optional_property_widens_to_nullable() {
        let params = parameters(json!({
            "type": "object",
            "properties": { "x": { "type": "string" } },
            "required": []
        }));
        assert_eq!(params["properties"]["x"]["type"], json!(["string", "null"]));
        assert_eq!(params["required"], json!(["x"]));
        assert_eq!(params["additionalProperties"], json!(false));
    }

    #[test]
    fn required_property_keeps_its_type() {
        let params = parameters(json!({
            "type": "object",
            "properties": { "location": { "type": "string", "description": "a city" } },
            "required": ["location"]
        }));
        assert_eq!(params["properties"]["location"]["type"], "string");
        assert_eq!(params["properties"]["location"]["description"], "a city");
        assert_eq!(params["required"], json!(["location"]));
    }

    #[test]
    fn property_order_survives_into_required() {
        let params = parameters(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "number" },
                "alpha": { "type": "string" },
                "mid": { "type": "boolean" }
            },
            "required": ["alpha"]
        }));
        assert_eq!(params["required"], json!(["zeta", "alpha", "mid"]));
    }

    #[test]
    fn missing_types_default_object_root_string_property() {
        let params = parameters(json!({
            "properties": { "x": {} }
        }));
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["x"]["type"], json!(["string", "null"]));
    }

    #[test]
    fn title_falls_back_for_description() {
        let params = parameters(json!({
            "type": "object",
            "properties": { "x": { "type": "string", "title": "The X" } },
            "required": ["x"]
        }));
        assert_eq!(params["properties"]["x"]["description"], "The X");
    }

    #[test]
    fn enum_copied_verbatim() {
        let params = parameters(json!({
            "type": "object",
            "properties": {
                "unit": { "type": "string", "enum": ["celsius", "fahrenheit"] }
            },
            "required": ["unit"]
        }));
        assert_eq!(
            params["properties"]["unit"]["enum"],
            json!(["celsius", "fahrenheit"])
        );
    }

    #[test]
    fn nested_objects_rewritten_recursively() {
        let params = parameters(json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "object",
                    "properties": {
                        "street": { "type": "string" },
                        "zip": { "type": "string" }
                    },
                    "required": ["street"]
                }
            },
            "required": ["address"]
        }));
        let address = &params["properties"]["address"];
        assert_eq!(address["required"], json!(["street", "zip"]));
        assert_eq!(address["properties"]["zip"]["type"], json!(["string", "null"]));
        assert_eq!(address["additionalProperties"], json!(false));
    }

    #[test]
    fn arrays_recurse_into_items() {
        let params = parameters(json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["tags"]
        }));
        let tags = &params["properties"]["tags"];
        assert_eq!(tags["type"], "array");
        assert_eq!(tags["items"]["type"], "string");
    }

    #[test]
    fn explicit_additional_properties_respected() {
        let params = parameters(json!({
            "type": "object",
            "properties": {},
            "additionalProperties": true
        }));
        assert_eq!(params["additionalProperties"], json!(true));
    }

    #[test]
    fn normalization_is_idempotent() {
        let source = json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "limit": { "type": "integer", "description": "max results" },
                "filter": {
                    "type": "object",
                    "properties": { "tag": { "type": "string" } }
                }
            },
            "required": ["query"]
        });
        let once = parameters(source);
        let twice = parameters(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_required_rejected() {
        let result = normalize(&descriptor(json!({
            "type": "object",
            "properties": { "x": { "type": "string" } },
            "required": "x"
        })));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_properties_rejected() {
        let result = normalize(&descriptor(json!({
            "type": "object",
            "properties": ["x"]
        })));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_type_rejected() {
        let result = normalize(&descriptor(json!({
            "type": 7
        })));
        assert!(result.is_err());
    }
}
