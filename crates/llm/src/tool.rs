//! Tool abstractions for the unified gateway interface.

use compact_str::CompactString;
use schemars::Schema;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Unexpected},
};
use serde_json::Value;

/// A normalized function schema handed to the model.
///
/// Produced by registering a tool backend: every declared property is
/// required (optionality survives as a `[T, "null"]` type union) and
/// `additionalProperties` is false unless the source said otherwise.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionSchema {
    /// The name of the tool
    pub name: CompactString,

    /// The description of the tool
    pub description: String,

    /// Whether the model must match the parameter schema exactly
    pub strict: bool,

    /// The parameters of the tool
    pub parameters: Schema,
}

/// A function call made by the model
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FunctionCall {
    /// Correlation id pairing this call with its eventual output
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub call_id: CompactString,

    /// The name of the function to call
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub name: CompactString,

    /// The arguments to pass to the function (JSON string)
    #[serde(default)]
    pub arguments: String,
}

impl FunctionCall {
    /// Append streamed argument characters to this call.
    pub fn push_arguments(&mut self, fragment: &str) {
        self.arguments.push_str(fragment);
    }
}

/// Controls which tool is called by the model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Model will not call any tool
    None,

    /// Model can pick between generating a message or calling tools
    #[default]
    Auto,

    /// Model must call one or more tools
    Required,

    /// Model must call the named function
    Function(CompactString),
}

impl Serialize for ToolChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_str("none"),
            Self::Auto => serializer.serialize_str("auto"),
            Self::Required => serializer.serialize_str("required"),
            Self::Function(name) => FunctionChoice {
                kind: "function",
                name: name.as_str(),
            }
            .serialize(serializer),
        }
    }
}

#[derive(Serialize)]
struct FunctionChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

impl<'de> Deserialize<'de> for ToolChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::String(s) => match s.as_str() {
                "none" => Ok(Self::None),
                "auto" => Ok(Self::Auto),
                "required" => Ok(Self::Required),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"none, auto or required",
                )),
            },
            Value::Object(map) => match map.get("name").and_then(Value::as_str) {
                Some(name) => Ok(Self::Function(name.into())),
                None => Err(de::Error::missing_field("name")),
            },
            _ => Err(de::Error::custom("expected string or object tool choice")),
        }
    }
}

impl From<&str> for ToolChoice {
    fn from(value: &str) -> Self {
        ToolChoice::Function(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_choice_modes_serialize_as_strings() {
        assert_eq!(
            serde_json::to_value(ToolChoice::Auto).unwrap(),
            serde_json::json!("auto")
        );
        assert_eq!(
            serde_json::to_value(ToolChoice::None).unwrap(),
            serde_json::json!("none")
        );
        assert_eq!(
            serde_json::to_value(ToolChoice::Required).unwrap(),
            serde_json::json!("required")
        );
    }

    #[test]
    fn tool_choice_function_serializes_as_object() {
        let value = serde_json::to_value(ToolChoice::from("search")).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["name"], "search");
    }

    #[test]
    fn tool_choice_round_trips() {
        for choice in [
            ToolChoice::None,
            ToolChoice::Auto,
            ToolChoice::Required,
            ToolChoice::Function("ping".into()),
        ] {
            let value = serde_json::to_value(&choice).unwrap();
            let back: ToolChoice = serde_json::from_value(value).unwrap();
            assert_eq!(back, choice);
        }
    }
}
