//! Response abstractions for the unified gateway interface.

use crate::{item::Role, tool::FunctionCall};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A completed model response: an ordered list of output items.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Response {
    /// A unique identifier for the response
    #[serde(default)]
    pub id: CompactString,

    /// The model that produced the response
    #[serde(default)]
    pub model: CompactString,

    /// The ordered output items
    #[serde(default)]
    pub output: Vec<OutputItem>,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Response {
    /// The function calls in this response, in emission order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Whether any output item is a function call.
    pub fn has_function_calls(&self) -> bool {
        self.output
            .iter()
            .any(|item| matches!(item, OutputItem::FunctionCall(_)))
    }

    /// Concatenate the text of all message output items.
    ///
    /// Each text part is newline-terminated, matching the answer format
    /// callers receive for a plain-message response.
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        for item in &self.output {
            if let OutputItem::Message { content, .. } = item {
                for part in content {
                    if let OutputContent::OutputText { text: t } = part {
                        text.push_str(t);
                        text.push('\n');
                    }
                }
            }
        }
        text
    }
}

/// One output item of a model response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    /// A plain message from the model
    Message {
        /// The role of the message author
        #[serde(default)]
        role: Role,
        /// The message content parts
        #[serde(default)]
        content: Vec<OutputContent>,
    },

    /// A request to invoke a tool
    FunctionCall(FunctionCall),

    /// Any output item kind this crate does not interpret
    #[serde(other)]
    Unknown,
}

/// A content part within a message output item
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContent {
    /// Generated text
    OutputText {
        /// The text fragment
        text: String,
    },

    /// Any content kind this crate does not interpret
    #[serde(other)]
    Unknown,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Usage {
    /// Number of tokens in the input
    #[serde(default)]
    pub input_tokens: u32,

    /// Number of tokens in the output
    #[serde(default)]
    pub output_tokens: u32,

    /// Total number of tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_response() -> Response {
        serde_json::from_value(serde_json::json!({
            "id": "resp_1",
            "model": "gpt-4.1",
            "output": [
                {
                    "type": "function_call",
                    "call_id": "c1",
                    "name": "get_weather",
                    "arguments": "{\"location\":\"Paris\"}"
                },
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        { "type": "output_text", "text": "It is 15C and cloudy in Paris." }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn function_calls_in_emission_order() {
        let response = weather_response();
        let calls = response.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].call_id, "c1");
        assert!(response.has_function_calls());
    }

    #[test]
    fn output_text_newline_terminated() {
        let response = weather_response();
        assert_eq!(response.output_text(), "It is 15C and cloudy in Paris.\n");
    }

    #[test]
    fn unknown_output_items_tolerated() {
        let response: Response = serde_json::from_value(serde_json::json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [{ "type": "output_text", "text": "ok" }]
                }
            ]
        }))
        .unwrap();
        assert!(!response.has_function_calls());
        assert_eq!(response.output_text(), "ok\n");
    }

    #[test]
    fn empty_response_has_no_text() {
        let response = Response::default();
        assert_eq!(response.output_text(), "");
        assert!(response.function_calls().is_empty());
    }
}
