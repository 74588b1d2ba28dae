//! The request body for the OpenAI Responses API.

use crate::{General, Item, tool::FunctionSchema};
use serde::Serialize;
use serde_json::{Value, json};

/// The request body for a Responses API completion
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model we are using
    pub model: String,

    /// The conversation items to send
    pub input: Vec<Item>,

    /// A list of tools the model may call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,

    /// Controls which (if any) tool is called by the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,

    /// Whether the model may emit several tool calls in one turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,

    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl Request {
    /// Construct the input items for the request
    pub fn input(mut self, input: &[Item]) -> Self {
        self.input = input.to_vec();
        self
    }

    /// Enable streaming for the request
    pub fn stream(mut self) -> Self {
        self.stream = Some(true);
        self
    }
}

impl From<&General> for Request {
    fn from(config: &General) -> Self {
        Self {
            model: config.model.clone(),
            input: Vec::new(),
            tools: config.tools.as_deref().and_then(serialize_tools),
            tool_choice: config
                .tool_choice
                .as_ref()
                .and_then(|choice| serde_json::to_value(choice).ok()),
            parallel_tool_calls: config.parallel_tool_calls,
            stream: None,
        }
    }
}

/// Serialize tools to the Responses API wire form
fn serialize_tools(tools: &[FunctionSchema]) -> Option<Value> {
    if tools.is_empty() {
        return None;
    }

    let tools: Vec<Value> = tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "name": tool.name,
                "description": tool.description,
                "strict": tool.strict,
                "parameters": tool.parameters,
            })
        })
        .collect();

    Some(Value::Array(tools))
}
