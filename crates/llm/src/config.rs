//! Configuration for a completion request.

use crate::tool::{FunctionSchema, ToolChoice};
use serde::{Deserialize, Serialize};

/// Completion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct General {
    /// The model to use
    pub model: String,

    /// The tools the model may call
    pub tools: Option<Vec<FunctionSchema>>,

    /// Controls which tool the model calls; `None` leaves the gateway default
    pub tool_choice: Option<ToolChoice>,

    /// Whether the model may emit several tool calls in one turn
    pub parallel_tool_calls: Option<bool>,
}

impl General {
    /// Create a new configuration
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            tools: None,
            tool_choice: None,
            parallel_tool_calls: None,
        }
    }

    /// Create a new configuration with tools
    pub fn with_tools(mut self, tools: Vec<FunctionSchema>) -> Self {
        self.tools = (!tools.is_empty()).then_some(tools);
        self
    }

    /// Create a new configuration with tool choice
    pub fn with_tool_choice(mut self, tool_choice: Option<ToolChoice>) -> Self {
        self.tool_choice = tool_choice;
        self
    }

    /// Create a new configuration with parallel tool calls set
    pub fn with_parallel_tool_calls(mut self, parallel: Option<bool>) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }
}

impl Default for General {
    fn default() -> Self {
        Self::new("gpt-4.1")
    }
}
