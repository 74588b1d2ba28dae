//! The flow: an append-only audit trail for one query.
//!
//! Every gateway call, tool call, and error of a query is recorded as
//! an [`Interaction`]; the ordered sequence is embedded in the
//! [`QueryResult`] returned to the caller. Entries are never mutated
//! after insertion.

use compact_str::CompactString;
use serde::Serialize;
use serde_json::Value;

/// One gateway round trip: what was sent and what came back.
#[derive(Debug, Clone, Serialize)]
pub struct LlmCallRecord {
    /// The model the request targeted.
    pub model: String,
    /// The request: input items, tools, tool choice, parallelism.
    pub request: Value,
    /// The response output items.
    pub response: Value,
}

/// One tool invocation: arguments in, result (or error payload) out.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    /// The tool that was called.
    pub name: CompactString,
    /// The decoded arguments.
    pub arguments: Value,
    /// The tool output, or a structured error payload.
    pub result: Value,
}

/// Where an error originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    /// The LLM gateway failed or broke the stream protocol.
    Gateway,
    /// A tool call failed.
    Tool,
    /// The engine itself stopped the query (e.g. the turn cap).
    Engine,
}

/// A recorded failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// What went wrong.
    pub error: String,
    /// Where it went wrong.
    pub source: ErrorSource,
    /// The tool involved, when the source is a tool call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<CompactString>,
    /// The arguments of the failed tool call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl ErrorRecord {
    /// A gateway-class failure.
    pub fn gateway(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            source: ErrorSource::Gateway,
            tool: None,
            arguments: None,
        }
    }

    /// A tool-call failure.
    pub fn tool(error: impl Into<String>, tool: impl Into<CompactString>, arguments: Value) -> Self {
        Self {
            error: error.into(),
            source: ErrorSource::Tool,
            tool: Some(tool.into()),
            arguments: Some(arguments),
        }
    }

    /// An engine-level failure.
    pub fn engine(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            source: ErrorSource::Engine,
            tool: None,
            arguments: None,
        }
    }
}

/// One entry of the flow.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum Interaction {
    /// A gateway round trip.
    LlmCall(LlmCallRecord),
    /// A tool invocation.
    ToolCall(ToolCallRecord),
    /// A failure of either class.
    Error(ErrorRecord),
}

impl Interaction {
    /// Whether this entry records a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Append-only recorder backing the flow.
#[derive(Debug, Default)]
pub struct FlowRecorder {
    entries: Vec<Interaction>,
}

impl FlowRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gateway round trip.
    pub fn llm_call(&mut self, record: LlmCallRecord) {
        self.entries.push(Interaction::LlmCall(record));
    }

    /// Record a tool invocation.
    pub fn tool_call(&mut self, record: ToolCallRecord) {
        self.entries.push(Interaction::ToolCall(record));
    }

    /// Record a failure.
    pub fn error(&mut self, record: ErrorRecord) {
        self.entries.push(Interaction::Error(record));
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Surrender the recorded flow, in emission order.
    pub fn finish(self) -> Vec<Interaction> {
        self.entries
    }
}

/// The outcome of one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Names of the tools the model used, in call order.
    pub tools_used: Vec<CompactString>,
    /// The ordered audit trail of the query.
    pub flow: Vec<Interaction>,
    /// The final answer text.
    pub final_answer: String,
    /// The top-level error, if the query failed or a tool call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flow_preserves_emission_order() {
        let mut recorder = FlowRecorder::new();
        recorder.llm_call(LlmCallRecord {
            model: "gpt-4.1".into(),
            request: json!({}),
            response: json!([]),
        });
        recorder.tool_call(ToolCallRecord {
            name: "get_weather".into(),
            arguments: json!({"location": "Paris"}),
            result: json!("15C"),
        });
        recorder.error(ErrorRecord::tool("boom", "get_weather", json!({})));

        let flow = recorder.finish();
        assert_eq!(flow.len(), 3);
        assert!(matches!(flow[0], Interaction::LlmCall(_)));
        assert!(matches!(flow[1], Interaction::ToolCall(_)));
        assert!(flow[2].is_error());
    }

    #[test]
    fn interaction_wire_form() {
        let interaction = Interaction::ToolCall(ToolCallRecord {
            name: "ping".into(),
            arguments: json!({}),
            result: json!("pong"),
        });
        let value = serde_json::to_value(&interaction).unwrap();
        assert_eq!(value["type"], "tool_call");
        assert_eq!(value["details"]["name"], "ping");
        assert_eq!(value["details"]["result"], "pong");
    }

    #[test]
    fn error_record_wire_form() {
        let value = serde_json::to_value(Interaction::Error(ErrorRecord::gateway("rate limited")))
            .unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["details"]["error"], "rate limited");
        assert_eq!(value["details"]["source"], "gateway");
        assert!(value["details"].get("tool").is_none());
    }
}
