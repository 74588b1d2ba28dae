//! Conversation items exchanged with the model.

use crate::tool::FunctionCall;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One entry of the conversation history sent to the model.
///
/// The model consumes an ordered item list: plain messages, the
/// function calls it emitted on earlier turns, and the outputs those
/// calls produced. Every function call is answered by exactly one
/// `FunctionCallOutput` carrying the same `call_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    /// A plain text message from one of the conversation roles.
    Message {
        /// The role of the message author.
        role: Role,
        /// The text content.
        content: String,
    },

    /// A function call emitted by the model on a previous turn.
    FunctionCall(FunctionCall),

    /// The result of a function call, paired by `call_id`.
    FunctionCallOutput {
        /// Correlation id of the call this output answers.
        call_id: CompactString,
        /// The tool output, stringified.
        output: String,
    },
}

impl Item {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a function call output paired with the given call id.
    pub fn call_output(call_id: impl Into<CompactString>, output: impl Into<String>) -> Self {
        Self::FunctionCallOutput {
            call_id: call_id.into(),
            output: output.into(),
        }
    }
}

impl From<FunctionCall> for Item {
    fn from(call: FunctionCall) -> Self {
        Self::FunctionCall(call)
    }
}

/// The role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum Role {
    /// The user role
    #[serde(rename = "user")]
    #[default]
    User,
    /// The assistant role
    #[serde(rename = "assistant")]
    Assistant,
    /// The system role
    #[serde(rename = "system")]
    System,
}
