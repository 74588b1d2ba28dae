//! Streaming event algebra for the unified gateway interface.
//!
//! A streamed completion arrives as an event sequence instead of one
//! atomic response:
//! - `response.output_item.added` — a new partial item at a numeric slot
//! - `response.output_text.delta` — text characters for a slot
//! - `response.function_call_arguments.delta` — argument characters for a slot
//! - `response.completed` — the fully assembled response
//!
//! Gateways guarantee that the `added` event for a slot precedes every
//! delta for that slot; consumers treat a violation as a protocol error.

use crate::response::{OutputItem, Response};
use serde::{Deserialize, Serialize};

/// A raw event from a streamed completion.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A new partial output item was registered at a slot.
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded {
        /// The slot index of the new item.
        output_index: u32,
        /// The partial item (function calls carry name and call id,
        /// arguments still empty).
        item: OutputItem,
    },

    /// Text characters for the item at a slot.
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        /// The slot the fragment belongs to.
        output_index: u32,
        /// The text fragment.
        delta: String,
    },

    /// Argument characters for the function call at a slot.
    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta {
        /// The slot the fragment belongs to.
        output_index: u32,
        /// The argument fragment.
        delta: String,
    },

    /// The terminal event carrying the fully assembled response.
    #[serde(rename = "response.completed")]
    Completed {
        /// The complete response, for history bookkeeping.
        response: Response,
    },

    /// Any event kind this crate does not interpret.
    #[serde(other)]
    Unknown,
}
