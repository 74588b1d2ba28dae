//! Reconstruction of complete responses from streamed events.
//!
//! A streamed turn arrives as `output_item.added` / delta / `completed`
//! events keyed by a numeric output slot. The accumulator rebuilds the
//! partial items — several tool calls may be under construction at
//! once — and holds the assembled response from the terminal event.
//!
//! Precondition (guaranteed by the gateway, not re-derived here): the
//! `added` event for a slot arrives before any delta for that slot. A
//! delta referencing an unregistered slot is a protocol error that
//! aborts the current turn.

use llm::{FunctionCall, OutputContent, OutputItem, Response, StreamEvent};
use std::collections::BTreeMap;
use thiserror::Error;

/// A violation of the streaming event contract.
#[derive(Debug, Error)]
pub enum StreamProtocolError {
    /// A delta referenced a slot with no preceding `added` event.
    #[error("delta for unregistered output slot {0}")]
    UnknownSlot(u32),

    /// The event sequence ended without a completed response.
    #[error("stream ended without a completed response")]
    MissingCompletion,
}

/// A partial output item under construction at one slot.
#[derive(Debug)]
enum Slot {
    /// A text message being streamed.
    Text(String),
    /// A function call whose arguments are being streamed.
    FunctionCall(FunctionCall),
    /// An item kind the engine does not interpret; still owns its slot.
    Other,
}

/// Rebuilds complete tool-call requests from an event sequence.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    slots: BTreeMap<u32, Slot>,
    response: Option<Response>,
}

impl StreamAccumulator {
    /// Create an empty accumulator for one turn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the accumulated state.
    pub fn accept(&mut self, event: &StreamEvent) -> Result<(), StreamProtocolError> {
        match event {
            StreamEvent::OutputItemAdded { output_index, item } => {
                let slot = match item {
                    OutputItem::Message { content, .. } => {
                        let mut text = String::new();
                        for part in content {
                            if let OutputContent::OutputText { text: t } = part {
                                text.push_str(t);
                            }
                        }
                        Slot::Text(text)
                    }
                    OutputItem::FunctionCall(call) => Slot::FunctionCall(call.clone()),
                    OutputItem::Unknown => Slot::Other,
                };
                self.slots.insert(*output_index, slot);
            }
            StreamEvent::OutputTextDelta {
                output_index,
                delta,
            } => {
                let slot = self
                    .slots
                    .get_mut(output_index)
                    .ok_or(StreamProtocolError::UnknownSlot(*output_index))?;
                if let Slot::Text(text) = slot {
                    text.push_str(delta);
                }
            }
            StreamEvent::FunctionCallArgumentsDelta {
                output_index,
                delta,
            } => {
                let slot = self
                    .slots
                    .get_mut(output_index)
                    .ok_or(StreamProtocolError::UnknownSlot(*output_index))?;
                if let Slot::FunctionCall(call) = slot {
                    call.push_arguments(delta);
                }
            }
            StreamEvent::Completed { response } => {
                self.response = Some(response.clone());
            }
            StreamEvent::Unknown => {}
        }
        Ok(())
    }

    /// The accumulated function calls, in slot order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.slots
            .values()
            .filter_map(|slot| match slot {
                Slot::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// The accumulated argument string at a slot, if it holds a call.
    pub fn arguments(&self, slot: u32) -> Option<&str> {
        match self.slots.get(&slot) {
            Some(Slot::FunctionCall(call)) => Some(&call.arguments),
            _ => None,
        }
    }

    /// The accumulated text at a slot, if it holds a message.
    pub fn text(&self, slot: u32) -> Option<&str> {
        match self.slots.get(&slot) {
            Some(Slot::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Whether the terminal completed event has arrived.
    pub fn is_complete(&self) -> bool {
        self.response.is_some()
    }

    /// Take the assembled response from the terminal event.
    pub fn take_response(&mut self) -> Result<Response, StreamProtocolError> {
        self.response
            .take()
            .ok_or(StreamProtocolError::MissingCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(slot: u32, call_id: &str, name: &str) -> StreamEvent {
        StreamEvent::OutputItemAdded {
            output_index: slot,
            item: OutputItem::FunctionCall(FunctionCall {
                call_id: call_id.into(),
                name: name.into(),
                arguments: String::new(),
            }),
        }
    }

    fn args_delta(slot: u32, delta: &str) -> StreamEvent {
        StreamEvent::FunctionCallArgumentsDelta {
            output_index: slot,
            delta: delta.into(),
        }
    }

    #[test]
    fn accumulates_arguments_across_deltas() {
        let mut acc = StreamAccumulator::new();
        acc.accept(&added(0, "c1", "get_weather")).unwrap();
        acc.accept(&args_delta(0, "{\"a\"")).unwrap();
        acc.accept(&args_delta(0, ":1")).unwrap();
        acc.accept(&args_delta(0, "}")).unwrap();

        assert_eq!(acc.arguments(0), Some("{\"a\":1}"));
        assert!(!acc.is_complete());
        let calls = acc.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].call_id, "c1");
    }

    #[test]
    fn builds_multiple_slots_concurrently() {
        let mut acc = StreamAccumulator::new();
        acc.accept(&added(0, "c1", "get_weather")).unwrap();
        acc.accept(&added(1, "c2", "get_time")).unwrap();
        acc.accept(&args_delta(1, "{\"tz\":")).unwrap();
        acc.accept(&args_delta(0, "{\"city\":")).unwrap();
        acc.accept(&args_delta(1, "\"UTC\"}")).unwrap();
        acc.accept(&args_delta(0, "\"Paris\"}")).unwrap();

        assert_eq!(acc.arguments(0), Some("{\"city\":\"Paris\"}"));
        assert_eq!(acc.arguments(1), Some("{\"tz\":\"UTC\"}"));
        let calls = acc.function_calls();
        assert_eq!(calls[0].call_id, "c1");
        assert_eq!(calls[1].call_id, "c2");
    }

    #[test]
    fn delta_for_unknown_slot_is_protocol_error() {
        let mut acc = StreamAccumulator::new();
        let err = acc.accept(&args_delta(3, "{")).unwrap_err();
        assert!(matches!(err, StreamProtocolError::UnknownSlot(3)));
    }

    #[test]
    fn text_deltas_accumulate_per_slot() {
        let mut acc = StreamAccumulator::new();
        acc.accept(&StreamEvent::OutputItemAdded {
            output_index: 0,
            item: OutputItem::Message {
                role: llm::Role::Assistant,
                content: Vec::new(),
            },
        })
        .unwrap();
        acc.accept(&StreamEvent::OutputTextDelta {
            output_index: 0,
            delta: "Hello".into(),
        })
        .unwrap();
        acc.accept(&StreamEvent::OutputTextDelta {
            output_index: 0,
            delta: ", world".into(),
        })
        .unwrap();
        assert_eq!(acc.text(0), Some("Hello, world"));
    }

    #[test]
    fn completed_event_yields_response() {
        let mut acc = StreamAccumulator::new();
        assert!(matches!(
            acc.take_response(),
            Err(StreamProtocolError::MissingCompletion)
        ));

        acc.accept(&StreamEvent::Completed {
            response: Response::default(),
        })
        .unwrap();
        assert!(acc.is_complete());
        assert!(acc.take_response().is_ok());
    }

    #[test]
    fn unknown_events_are_ignored() {
        let mut acc = StreamAccumulator::new();
        acc.accept(&StreamEvent::Unknown).unwrap();
        assert!(acc.function_calls().is_empty());
    }
}
