//! Gateway abstraction for the unified LLM interface.

use crate::{General, Item, Response, StreamEvent};
use anyhow::Result;
use futures_core::Stream;

/// A trait for LLM gateways.
///
/// A gateway turns a conversation item list plus a [`General`]
/// configuration into either one atomic [`Response`] or an incremental
/// [`StreamEvent`] sequence.
pub trait Gateway: Send + Sync {
    /// Request a completion for the given input items.
    fn complete(
        &self,
        config: &General,
        input: &[Item],
    ) -> impl Future<Output = Result<Response>> + Send;

    /// Request a streamed completion for the given input items.
    ///
    /// Contract: the `response.output_item.added` event for a slot is
    /// emitted before any delta referencing that slot, and a
    /// `response.completed` event carrying the assembled response ends
    /// every successful stream.
    fn complete_stream(
        &self,
        config: General,
        input: &[Item],
    ) -> impl Stream<Item = Result<StreamEvent>> + Send;
}
