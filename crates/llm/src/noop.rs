//! No-op gateway for testing.
//!
//! Implements [`Gateway`] but panics on `complete` and
//! `complete_stream`. Intended for unit tests that exercise registry
//! and schema logic without making real LLM calls.

use crate::{Gateway, General, Item, Response, StreamEvent};
use anyhow::Result;
use futures_core::Stream;

/// A no-op gateway that panics on any actual LLM call.
///
/// # Panics
///
/// Both `complete` and `complete_stream` panic if called. Only use this
/// gateway in tests that never invoke gateway methods.
#[derive(Clone, Copy)]
pub struct NoopGateway;

impl Gateway for NoopGateway {
    async fn complete(&self, _config: &General, _input: &[Item]) -> Result<Response> {
        panic!("NoopGateway::complete called — not intended for real LLM calls");
    }

    fn complete_stream(
        &self,
        _config: General,
        _input: &[Item],
    ) -> impl Stream<Item = Result<StreamEvent>> {
        async_stream::stream! {
            panic!("NoopGateway::complete_stream called — not intended for real LLM calls");
            #[allow(unreachable_code)]
            {
                yield Ok(StreamEvent::Unknown);
            }
        }
    }
}
