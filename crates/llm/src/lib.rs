//! Unified LLM gateway interface types and traits.
//!
//! This crate provides the shared types used to talk to a
//! function-calling model: `Item`, `Response`, `StreamEvent`,
//! `FunctionSchema`, `General`, and the `Gateway` trait. Also provides
//! `HttpGateway` for the OpenAI Responses HTTP transport (feature `http`)
//! and a shared `Request` type.

pub use config::General;
pub use gateway::Gateway;
#[cfg(feature = "http")]
pub use http::{HttpGateway, endpoint};
pub use item::{Item, Role};
pub use noop::NoopGateway;
#[cfg(feature = "http")]
pub use request::Request;
#[cfg(feature = "http")]
pub use reqwest::{self, Client};
pub use response::{OutputContent, OutputItem, Response, Usage};
pub use stream::StreamEvent;
pub use tool::{FunctionCall, FunctionSchema, ToolChoice};

mod config;
mod gateway;
#[cfg(feature = "http")]
mod http;
mod item;
mod noop;
#[cfg(feature = "http")]
mod request;
mod response;
mod stream;
mod tool;
