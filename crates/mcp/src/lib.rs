//! Tool backends for the moray engine.
//!
//! A [`Backend`] is an external process or service exposing callable
//! tools through an established MCP session. This crate provides the
//! capability interface, per-transport implementations built on the
//! rmcp SDK ([`StdioBackend`], [`StreamableHttpBackend`]), the schema
//! normalizer that converts backend tool declarations into the strict
//! function schemas the model requires, and the [`ToolRegistry`] that
//! routes tool calls to their owning backend.

pub use backend::{Backend, ToolDescriptor};
pub use config::{BackendLaunch, register_all};
pub use registry::{DispatchError, RegistryError, ToolRegistry};
pub use schema::{SchemaError, normalize};
pub use stdio::StdioBackend;
pub use streamable_http::StreamableHttpBackend;

mod backend;
mod config;
mod registry;
mod schema;
mod session;
mod stdio;
mod streamable_http;
