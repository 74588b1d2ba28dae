//! The backend capability interface.

use anyhow::Result;
use async_trait::async_trait;
use compact_str::CompactString;
use serde_json::Value;

/// A tool declaration as a backend publishes it.
///
/// The `input_schema` is the backend's own parameter tree; it is
/// normalized into a strict function schema at registration time.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Tool name, unique within one backend.
    pub name: CompactString,
    /// Human-readable description shown to the model.
    pub description: String,
    /// The declared input schema (a JSON object tree).
    pub input_schema: serde_json::Map<String, Value>,
}

/// An external tool provider reached over an established session.
///
/// Heterogeneous transports (spawned child process, streamed network
/// session) all conform to this capability set; callers never branch on
/// the transport kind.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List the tools this backend exposes, in the backend's order.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke a tool and return its output as text.
    ///
    /// `arguments` is the decoded argument payload; it must be a JSON
    /// object (or null for tools without parameters).
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String>;

    /// Release the underlying session.
    async fn close(&self) -> Result<()>;
}
