//! Shared MCP session plumbing for the transport-specific backends.

use crate::backend::ToolDescriptor;
use anyhow::{Context, Result, bail};
use rmcp::{
    model::{CallToolRequestParams, RawContent},
    service::{RoleClient, RunningService},
};
use serde_json::Value;
use tokio::sync::Mutex;

/// A connected MCP peer, shared by every transport variant.
///
/// The peer is taken out on close; calls after close fail instead of
/// hanging on a dead session.
pub(crate) struct McpSession {
    peer: Mutex<Option<RunningService<RoleClient, ()>>>,
}

impl McpSession {
    pub(crate) fn new(peer: RunningService<RoleClient, ()>) -> Self {
        Self {
            peer: Mutex::new(Some(peer)),
        }
    }

    pub(crate) async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let guard = self.peer.lock().await;
        let peer = guard.as_ref().context("backend session is closed")?;
        let tools = peer.list_all_tools().await?;
        Ok(tools.iter().map(describe_tool).collect())
    }

    pub(crate) async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let arguments = match arguments {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => bail!("tool arguments must be a JSON object, got: {other}"),
        };

        let mut params = CallToolRequestParams::new(name.to_string());
        params.arguments = arguments;

        let guard = self.peer.lock().await;
        let peer = guard.as_ref().context("backend session is closed")?;
        let result = peer.call_tool(params).await?;
        let text = extract_text(&result.content);
        if result.is_error == Some(true) {
            bail!("{text}");
        }
        Ok(text)
    }

    pub(crate) async fn close(&self) -> Result<()> {
        if let Some(peer) = self.peer.lock().await.take() {
            peer.cancel().await?;
        }
        Ok(())
    }
}

/// Convert an rmcp tool declaration to a [`ToolDescriptor`].
fn describe_tool(tool: &rmcp::model::Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.as_ref().into(),
        description: tool
            .description
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        input_schema: tool.input_schema.as_ref().clone(),
    }
}

/// Extract text content from MCP content items.
fn extract_text(content: &[rmcp::model::Content]) -> String {
    content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
