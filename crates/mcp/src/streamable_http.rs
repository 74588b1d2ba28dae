//! Backend over a streamable-HTTP MCP endpoint.

use crate::{
    backend::{Backend, ToolDescriptor},
    session::McpSession,
};
use anyhow::Result;
use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    service::{RoleClient, RunningService},
    transport::StreamableHttpClientTransport,
};
use serde_json::Value;

/// A tool backend reached over a streamable-HTTP network session.
pub struct StreamableHttpBackend {
    session: McpSession,
}

impl StreamableHttpBackend {
    /// Open a session against the endpoint and complete the handshake.
    pub async fn connect(url: &str) -> Result<Self> {
        let transport = StreamableHttpClientTransport::from_uri(url.to_owned());
        let peer: RunningService<RoleClient, ()> = ().serve(transport).await?;
        Ok(Self {
            session: McpSession::new(peer),
        })
    }
}

#[async_trait]
impl Backend for StreamableHttpBackend {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        self.session.list_tools().await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        self.session.call_tool(name, arguments).await
    }

    async fn close(&self) -> Result<()> {
        self.session.close().await
    }
}
