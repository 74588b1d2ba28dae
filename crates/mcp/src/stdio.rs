//! Backend over a spawned child process speaking MCP on stdio.

use crate::{
    backend::{Backend, ToolDescriptor},
    session::McpSession,
};
use anyhow::Result;
use async_trait::async_trait;
use rmcp::{ServiceExt, service::{RoleClient, RunningService}, transport::TokioChildProcess};
use serde_json::Value;
use tokio::process::Command;

/// A tool backend reached by spawning a child process.
///
/// The command should be a program that speaks MCP over stdio.
pub struct StdioBackend {
    session: McpSession,
}

impl StdioBackend {
    /// Spawn the command and complete the MCP handshake.
    pub async fn connect(command: Command) -> Result<Self> {
        let transport = TokioChildProcess::new(command)?;
        let peer: RunningService<RoleClient, ()> = ().serve(transport).await?;
        Ok(Self {
            session: McpSession::new(peer),
        })
    }
}

#[async_trait]
impl Backend for StdioBackend {
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
