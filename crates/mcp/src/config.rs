//! Launch descriptors for configured backends.
//!
//! A [`BackendLaunch`] is the startup-time description of one backend:
//! either a command to spawn (stdio transport) or an endpoint URL
//! (streamable-HTTP transport), plus arguments and environment.
//! Parsing configuration files into these descriptors is the caller's
//! concern; this module only turns a descriptor into a connected
//! [`Backend`].

use crate::{
    backend::Backend,
    registry::{RegistryError, ToolRegistry},
    stdio::StdioBackend,
    streamable_http::StreamableHttpBackend,
};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tokio::process::Command;

/// How to reach one configured backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendLaunch {
    /// Program to spawn for a stdio backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments passed to the spawned program.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Environment variables for the spawned program.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Endpoint URL for a streamable-HTTP backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BackendLaunch {
    /// Describe a stdio backend spawned from the given program.
    pub fn stdio(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Default::default()
        }
    }

    /// Describe a streamable-HTTP backend at the given endpoint.
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Add arguments for the spawned program.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable for the spawned program.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Establish the session this descriptor points at.
    pub async fn connect(&self) -> Result<Arc<dyn Backend>> {
        if let Some(url) = &self.url {
            let backend = StreamableHttpBackend::connect(url).await?;
            return Ok(Arc::new(backend));
        }
        let Some(program) = &self.command else {
            bail!("backend launch needs either a command or a url");
        };
        let mut command = Command::new(program);
        command.args(&self.args).envs(&self.env);
        let backend = StdioBackend::connect(command).await?;
        Ok(Arc::new(backend))
    }
}

/// Connect and register every configured backend, in order.
///
/// Registration order decides ownership when two backends declare the
/// same tool name: the later entry wins.
pub async fn register_all(
    registry: &ToolRegistry,
    launches: impl IntoIterator<Item = (String, BackendLaunch)>,
) -> Result<(), RegistryError> {
    for (name, launch) in launches {
        let backend = launch.connect().await?;
        let tools = registry.register(name.as_str(), backend).await?;
        tracing::debug!(backend = %name, tools = tools.len(), "registered backend");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_launch_from_config_json() {
        let launch: BackendLaunch = serde_json::from_value(serde_json::json!({
            "command": "uvx",
            "args": ["weather-server"],
            "env": { "API_KEY": "k" }
        }))
        .unwrap();
        assert_eq!(launch.command.as_deref(), Some("uvx"));
        assert_eq!(launch.args, vec!["weather-server"]);
        assert_eq!(launch.env.get("API_KEY").map(String::as_str), Some("k"));
        assert!(launch.url.is_none());
    }

    #[test]
    fn http_launch_builder() {
        let launch = BackendLaunch::http("http://localhost:8080/mcp");
        assert_eq!(launch.url.as_deref(), Some("http://localhost:8080/mcp"));
        assert!(launch.command.is_none());
    }

    #[tokio::test]
    async fn empty_launch_refused() {
        let launch = BackendLaunch::default();
        assert!(launch.connect().await.is_err());
    }
}
