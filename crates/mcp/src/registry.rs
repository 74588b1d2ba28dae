//! Tool registry and call routing.
//!
//! The [`ToolRegistry`] owns the mapping from tool name to owning
//! backend and normalized schema. It is the only resource shared
//! between concurrently running queries; locks guard map access only,
//! never a backend call in flight.

use crate::{
    backend::Backend,
    schema::{SchemaError, normalize},
};
use compact_str::CompactString;
use llm::FunctionSchema;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;

/// A registration failure. Raised at startup, never during a query.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A backend declared a malformed tool schema.
    #[error("invalid schema for tool '{tool}': {source}")]
    Schema {
        /// The offending tool.
        tool: CompactString,
        /// What was malformed.
        source: SchemaError,
    },

    /// The backend could not be reached or refused to list its tools.
    #[error("failed to register backend: {0}")]
    Backend(#[from] anyhow::Error),
}

/// A dispatch failure, folded into conversational content by callers.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered backend owns the tool name.
    #[error("tool '{0}' is not registered")]
    NotFound(CompactString),

    /// The owning backend raised while executing the call.
    #[error("tool '{name}' failed: {reason}")]
    Failed {
        /// The tool that failed.
        name: CompactString,
        /// The backend's error description.
        reason: String,
    },
}

/// A registered tool: its owning backend and its normalized schema.
struct RegisteredTool {
    backend: CompactString,
    schema: FunctionSchema,
}

/// The shared tool registry and router.
#[derive(Default)]
pub struct ToolRegistry {
    backends: Mutex<BTreeMap<CompactString, Arc<dyn Backend>>>,
    tools: Mutex<BTreeMap<CompactString, RegisteredTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under a logical name.
    ///
    /// Fetches the backend's tool list and normalizes every declared
    /// schema; a malformed schema fails the whole registration. A tool
    /// name already owned by an earlier backend is replaced by the
    /// later registration.
    ///
    /// Returns the names of the tools the backend contributed.
    pub async fn register(
        &self,
        name: impl Into<CompactString>,
        backend: Arc<dyn Backend>,
    ) -> Result<Vec<CompactString>, RegistryError> {
        let name = name.into();
        let descriptors = backend.list_tools().await?;

        let mut registered = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let schema = normalize(descriptor).map_err(|source| RegistryError::Schema {
                tool: descriptor.name.clone(),
                source,
            })?;
            registered.push((descriptor.name.clone(), schema));
        }

        {
            let mut tools = self.tools.lock().await;
            for (tool, schema) in registered.iter().cloned() {
                let entry = RegisteredTool {
                    backend: name.clone(),
                    schema,
                };
                if let Some(previous) = tools.insert(tool.clone(), entry) {
                    tracing::warn!(
                        tool = %tool,
                        previous = %previous.backend,
                        replacement = %name,
                        "tool name collision, later registration wins"
                    );
                }
            }
        }
        self.backends.lock().await.insert(name, backend);

        Ok(registered.into_iter().map(|(tool, _)| tool).collect())
    }

    /// The full current schema list, for every registered backend.
    pub async fn schemas(&self) -> Vec<FunctionSchema> {
        self.tools
            .lock()
            .await
            .values()
            .map(|tool| tool.schema.clone())
            .collect()
    }

    /// The logical backend name owning a tool, if any.
    pub async fn owner_of(&self, tool: &str) -> Option<CompactString> {
        self.tools
            .lock()
            .await
            .get(tool)
            .map(|entry| entry.backend.clone())
    }

    /// Route a tool call to its owning backend.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<String, DispatchError> {
        let backend = {
            let tools = self.tools.lock().await;
            let Some(entry) = tools.get(name) else {
                return Err(DispatchError::NotFound(name.into()));
            };
            let backends = self.backends.lock().await;
            backends
                .get(&entry.backend)
                .cloned()
                .ok_or_else(|| DispatchError::NotFound(name.into()))?
        };

        backend
            .call_tool(name, arguments)
            .await
            .map_err(|e| DispatchError::Failed {
                name: name.into(),
                reason: e.to_string(),
            })
    }

    /// Close every backend, releasing the underlying sessions.
    pub async fn close(&self) -> anyhow::Result<()> {
        // Lock order matches dispatch: tools before backends.
        self.tools.lock().await.clear();
        let backends = std::mem::take(&mut *self.backends.lock().await);
        for (name, backend) in backends {
            if let Err(e) = backend.close().await {
                tracing::warn!(backend = %name, "failed to close backend: {e}");
            }
        }
        Ok(())
    }
}
