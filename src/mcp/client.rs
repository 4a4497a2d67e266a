//! MCP client over the streamable HTTP transport
//!
//! The connection is opened on first use and shared by every caller. A call
//! that fails below the JSON-RPC layer (for example a server restart that
//! invalidated the session) drops the connection, reconnects and retries once.

use super::{McpError, ToolOutput, ToolProvider};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content, RawContent, Tool};
use rmcp::service::{Peer, RoleClient, RunningService, ServiceError};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::ServiceExt;
use serde_json::Value;
use std::borrow::Cow;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const NON_TEXT_CONTENT: &str = "[non-text content omitted]";

struct Connection {
    generation: u64,
    service: RunningService<RoleClient, ()>,
}

pub struct McpClient {
    url: String,
    server_name: String,
    /// Opened lazily; the lock serializes the handshake
    connection: Mutex<Option<Connection>>,
    generations: AtomicU64,
}

impl McpClient {
    pub fn new(url: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            server_name: server_name.into(),
            connection: Mutex::new(None),
            generations: AtomicU64::new(0),
        }
    }

    /// Current peer, connecting first if needed
    async fn peer(&self) -> Result<(u64, Peer<RoleClient>), McpError> {
        let mut guard = self.connection.lock().await;
        if let Some(connection) = guard.as_ref() {
            return Ok((connection.generation, connection.service.peer().clone()));
        }

        let transport = StreamableHttpClientTransport::from_uri(self.url.as_str());
        let service = tokio::time::timeout(CONNECT_TIMEOUT, ().serve(transport))
            .await
            .map_err(|_| {
                McpError::Connect(format!(
                    "no answer from {} within {CONNECT_TIMEOUT:?}",
                    self.url
                ))
            })?
            .map_err(|e| McpError::Connect(e.to_string()))?;

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            server = %self.server_name,
            url = %self.url,
            generation,
            "MCP session initialized"
        );

        let peer = service.peer().clone();
        *guard = Some(Connection {
            generation,
            service,
        });
        Ok((generation, peer))
    }

    /// Drop the connection unless another caller already replaced it
    async fn disconnect(&self, generation: u64) {
        let stale = self
            .connection
            .lock()
            .await
            .take_if(|c| c.generation == generation);
        if let Some(connection) = stale {
            let _ = connection.service.cancel().await;
        }
    }

    async fn with_peer<T, F, Fut>(&self, operation: &str, run: F) -> Result<T, McpError>
    where
        F: Fn(Peer<RoleClient>) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let (generation, peer) = self.peer().await?;
        match run(peer).await {
            Ok(value) => Ok(value),
            Err(err @ ServiceError::McpError(_)) => Err(into_mcp_error(err)),
            Err(err) => {
                tracing::warn!(
                    server = %self.server_name,
                    operation,
                    error = %err,
                    "MCP session lost, reconnecting"
                );
                self.disconnect(generation).await;
                let (_, peer) = self.peer().await?;
                run(peer).await.map_err(into_mcp_error)
            }
        }
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, McpError> {
        let tools: Vec<ToolDefinition> = self
            .with_peer("tools/list", |peer| async move { peer.list_all_tools().await })
            .await?
            .into_iter()
            .map(tool_definition)
            .collect();

        tracing::info!(
            server = %self.server_name,
            tools = ?tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "Fetched tool catalog"
        );

        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, McpError> {
        let request = CallToolRequestParam {
            name: Cow::Owned(name.to_string()),
            arguments: match arguments {
                Value::Object(map) => Some(map),
                _ => None,
            },
        };

        tracing::debug!(server = %self.server_name, tool = %name, "Calling MCP tool");

        let result = self
            .with_peer("tools/call", |peer| {
                let request = request.clone();
                async move { peer.call_tool(request).await }
            })
            .await?;

        Ok(tool_output(&result))
    }
}

fn into_mcp_error(err: ServiceError) -> McpError {
    match err {
        ServiceError::McpError(data) => McpError::Rpc {
            code: data.code.0,
            message: data.message.into_owned(),
        },
        other => McpError::Transport(other.to_string()),
    }
}

fn tool_definition(tool: Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name.into_owned(),
        description: tool.description.map(Cow::into_owned).unwrap_or_default(),
        input_schema: Value::Object(tool.input_schema.as_ref().clone()),
    }
}

fn tool_output(result: &CallToolResult) -> ToolOutput {
    let text = joined_text(&result.content);
    if result.is_error.unwrap_or(false) {
        ToolOutput::error(text)
    } else {
        ToolOutput::success(text)
    }
}

fn joined_text(content: &[Content]) -> String {
    content
        .iter()
        .map(|c| match &c.raw {
            RawContent::Text(text) => text.text.as_str(),
            _ => NON_TEXT_CONTENT,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
