//! Remote tool access over the Model Context Protocol
//!
//! The GraphQL agent gets its tools from an MCP server reached over the
//! streamable HTTP transport. [`ToolProvider`] is the seam the agent depends
//! on; [`McpClient`] is the production implementation.

mod client;

pub use client::McpClient;

use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result from a remote tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to reach tool server: {0}")]
    Connect(String),
    #[error("tool server connection failed: {0}")]
    Transport(String),
    #[error("tool server error {code}: {message}")]
    Rpc { code: i32, message: String },
}

/// Source of callable tools for the reasoning agent
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Fetch the full tool catalog
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, McpError>;

    /// Invoke one tool. Tool-level failures come back as `ToolOutput::error`;
    /// `Err` is reserved for transport and protocol failures.
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutput, McpError>;
}
