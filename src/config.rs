//! Command-line and environment configuration

use crate::agents::{GraphqlSettings, DEFAULT_GRAPHQL_ENDPOINT};
use crate::llm::{LlmConfig, DEFAULT_GRAPHQL_MODEL, DEFAULT_ROUTER_MODEL};
use crate::react::DEFAULT_MAX_ITERATIONS;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_MCP_URL: &str = "http://127.0.0.1:8000/mcp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Multi-agent chat concierge: weather and on-chain identity questions
#[derive(Debug, Clone, Parser)]
#[command(name = "concierge", version)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Alternate API base URL
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Model used by the classifier, the weather agent and the fallback answer
    #[arg(long, env = "ROUTER_MODEL", default_value = DEFAULT_ROUTER_MODEL)]
    pub router_model: String,

    /// Model driving the GraphQL agent
    #[arg(long, env = "GRAPHQL_MODEL", default_value = DEFAULT_GRAPHQL_MODEL)]
    pub graphql_model: String,

    /// MCP tool server (streamable HTTP)
    #[arg(long, env = "MCP_URL", default_value = DEFAULT_MCP_URL)]
    pub mcp_url: String,

    /// GraphQL endpoint the agent's queries target
    #[arg(long, env = "GRAPHQL_ENDPOINT", default_value = DEFAULT_GRAPHQL_ENDPOINT)]
    pub graphql_endpoint: String,

    /// Saved introspection result to summarize in the GraphQL instruction
    #[arg(long, env = "GRAPHQL_SCHEMA_PATH")]
    pub schema_path: Option<PathBuf>,

    /// Cap on LLM calls per GraphQL answer
    #[arg(long, env = "REACT_MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Answer one query and exit instead of starting the chat loop
    #[arg(long)]
    pub query: Option<String>,

    /// With --query, ask the GraphQL agent directly and print the full state
    #[arg(long, requires = "query")]
    pub direct_graphql: bool,
}

impl AppConfig {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: self.base_url.clone().filter(|u| !u.trim().is_empty()),
            router_model: self.router_model.clone(),
            graphql_model: self.graphql_model.clone(),
        }
    }

    pub fn graphql_settings(&self) -> GraphqlSettings {
        GraphqlSettings {
            endpoint_url: self.graphql_endpoint.clone(),
            schema_path: self.schema_path.clone(),
            max_iterations: self.max_iterations,
        }
    }
}
