//! Specialized agents the router can dispatch to
//!
//! Every agent implements [`Agent`]. Agents never fail past their own
//! boundary: errors are folded into the session state via [`record_failure`]
//! so the formatter can always produce a reply.

mod graphql;
mod weather;

pub use graphql::{GraphqlAgent, GraphqlSettings, DEFAULT_GRAPHQL_ENDPOINT};
pub use weather::WeatherAgent;

use crate::llm::LlmError;
use crate::mcp::McpError;
use crate::schema::SchemaError;
use crate::session::SessionState;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Prefix of every user-facing failure message
pub const ERROR_PREFIX: &str = "Error while processing your query";

/// Closed set of agents known to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    Weather,
    Graphql,
}

impl AgentId {
    pub const ALL: [AgentId; 2] = [AgentId::Weather, AgentId::Graphql];

    /// Name used by the classifier and stored in `selected_handler`
    pub fn name(self) -> &'static str {
        match self {
            AgentId::Weather => "weather_agent",
            AgentId::Graphql => "graphql_agent",
        }
    }

    /// One-line routing hint shown to the classifier
    pub fn description(self) -> &'static str {
        match self {
            AgentId::Weather => {
                "handles weather questions, use it when the user asks about the weather somewhere"
            }
            AgentId::Graphql => {
                "answers questions about on-chain identities, ENS names, web3 profiles and other data reachable through the GraphQL endpoint"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failures raised inside an agent before they are folded into the state
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0}")]
    Llm(#[from] LlmError),
    #[error("{0}")]
    ToolServer(#[from] McpError),
    #[error("{0}")]
    Schema(#[from] SchemaError),
}

/// A capability that can fully answer a class of user queries
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> AgentId;

    /// Produce a response (or an error annotation) for the turn.
    ///
    /// Only `response`, `last_error` and agent-private fields may change.
    async fn execute(&self, state: SessionState) -> SessionState;
}

/// Fold an agent failure into the state: readable message plus cause
pub fn record_failure(mut state: SessionState, agent: AgentId, error: &AgentError) -> SessionState {
    let cause = error.to_string();
    tracing::warn!(agent = %agent, error = %cause, "Agent failed, reporting error to user");
    state.response = Some(format!("{ERROR_PREFIX}: {cause}"));
    state.last_error = Some(cause);
    state
}

/// Registration table from agent id to implementation
///
/// Built once at startup, read-only afterwards.
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.id(), agent);
        self
    }

    pub fn get(&self, id: AgentId) -> Option<Arc<dyn Agent>> {
        self.agents.get(&id).cloned()
    }

    /// Registered ids in a stable order
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }
}
