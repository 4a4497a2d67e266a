//! Per-turn session state threaded through the routing graph
//!
//! One `SessionState` is created per user turn and moved by value from node to
//! node. Each node takes ownership, fills in the fields it produces and hands
//! the state back.

use crate::agents::AgentId;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Which agent the classifier picked for this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// No registered agent matched; the formatter answers directly
    #[default]
    None,
    Agent(AgentId),
}

impl Selection {
    pub const NONE_NAME: &'static str = "none";

    pub fn as_str(&self) -> &'static str {
        match self {
            Selection::None => Self::NONE_NAME,
            Selection::Agent(id) => id.name(),
        }
    }
}

/// Serialized as the agent name, or `"none"`
impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRole {
    User,
    Assistant,
}

/// One entry of the conversation history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Fields only the GraphQL agent reads or writes
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphqlFields {
    pub endpoint_url: Option<String>,
    pub graphql_query: Option<String>,
    pub query_result: Option<Value>,
    pub query_error: Option<String>,
}

/// State of a single turn
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Append-only
    pub conversation_history: Vec<HistoryEntry>,
    pub selected_handler: Selection,
    user_query: String,
    pub response: Option<String>,
    pub last_error: Option<String>,
    pub graphql: GraphqlFields,
}

impl SessionState {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            conversation_history: Vec::new(),
            selected_handler: Selection::None,
            user_query: user_query.into(),
            response: None,
            last_error: None,
            graphql: GraphqlFields::default(),
        }
    }

    /// The query is fixed for the lifetime of the turn
    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    /// True when `response` holds something other than whitespace
    pub fn has_response(&self) -> bool {
        self.response
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }

    pub fn response_text(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }

    pub fn push_history(&mut self, role: HistoryRole, content: impl Into<String>) {
        self.conversation_history.push(HistoryEntry {
            role,
            content: content.into(),
            at: Utc::now(),
        });
    }

    pub fn into_response(self) -> String {
        self.response.unwrap_or_default()
    }
}
