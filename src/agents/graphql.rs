//! GraphQL agent: a reasoning loop bound to the tools of a remote MCP server
//!
//! Setup (tool listing, schema summary, instruction) happens once, on first
//! use, and is shared by every later turn. A failed setup is not cached, so
//! the next turn tries again.

use super::{record_failure, Agent, AgentError, AgentId};
use crate::llm::LlmService;
use crate::mcp::ToolProvider;
use crate::react::{ReactAgent, DEFAULT_MAX_ITERATIONS};
use crate::schema::SchemaSummary;
use crate::session::{SessionState, Selection};
use crate::system_prompt::graphql_instruction;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://graph.web3.bio/graphql";

#[derive(Debug, Clone)]
pub struct GraphqlSettings {
    pub endpoint_url: String,
    /// Saved introspection result; no schema overview when unset
    pub schema_path: Option<PathBuf>,
    pub max_iterations: u32,
}

impl Default for GraphqlSettings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            schema_path: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

pub struct GraphqlAgent {
    llm: Arc<dyn LlmService>,
    tools: Arc<dyn ToolProvider>,
    settings: GraphqlSettings,
    setup: OnceCell<Arc<ReactAgent>>,
}

impl GraphqlAgent {
    pub fn new(
        llm: Arc<dyn LlmService>,
        tools: Arc<dyn ToolProvider>,
        settings: GraphqlSettings,
    ) -> Self {
        Self {
            llm,
            tools,
            settings,
            setup: OnceCell::new(),
        }
    }

    /// Run the one-time setup if it has not succeeded yet.
    ///
    /// Concurrent callers wait on the same initialization.
    pub async fn ensure_ready(&self) -> Result<Arc<ReactAgent>, AgentError> {
        self.setup
            .get_or_try_init(|| async {
                let definitions = self.tools.list_tools().await?;
                let summary = match &self.settings.schema_path {
                    Some(path) => Some(SchemaSummary::load(path)?.render()),
                    None => None,
                };
                let instruction = graphql_instruction(
                    &definitions,
                    &self.settings.endpoint_url,
                    summary.as_deref(),
                );

                tracing::info!(
                    tools = definitions.len(),
                    schema_summary = summary.is_some(),
                    "GraphQL agent ready"
                );
                Ok::<_, AgentError>(Arc::new(ReactAgent::new(
                    self.llm.clone(),
                    self.tools.clone(),
                    definitions,
                    instruction,
                    self.settings.max_iterations,
                )))
            })
            .await
            .cloned()
    }

    /// Answer a query without going through the router
    pub async fn run_query(&self, query: &str) -> SessionState {
        let mut state = SessionState::new(query);
        state.selected_handler = Selection::Agent(AgentId::Graphql);
        self.execute(state).await
    }

    fn fail(mut state: SessionState, error: &AgentError) -> SessionState {
        state.graphql.query_error = Some(error.to_string());
        record_failure(state, AgentId::Graphql, error)
    }
}

#[async_trait]
impl Agent for GraphqlAgent {
    fn id(&self) -> AgentId {
        AgentId::Graphql
    }

    async fn execute(&self, mut state: SessionState) -> SessionState {
        if state.graphql.endpoint_url.is_none() {
            state.graphql.endpoint_url = Some(self.settings.endpoint_url.clone());
        }

        let agent = match self.ensure_ready().await {
            Ok(agent) => agent,
            Err(e) => return Self::fail(state, &e),
        };

        let outcome = match agent.run(state.user_query()).await {
            Ok(outcome) => outcome,
            Err(e) => return Self::fail(state, &e),
        };

        state.response = outcome.final_answer();
        if state.response.is_none() {
            tracing::warn!(
                iterations = outcome.iterations,
                finished = outcome.finished,
                "GraphQL agent ended without a final answer"
            );
        }
        state.graphql.graphql_query = outcome.last_query;
        state.graphql.query_result = outcome.last_result;
        state.graphql.query_error = outcome.last_tool_error;
        state.selected_handler = Selection::Agent(AgentId::Graphql);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ERROR_PREFIX;
    use crate::llm::{ContentBlock, LlmResponse, Usage};
    use crate::mcp::ToolOutput;
    use crate::runtime::testing::{MockLlmClient, MockToolProvider};
    use serde_json::json;
    use std::io::Write;

    fn build(llm: Arc<MockLlmClient>, tools: Arc<MockToolProvider>) -> GraphqlAgent {
        GraphqlAgent::new(llm, tools, GraphqlSettings::default())
    }

    fn tools() -> Arc<MockToolProvider> {
        Arc::new(
            MockToolProvider::new()
                .with_tool("execute_query", ToolOutput::success(r#"{"profile": {"address": "0xd8dA"}}"#)),
        )
    }

    #[tokio::test]
    async fn test_setup_is_memoized() {
        let tools = tools();
        let agent = build(Arc::new(MockLlmClient::new("mock")), tools.clone());

        let first = agent.ensure_ready().await.unwrap();
        let second = agent.ensure_ready().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(tools.list_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_initializes_once() {
        let tools = tools();
        let agent = build(Arc::new(MockLlmClient::new("mock")), tools.clone());

        let (a, b, c) = tokio::join!(agent.ensure_ready(), agent.ensure_ready(), agent.ensure_ready());

        let a = a.unwrap();
        assert!(Arc::ptr_eq(&a, &b.unwrap()));
        assert!(Arc::ptr_eq(&a, &c.unwrap()));
        assert_eq!(tools.list_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_setup_is_retried_next_turn() {
        let tools = tools();
        tools.fail_listing(Some("Connection refused (os error 111)"));
        let agent = build(Arc::new(MockLlmClient::new("mock")), tools.clone());

        assert!(agent.ensure_ready().await.is_err());
        tools.fail_listing(None);
        assert!(agent.ensure_ready().await.is_ok());
        assert_eq!(tools.list_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_tool_server_is_contained() {
        let tools = tools();
        tools.fail_listing(Some("Connection refused (os error 111)"));
        let llm = Arc::new(MockLlmClient::new("mock"));
        let agent = build(llm.clone(), tools);

        let state = agent.execute(SessionState::new("Who owns vitalik.eth?")).await;

        let response = state.response.as_deref().unwrap();
        assert!(response.starts_with(ERROR_PREFIX));
        assert!(response.contains("Connection refused (os error 111)"));
        assert!(state.last_error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(state.graphql.query_error.is_some());
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_and_private_fields() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_response(LlmResponse {
            content: vec![ContentBlock::tool_use(
                "call_1",
                "execute_query",
                json!({"query": "{ profile(id: \"vitalik.eth\") { address } }"}),
            )],
            end_turn: false,
            usage: Usage::default(),
        });
        llm.queue_text("vitalik.eth resolves to 0xd8dA.");

        let agent = build(llm.clone(), tools());
        let state = agent.execute(SessionState::new("Who owns vitalik.eth?")).await;

        assert_eq!(state.response.as_deref(), Some("vitalik.eth resolves to 0xd8dA."));
        assert_eq!(state.selected_handler, Selection::Agent(AgentId::Graphql));
        assert_eq!(
            state.graphql.endpoint_url.as_deref(),
            Some(DEFAULT_GRAPHQL_ENDPOINT)
        );
        assert_eq!(
            state.graphql.graphql_query.as_deref(),
            Some("{ profile(id: \"vitalik.eth\") { address } }")
        );
        assert_eq!(
            state.graphql.query_result,
            Some(json!({"profile": {"address": "0xd8dA"}}))
        );
        assert!(state.last_error.is_none());

        let system = llm.recorded_requests()[0].system_text();
        assert!(system.contains("Tool names: execute_query"));
        assert!(system.contains(DEFAULT_GRAPHQL_ENDPOINT));
    }

    #[tokio::test]
    async fn test_iteration_cap_leaves_response_absent() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        for i in 0..2 {
            llm.queue_response(LlmResponse {
                content: vec![
                    ContentBlock::text("Let me look that up."),
                    ContentBlock::tool_use(format!("call_{i}"), "execute_query", json!({"query": "{ a }"})),
                ],
                end_turn: false,
                usage: Usage::default(),
            });
        }
        let settings = GraphqlSettings {
            max_iterations: 2,
            ..GraphqlSettings::default()
        };
        let agent = GraphqlAgent::new(llm, tools(), settings);

        let state = agent.execute(SessionState::new("q")).await;
        assert!(state.response.is_none());
        assert!(state.last_error.is_none());
        assert_eq!(state.graphql.graphql_query.as_deref(), Some("{ a }"));
    }

    #[tokio::test]
    async fn test_llm_failure_during_run_is_contained() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_error(crate::llm::LlmError::rate_limit("Too many requests"));
        let agent = build(llm, tools());

        let state = agent.execute(SessionState::new("q")).await;
        assert!(state.response_text().contains("Too many requests"));
        assert_eq!(state.last_error.as_deref(), Some("Too many requests"));
    }

    #[tokio::test]
    async fn test_schema_summary_is_embedded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"data": {"__schema": {"types": [
                {"name": "Profile", "kind": "OBJECT"},
                {"name": "__Type", "kind": "OBJECT"},
                {"name": "Platform", "kind": "ENUM"}
            ]}}}"#,
        )
        .unwrap();

        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("done");
        let settings = GraphqlSettings {
            schema_path: Some(file.path().to_path_buf()),
            ..GraphqlSettings::default()
        };
        let agent = GraphqlAgent::new(llm.clone(), tools(), settings);
        agent.execute(SessionState::new("q")).await;

        let system = llm.recorded_requests()[0].system_text();
        assert!(system.contains("Object types: Profile"));
        assert!(system.contains("Enum types: Platform"));
        assert!(!system.contains("__Type"));
    }

    #[tokio::test]
    async fn test_missing_schema_file_fails_into_state() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GraphqlSettings {
            schema_path: Some(dir.path().join("missing.json")),
            ..GraphqlSettings::default()
        };
        let agent = GraphqlAgent::new(Arc::new(MockLlmClient::new("mock")), tools(), settings);

        let state = agent.execute(SessionState::new("q")).await;
        assert!(state.response_text().starts_with(ERROR_PREFIX));
        assert!(state.last_error.unwrap().contains("missing.json"));
    }

    #[tokio::test]
    async fn test_run_query_bypasses_router() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("answer");
        let agent = build(llm, tools());

        let state = agent.run_query("q").await;
        assert_eq!(state.user_query(), "q");
        assert_eq!(state.response.as_deref(), Some("answer"));
        assert_eq!(state.selected_handler, Selection::Agent(AgentId::Graphql));
    }
}
