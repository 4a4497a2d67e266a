//! Test doubles for the routing runtime and its collaborators

use crate::agents::{Agent, AgentId};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, ToolDefinition};
use crate::mcp::{McpError, ToolOutput, ToolProvider};
use crate::session::SessionState;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses in order
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a plain text reply
    pub fn queue_text(&self, text: impl Into<String>) {
        self.queue_response(LlmResponse::from_text(text));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Provider
// ============================================================================

/// Mock tool server with predefined outputs
pub struct MockToolProvider {
    outputs: HashMap<String, ToolOutput>,
    definitions: Vec<ToolDefinition>,
    list_failure: Mutex<Option<String>>,
    call_failure: Option<String>,
    list_calls: AtomicUsize,
    /// Record of tool invocations
    pub calls: Mutex<Vec<(String, Value)>>,
}

#[allow(dead_code)]
impl MockToolProvider {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            definitions: Vec::new(),
            list_failure: Mutex::new(None),
            call_failure: None,
            list_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool with a predefined output
    pub fn with_tool(mut self, name: impl Into<String>, output: ToolOutput) -> Self {
        let name = name.into();
        self.definitions.push(ToolDefinition {
            name: name.clone(),
            description: format!("Mock {name} tool"),
            input_schema: json!({
                "type": "object",
                "properties": { "query": { "type": "string" } }
            }),
        });
        self.outputs.insert(name, output);
        self
    }

    /// Every `call_tool` fails with a connection error
    pub fn failing_calls(mut self, message: impl Into<String>) -> Self {
        self.call_failure = Some(message.into());
        self
    }

    /// Make `list_tools` fail with a connection error, or succeed again with `None`
    pub fn fail_listing(&self, message: Option<&str>) {
        *self.list_failure.lock().unwrap() = message.map(str::to_string);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ToolProvider for MockToolProvider {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, McpError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave
        tokio::task::yield_now().await;
        if let Some(message) = self.list_failure.lock().unwrap().clone() {
            return Err(McpError::Connect(message));
        }
        Ok(self.definitions.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, McpError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        if let Some(message) = &self.call_failure {
            return Err(McpError::Connect(message.clone()));
        }
        Ok(self
            .outputs
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolOutput::error(format!("Unknown tool: {name}"))))
    }
}

// ============================================================================
// Recording Agent
// ============================================================================

/// Agent that writes a fixed response and counts its executions
pub struct RecordingAgent {
    id: AgentId,
    response: Option<String>,
    failure: Option<String>,
    executions: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingAgent {
    pub fn new(id: AgentId, response: Option<&str>) -> Self {
        Self {
            id,
            response: response.map(str::to_string),
            failure: None,
            executions: AtomicUsize::new(0),
        }
    }

    /// Agent that reports a failure through the normal error path
    pub fn failing(id: AgentId, cause: &str) -> Self {
        Self {
            failure: Some(cause.to_string()),
            ..Self::new(id, None)
        }
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    async fn execute(&self, mut state: SessionState) -> SessionState {
        self.executions.fetch_add(1, Ordering::SeqCst);
        if let Some(cause) = &self.failure {
            let error = crate::agents::AgentError::Llm(LlmError::network(cause.clone()));
            return crate::agents::record_failure(state, self.id, &error);
        }
        state.response = self.response.clone();
        state
    }
}
