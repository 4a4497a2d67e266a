//! Reasoning-and-acting loop over remote tools
//!
//! The model is called with the tool catalog; every tool call it makes is
//! forwarded to the [`ToolProvider`] and the results are fed back, until the
//! model answers without tools or the iteration cap is hit.

use crate::agents::AgentError;
use crate::llm::{
    ContentBlock, LlmMessage, LlmRequest, LlmService, MessageRole, SystemContent, ToolDefinition,
};
use crate::mcp::{ToolOutput, ToolProvider};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_MAX_ITERATIONS: u32 = 15;

/// What the loop produced
#[derive(Debug, Clone, Default)]
pub struct ReactOutcome {
    /// Full exchange, starting with the user query
    pub transcript: Vec<LlmMessage>,
    pub iterations: u32,
    /// The model ended with a reply that called no tools
    pub finished: bool,
    /// `query` argument of the most recent tool call that had one
    pub last_query: Option<String>,
    /// Most recent successful tool output that parsed as JSON
    pub last_result: Option<Value>,
    /// Most recent tool-level failure
    pub last_tool_error: Option<String>,
}

impl ReactOutcome {
    /// Text of the closing tool-free reply. `None` when the loop was cut
    /// off by the iteration cap, since any text then is intermediate.
    pub fn final_answer(&self) -> Option<String> {
        if !self.finished {
            return None;
        }
        self.transcript
            .last()
            .filter(|m| m.role == MessageRole::Assistant)
            .map(LlmMessage::text)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Tool-using agent bound to one tool catalog
pub struct ReactAgent {
    llm: Arc<dyn LlmService>,
    tools: Arc<dyn ToolProvider>,
    definitions: Vec<ToolDefinition>,
    instruction: String,
    max_iterations: u32,
}

impl ReactAgent {
    pub fn new(
        llm: Arc<dyn LlmService>,
        tools: Arc<dyn ToolProvider>,
        definitions: Vec<ToolDefinition>,
        instruction: String,
        max_iterations: u32,
    ) -> Self {
        Self {
            llm,
            tools,
            definitions,
            instruction,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    pub async fn run(&self, query: &str) -> Result<ReactOutcome, AgentError> {
        let mut outcome = ReactOutcome {
            transcript: vec![LlmMessage::user(query)],
            ..ReactOutcome::default()
        };

        while outcome.iterations < self.max_iterations {
            outcome.iterations += 1;

            let request = LlmRequest {
                system: vec![SystemContent::new(self.instruction.clone())],
                messages: outcome.transcript.clone(),
                tools: self.definitions.clone(),
                ..LlmRequest::default()
            };
            let response = self.llm.complete(&request).await?;

            let calls: Vec<(String, String, Value)> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();
            outcome
                .transcript
                .push(LlmMessage::assistant(response.content));

            if calls.is_empty() {
                outcome.finished = true;
                tracing::debug!(iterations = outcome.iterations, "Reasoning agent finished");
                return Ok(outcome);
            }

            let mut results = Vec::with_capacity(calls.len());
            for (id, name, input) in calls {
                let output = self.invoke(&name, input, &mut outcome).await?;
                results.push(ContentBlock::tool_result(id, output.output, !output.success));
            }
            outcome.transcript.push(LlmMessage {
                role: MessageRole::User,
                content: results,
            });
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "Reasoning agent hit the iteration cap without a final answer"
        );
        Ok(outcome)
    }

    async fn invoke(
        &self,
        name: &str,
        input: Value,
        outcome: &mut ReactOutcome,
    ) -> Result<ToolOutput, AgentError> {
        if !self.definitions.iter().any(|d| d.name == name) {
            tracing::warn!(tool = name, "Model requested an unknown tool");
            return Ok(ToolOutput::error(format!(
                "Unknown tool '{name}'. Available tools: {}",
                self.tool_names().join(", ")
            )));
        }

        if !input.is_object() {
            tracing::warn!(tool = name, "Model sent malformed tool arguments");
            return Ok(ToolOutput::error(format!(
                "Invalid arguments for tool '{name}': expected a JSON object, got {input}"
            )));
        }

        if let Some(query) = input.get("query").and_then(Value::as_str) {
            outcome.last_query = Some(query.to_string());
        }

        tracing::debug!(tool = name, input = %input, "Calling remote tool");
        let output = self.tools.call_tool(name, input).await?;

        if output.success {
            if let Ok(value) = serde_json::from_str::<Value>(&output.output) {
                outcome.last_result = Some(value);
            }
        } else {
            outcome.last_tool_error = Some(output.output.clone());
        }
        Ok(output)
    }
}
