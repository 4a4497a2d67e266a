//! Query classification
//!
//! One JSON-mode LLM call maps the user query to an agent name. The outcome
//! is an explicit [`Classification`]; nothing here returns an error, and
//! every unusable reply degrades to "no agent".

use crate::agents::AgentId;
use crate::llm::{LlmRequest, LlmService};
use crate::session::Selection;
use crate::system_prompt::classifier_instruction;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Result of classifying one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The model named an agent. The name is not validated here.
    Agent(String),
    /// The model explicitly answered "none"
    NoMatch,
    /// No usable decision could be extracted
    Ambiguous(AmbiguityReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbiguityReason {
    /// The LLM call itself failed
    ModelUnavailable(String),
    /// The reply was not a JSON object
    MalformedJson(String),
    /// JSON object without a string `agent_name`
    MissingAgentName,
}

impl fmt::Display for AmbiguityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelUnavailable(e) => write!(f, "model unavailable: {e}"),
            Self::MalformedJson(e) => write!(f, "malformed JSON: {e}"),
            Self::MissingAgentName => f.write_str("missing agent_name"),
        }
    }
}

impl Classification {
    /// Name as written into the decision, `"none"` for anything that is not an agent
    pub fn agent_name(&self) -> &str {
        match self {
            Self::Agent(name) => name,
            Self::NoMatch | Self::Ambiguous(_) => Selection::NONE_NAME,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Decision {
    agent_name: Option<String>,
}

pub struct Classifier {
    llm: Arc<dyn LlmService>,
    instruction: String,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmService>, agents: &[AgentId]) -> Self {
        Self {
            llm,
            instruction: classifier_instruction(agents),
        }
    }

    pub async fn classify(&self, query: &str) -> Classification {
        let request = LlmRequest {
            json_object: true,
            ..LlmRequest::with_system(self.instruction.clone(), query)
        };

        let classification = match self.llm.complete(&request).await {
            Ok(response) => parse_decision(&response.text()),
            Err(e) => Classification::Ambiguous(AmbiguityReason::ModelUnavailable(e.to_string())),
        };

        match &classification {
            Classification::Agent(name) => tracing::info!(agent = %name, "Query classified"),
            Classification::NoMatch => tracing::info!("Query matched no agent"),
            Classification::Ambiguous(AmbiguityReason::ModelUnavailable(e)) => {
                tracing::warn!(error = %e, "Classifier call failed, treating as no match");
            }
            Classification::Ambiguous(reason) => {
                tracing::debug!(%reason, "Classifier reply unusable, treating as no match");
            }
        }
        classification
    }
}

/// Extract the decision from the model reply, tolerating a fenced code block
pub fn parse_decision(reply: &str) -> Classification {
    let body = strip_code_fence(reply.trim());

    let decision: Decision = match serde_json::from_str(body) {
        Ok(d) => d,
        Err(e) => return Classification::Ambiguous(AmbiguityReason::MalformedJson(e.to_string())),
    };

    match decision.agent_name.as_deref().map(str::trim) {
        None | Some("") => Classification::Ambiguous(AmbiguityReason::MissingAgentName),
        Some(name) if name == Selection::NONE_NAME => Classification::NoMatch,
        Some(name) => Classification::Agent(name.to_string()),
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let Some(rest) = reply.strip_prefix("```") else {
        return reply;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
