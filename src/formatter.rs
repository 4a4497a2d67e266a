//! Final response assembly
//!
//! Guarantees a non-empty reply. The fallback LLM call is the only failure
//! that can escape a turn.

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::session::{Selection, SessionState};
use crate::system_prompt::{fallback_prompt, APOLOGY};
use std::sync::Arc;

pub struct Formatter {
    llm: Arc<dyn LlmService>,
}

impl Formatter {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    pub async fn finalize(&self, mut state: SessionState) -> Result<SessionState, LlmError> {
        if state.selected_handler == Selection::None {
            let request = LlmRequest::user_text(fallback_prompt(state.user_query()));
            let text = self.llm.complete(&request).await?.text();
            if text.trim().is_empty() {
                tracing::warn!("Fallback answer was empty, apologizing instead");
                state.response = Some(APOLOGY.to_string());
            } else {
                state.response = Some(text);
            }
            return Ok(state);
        }

        if !state.has_response() {
            tracing::debug!(handler = %state.selected_handler, "Handler left no response");
            state.response = Some(APOLOGY.to_string());
        }
        Ok(state)
    }
}
