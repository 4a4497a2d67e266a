//! Weather agent: one LLM call with a fixed persona, no external data source

use super::{record_failure, Agent, AgentError, AgentId};
use crate::llm::{LlmRequest, LlmService};
use crate::session::{SessionState, Selection};
use crate::system_prompt::WEATHER_PERSONA;
use async_trait::async_trait;
use std::sync::Arc;

pub struct WeatherAgent {
    llm: Arc<dyn LlmService>,
}

impl WeatherAgent {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    async fn answer(&self, query: &str) -> Result<String, AgentError> {
        let request = LlmRequest::with_system(WEATHER_PERSONA, query);
        let response = self.llm.complete(&request).await?;
        Ok(response.text())
    }
}

#[async_trait]
impl Agent for WeatherAgent {
    fn id(&self) -> AgentId {
        AgentId::Weather
    }

    async fn execute(&self, mut state: SessionState) -> SessionState {
        match self.answer(state.user_query()).await {
            Ok(text) => {
                state.response = Some(text);
                state.selected_handler = Selection::Agent(AgentId::Weather);
                state
            }
            Err(e) => record_failure(state, AgentId::Weather, &e),
        }
    }
}
