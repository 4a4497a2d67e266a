//! Runtime for executing one routed turn
//!
//! The router owns the classifier, the agent registration table and the
//! formatter. It feeds events into the pure state machine and performs the
//! effects it asks for, strictly one after another.

#[cfg(test)]
pub mod testing;

use crate::agents::{AgentId, AgentRegistry};
use crate::classifier::Classifier;
use crate::formatter::Formatter;
use crate::llm::LlmError;
use crate::session::{HistoryRole, SessionState};
use crate::state_machine::{
    transition, Effect, Event, RouteState, RouterContext, TransitionError,
};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::Instrument;

/// Failures that escape a turn
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("fallback answer failed: {0}")]
    Fallback(#[from] LlmError),
    #[error("{0}")]
    Transition(#[from] TransitionError),
    #[error("agent {0} has no registered implementation")]
    UnregisteredAgent(AgentId),
}

pub struct Router {
    classifier: Classifier,
    agents: AgentRegistry,
    formatter: Formatter,
    context: RouterContext,
}

impl Router {
    pub fn new(classifier: Classifier, agents: AgentRegistry, formatter: Formatter) -> Self {
        let context = RouterContext::new(agents.ids());
        Self {
            classifier,
            agents,
            formatter,
            context,
        }
    }

    /// Run one full turn for `query` and return the reply text
    pub async fn handle(&self, query: &str) -> Result<String, TurnError> {
        let state = self.run_turn(SessionState::new(query)).await?;
        Ok(state.into_response())
    }

    /// Thread `state` through the graph and return it finalized
    pub async fn run_turn(&self, state: SessionState) -> Result<SessionState, TurnError> {
        let turn_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("turn", turn_id = %turn_id);
        self.drive(state).instrument(span).await
    }

    async fn drive(&self, mut state: SessionState) -> Result<SessionState, TurnError> {
        state.last_error = None;
        tracing::info!(query_len = state.user_query().len(), "Turn started");

        let mut route = RouteState::initial();
        let mut nodes_visited = 1;
        let mut pending = VecDeque::from([Effect::Classify]);

        while let Some(effect) = pending.pop_front() {
            let event = match effect {
                Effect::Classify => {
                    let classification = self.classifier.classify(state.user_query()).await;
                    tracing::debug!(decision = classification.agent_name(), "Classifier decided");
                    Event::Classified { classification }
                }
                Effect::RecordSelection { selection } => {
                    state.selected_handler = selection;
                    tracing::info!(handler = %selection, "Selection recorded");
                    Event::SelectionRecorded
                }
                Effect::RunAgent { agent } => {
                    let handler = self
                        .agents
                        .get(agent)
                        .ok_or(TurnError::UnregisteredAgent(agent))?;
                    state = handler.execute(state).await;
                    Event::AgentFinished { agent }
                }
                Effect::Finalize => {
                    state = self.formatter.finalize(state).await?;
                    Event::Finalized
                }
                Effect::Complete => {
                    let response = state.response_text().to_string();
                    let query = state.user_query().to_string();
                    state.push_history(HistoryRole::User, query);
                    state.push_history(HistoryRole::Assistant, response);
                    tracing::info!(
                        handler = %state.selected_handler,
                        failed = state.last_error.is_some(),
                        nodes_visited,
                        "Turn complete"
                    );
                    return Ok(state);
                }
            };

            let result = transition(&route, &self.context, event)?;
            tracing::debug!(from = %route, to = %result.new_state, "Route transition");
            route = result.new_state;
            if route.is_node() {
                nodes_visited += 1;
            }
            pending.extend(result.effects);
        }

        Err(TransitionError::InvalidTransition(format!("turn stopped in {route}")).into())
    }
}
