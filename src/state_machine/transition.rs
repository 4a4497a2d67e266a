//! Pure state transition function

use super::{Effect, Event, RouteState, RouterContext};
use crate::session::Selection;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: RouteState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: RouteState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Turn already finished")]
    AlreadyTerminal,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &RouteState,
    context: &RouterContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Classifying + Classified -> Dispatching
        (RouteState::Classifying, Event::Classified { classification }) => {
            let selection = context.resolve(&classification);
            Ok(TransitionResult::new(RouteState::Dispatching { selection })
                .with_effect(Effect::RecordSelection { selection }))
        }

        // Dispatching is the single branch point
        (RouteState::Dispatching { selection }, Event::SelectionRecorded) => match selection {
            Selection::Agent(agent) if context.is_registered(*agent) => {
                Ok(TransitionResult::new(RouteState::Handling { agent: *agent })
                    .with_effect(Effect::RunAgent { agent: *agent }))
            }
            _ => Ok(TransitionResult::new(RouteState::Formatting).with_effect(Effect::Finalize)),
        },

        // Handler success or failure both go to formatting
        (RouteState::Handling { agent }, Event::AgentFinished { agent: finished })
            if *agent == finished =>
        {
            Ok(TransitionResult::new(RouteState::Formatting).with_effect(Effect::Finalize))
        }

        (RouteState::Formatting, Event::Finalized) => {
            Ok(TransitionResult::new(RouteState::Terminal).with_effect(Effect::Complete))
        }

        (RouteState::Terminal, _) => Err(TransitionError::AlreadyTerminal),

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state} on {event:?}"
        ))),
    }
}
