//! Property-based tests for the routing state machine
//!
//! Drives `transition` to completion with a simulated runtime and checks the
//! shape of every possible walk through the graph.

use super::*;
use crate::agents::AgentId;
use crate::classifier::{AmbiguityReason, Classification};
use crate::session::Selection;
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_agent() -> impl Strategy<Value = AgentId> {
    prop_oneof![Just(AgentId::Weather), Just(AgentId::Graphql)]
}

fn arb_ambiguity() -> impl Strategy<Value = AmbiguityReason> {
    prop_oneof![
        "[a-z ]{0,20}".prop_map(AmbiguityReason::ModelUnavailable),
        "[a-z ]{0,20}".prop_map(AmbiguityReason::MalformedJson),
        Just(AmbiguityReason::MissingAgentName),
    ]
}

fn arb_classification() -> impl Strategy<Value = Classification> {
    prop_oneof![
        arb_agent().prop_map(|id| Classification::Agent(id.name().to_string())),
        "[a-z_]{1,20}".prop_map(Classification::Agent),
        Just(Classification::NoMatch),
        arb_ambiguity().prop_map(Classification::Ambiguous),
    ]
}

fn arb_context() -> impl Strategy<Value = RouterContext> {
    proptest::collection::vec(arb_agent(), 0..3).prop_map(RouterContext::new)
}

// ============================================================================
// Simulated runtime
// ============================================================================

struct Walk {
    states: Vec<RouteState>,
    effects: Vec<Effect>,
}

/// Run the machine the way the runtime does, answering each effect with
/// the event it would produce
fn walk(context: &RouterContext, classification: Classification) -> Walk {
    let mut state = RouteState::initial();
    let mut states = vec![state];
    let mut effects = vec![Effect::Classify];
    let mut pending = vec![Effect::Classify];

    while let Some(effect) = pending.pop() {
        let event = match effect {
            Effect::Classify => Event::Classified {
                classification: classification.clone(),
            },
            Effect::RecordSelection { .. } => Event::SelectionRecorded,
            Effect::RunAgent { agent } => Event::AgentFinished { agent },
            Effect::Finalize => Event::Finalized,
            Effect::Complete => break,
        };
        let result = transition(&state, context, event).expect("valid walk");
        state = result.new_state;
        states.push(state);
        effects.extend(result.effects.iter().copied());
        pending.extend(result.effects.into_iter().rev());
    }

    Walk { states, effects }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_always_reaches_terminal(
        context in arb_context(),
        classification in arb_classification(),
    ) {
        let walk = walk(&context, classification);
        prop_assert_eq!(walk.states.last(), Some(&RouteState::Terminal));
        prop_assert_eq!(walk.effects.last(), Some(&Effect::Complete));
    }

    #[test]
    fn prop_at_most_three_nodes(
        context in arb_context(),
        classification in arb_classification(),
    ) {
        let walk = walk(&context, classification);
        let nodes = walk.states.iter().filter(|s| s.is_node()).count();
        prop_assert!(nodes <= 3, "visited {} nodes: {:?}", nodes, walk.states);
        prop_assert!(nodes >= 2);
    }

    #[test]
    fn prop_no_state_revisited(
        context in arb_context(),
        classification in arb_classification(),
    ) {
        let walk = walk(&context, classification);
        let unique: HashSet<_> = walk.states.iter().collect();
        prop_assert_eq!(unique.len(), walk.states.len());
    }

    #[test]
    fn prop_only_registered_agents_run(
        context in arb_context(),
        classification in arb_classification(),
    ) {
        let expected = context.resolve(&classification);
        let walk = walk(&context, classification);

        let runs: Vec<AgentId> = walk
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::RunAgent { agent } => Some(*agent),
                _ => None,
            })
            .collect();

        match expected {
            Selection::Agent(agent) => {
                prop_assert!(context.is_registered(agent));
                prop_assert_eq!(runs, vec![agent]);
            }
            Selection::None => prop_assert!(runs.is_empty()),
        }
    }

    #[test]
    fn prop_selection_recorded_once_before_any_agent(
        context in arb_context(),
        classification in arb_classification(),
    ) {
        let walk = walk(&context, classification);
        let record_positions: Vec<usize> = walk
            .effects
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Effect::RecordSelection { .. }))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(record_positions.len(), 1);

        if let Some(run) = walk
            .effects
            .iter()
            .position(|e| matches!(e, Effect::RunAgent { .. }))
        {
            prop_assert!(record_positions[0] < run);
        }
    }

    #[test]
    fn prop_terminal_rejects_every_event(
        context in arb_context(),
        classification in arb_classification(),
        agent in arb_agent(),
    ) {
        let events = [
            Event::Classified { classification },
            Event::SelectionRecorded,
            Event::AgentFinished { agent },
            Event::Finalized,
        ];
        for event in events {
            prop_assert_eq!(
                transition(&RouteState::Terminal, &context, event).unwrap_err(),
                TransitionError::AlreadyTerminal
            );
        }
    }
}
