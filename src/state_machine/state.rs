//! Routing state types

use crate::agents::AgentId;
use crate::classifier::Classification;
use crate::session::Selection;
use std::collections::BTreeSet;
use std::fmt;

/// Where a turn is in the routing graph
///
/// `Classifying -> Dispatching -> [Handling] -> Formatting -> Terminal`.
/// `Dispatching` is the only branch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteState {
    Classifying,
    Dispatching { selection: Selection },
    Handling { agent: AgentId },
    Formatting,
    Terminal,
}

impl RouteState {
    pub fn initial() -> Self {
        RouteState::Classifying
    }

    /// Whether this state does work (classifier, agent, formatter),
    /// as opposed to branching or being done
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            RouteState::Classifying | RouteState::Handling { .. } | RouteState::Formatting
        )
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteState::Classifying => f.write_str("classifying"),
            RouteState::Dispatching { selection } => write!(f, "dispatching({selection})"),
            RouteState::Handling { agent } => write!(f, "handling({agent})"),
            RouteState::Formatting => f.write_str("formatting"),
            RouteState::Terminal => f.write_str("terminal"),
        }
    }
}

/// Immutable routing context: which agents are registered
#[derive(Debug, Clone, Default)]
pub struct RouterContext {
    registered: BTreeSet<AgentId>,
}

impl RouterContext {
    pub fn new(registered: impl IntoIterator<Item = AgentId>) -> Self {
        Self {
            registered: registered.into_iter().collect(),
        }
    }

    pub fn is_registered(&self, agent: AgentId) -> bool {
        self.registered.contains(&agent)
    }

    /// Map a classifier decision onto a selection.
    ///
    /// Only names of registered agents route to an agent; unknown names,
    /// unregistered agents, "none" and ambiguous replies all select nothing.
    pub fn resolve(&self, classification: &Classification) -> Selection {
        match classification {
            Classification::Agent(name) => AgentId::from_name(name)
                .filter(|id| self.is_registered(*id))
                .map_or(Selection::None, Selection::Agent),
            Classification::NoMatch | Classification::Ambiguous(_) => Selection::None,
        }
    }
}
