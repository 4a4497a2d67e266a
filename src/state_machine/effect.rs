//! Effects produced by state transitions

use crate::agents::AgentId;
use crate::session::Selection;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Run the classifier on the user query
    Classify,

    /// Write the resolved selection into the session state
    RecordSelection { selection: Selection },

    /// Execute one agent
    RunAgent { agent: AgentId },

    /// Run the formatter
    Finalize,

    /// The turn is over; extract the response
    Complete,
}
