//! Events reported back by the runtime after performing an effect

use crate::agents::AgentId;
use crate::classifier::Classification;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The classifier produced its decision
    Classified { classification: Classification },
    /// The selection was written into the session state
    SelectionRecorded,
    /// The agent returned, successfully or with an error annotation
    AgentFinished { agent: AgentId },
    /// The formatter produced the final response
    Finalized,
}
