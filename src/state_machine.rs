//! Routing state machine for one turn
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` decides, the runtime performs the effects and feeds the
//! outcome back as the next event.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{RouteState, RouterContext};
pub use transition::{transition, TransitionError, TransitionResult};
