//! Registry, deferred transitions and the state machine that drives them.
//!
//! # Key Concepts
//!
//! - **Registry**: states keyed by identity, in registration order
//! - **Transitions**: one pending request, applied at the start of an update
//! - **State Machine**: owns both and runs one state's update per tick

mod machine;
mod registry;
mod transition;

pub use machine::{MachinePhase, MachineStatus, StateMachine};
pub use registry::{DetachedState, StateRegistry};
pub use transition::TransitionController;
