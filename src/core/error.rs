//! Contract violation errors raised by the state machine.

use super::state::MachineId;
use thiserror::Error;

/// Errors signalling misuse of the state machine API.
///
/// None of these are transient: each one means the calling code broke a
/// precondition and should abort the offending code path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("StateMachine initialization failed: the machine does not contain any states")]
    InitializationFailed,

    #[error("StateMachine is already initialized")]
    AlreadyInitialized,

    #[error("StateMachine was not properly initialized. CurrentState is not available")]
    NotInitialized,

    #[error("The State \"{state}\" is already stored, duplicate cannot be added")]
    DuplicateState { state: String },

    #[error("A change to State \"{state}\" was requested, but the State is not stored in this StateMachine")]
    UnknownState { state: String },

    #[error("The State \"{state}\" was requested for removal, but is not stored in this StateMachine")]
    UnknownRemoval { state: String },

    #[error("The State \"{state}\" is the active state and cannot be removed")]
    ActiveStateRemoval { state: String },

    #[error("The State \"{state}\" is already bound to StateMachine {owner}")]
    AlreadyBound { state: String, owner: MachineId },
}

impl FsmError {
    pub(crate) fn duplicate(state: &str) -> Self {
        Self::DuplicateState {
            state: state.to_string(),
        }
    }

    pub(crate) fn unknown(state: &str) -> Self {
        Self::UnknownState {
            state: state.to_string(),
        }
    }

    pub(crate) fn unknown_removal(state: &str) -> Self {
        Self::UnknownRemoval {
            state: state.to_string(),
        }
    }
}
