//! Build errors for state machine construction and configuration.

use crate::core::FsmError;
use thiserror::Error;

/// Errors that can occur when building state machines and cadence settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("No states added. Call .state(...) before .build()")]
    NoStates,

    #[error("State \"{state}\" added more than once. Each state identity can be stored once")]
    DuplicateState { state: String },

    #[error("Invalid logic interval of {seconds} seconds. Use a finite, non-negative value")]
    InvalidInterval { seconds: f32 },

    #[error("State machine definition is invalid: {}", summarize(.0))]
    Invalid(Vec<BuildError>),

    #[error(transparent)]
    Machine(#[from] FsmError),
}

fn summarize(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
