//! Core state machine vocabulary.
//!
//! This module contains the types every other module builds on:
//! - State identities via the `StateId` trait
//! - The `State` lifecycle trait and the `StateContext` handed to its hooks
//! - The `FsmError` contract-violation taxonomy

mod error;
mod identity;
mod state;

pub use error::FsmError;
pub use identity::StateId;
pub use state::{MachineId, OwnerBinding, State, StateContext};
