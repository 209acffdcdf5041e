//! Core State trait and the handle states use to reach their machine.
//!
//! A state never holds a pointer to its machine. Each lifecycle hook gets a
//! [`StateContext`] instead, which is the only way to talk back to the
//! owning machine (request a transition, query stored states).

use super::error::FsmError;
use super::identity::StateId;
use crate::fsm::TransitionController;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of one state machine instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct MachineId(Uuid);

impl MachineId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner slot of a registered state.
///
/// Created unbound and bound exactly once, when the state is registered.
/// Binding again is a contract violation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OwnerBinding {
    owner: Option<MachineId>,
}

impl OwnerBinding {
    pub fn unbound() -> Self {
        Self { owner: None }
    }

    /// Bind to `owner`. Fails if this slot was already bound.
    pub fn bind(&mut self, owner: MachineId, state: &str) -> Result<(), FsmError> {
        if let Some(existing) = self.owner {
            return Err(FsmError::AlreadyBound {
                state: state.to_string(),
                owner: existing,
            });
        }
        self.owner = Some(owner);
        Ok(())
    }

    pub fn owner(&self) -> Option<MachineId> {
        self.owner
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }
}

/// Handle passed to every lifecycle hook.
///
/// Lives only for the duration of one hook call.
pub struct StateContext<'a, I: StateId> {
    owner: MachineId,
    state: I,
    stored: &'a [I],
    transitions: &'a mut TransitionController<I>,
}

impl<'a, I: StateId> StateContext<'a, I> {
    pub(crate) fn new(
        owner: MachineId,
        state: I,
        stored: &'a [I],
        transitions: &'a mut TransitionController<I>,
    ) -> Self {
        Self {
            owner,
            state,
            stored,
            transitions,
        }
    }

    /// The machine this state is registered in.
    pub fn owner(&self) -> MachineId {
        self.owner
    }

    /// Identity of the state whose hook is running.
    pub fn state_id(&self) -> I {
        self.state
    }

    pub fn has_state_stored(&self, id: I) -> bool {
        self.stored.contains(&id)
    }

    /// Transition currently waiting for the next update, if any.
    pub fn pending_state(&self) -> Option<I> {
        self.transitions.pending()
    }

    /// Request a transition to `id`, applied at the start of the next update.
    ///
    /// Overwrites any earlier request made before that update.
    pub fn request_state(&mut self, id: I) -> Result<(), FsmError> {
        self.transitions.request(id, self.stored)
    }
}

/// A unit of behavior stored in a state machine.
///
/// # Lifecycle
///
/// 1. `on_enter()` - once, when the machine switches to this state
/// 2. `on_update()` - once per machine update while this state is current
/// 3. `on_exit()` - once, right before the machine switches away
///
/// `id()` is read once at registration and keys the state for as long as
/// it stays stored.
///
/// # Example
///
/// ```rust
/// use cadence_fsm::core::{FsmError, State, StateContext};
/// use cadence_fsm::state_id;
///
/// state_id! {
///     enum Door {
///         Closed,
///         Open,
///     }
/// }
///
/// struct Closed {
///     knocks: u32,
/// }
///
/// impl State<Door> for Closed {
///     fn id(&self) -> Door {
///         Door::Closed
///     }
///
///     fn on_enter(&mut self, _ctx: &mut StateContext<'_, Door>) -> Result<(), FsmError> {
///         self.knocks = 0;
///         Ok(())
///     }
///
///     fn on_update(&mut self, ctx: &mut StateContext<'_, Door>) -> Result<(), FsmError> {
///         self.knocks += 1;
///         if self.knocks >= 3 {
///             ctx.request_state(Door::Open)?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait State<I: StateId>: Send {
    /// Identity this state is registered under.
    fn id(&self) -> I;

    /// Called once when the state is entered.
    fn on_enter(&mut self, _ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        Ok(())
    }

    /// Called once, right before the state is exited.
    fn on_exit(&mut self, _ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        Ok(())
    }

    /// Called on every machine update while this state is current.
    fn on_update(&mut self, ctx: &mut StateContext<'_, I>) -> Result<(), FsmError>;
}
