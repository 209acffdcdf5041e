//! The state machine proper.

use crate::core::{FsmError, MachineId, State, StateId};
use crate::fsm::registry::{Hook, StateRegistry};
use crate::fsm::transition::TransitionController;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a machine.
///
/// `Active` is terminal: there is no shutdown phase, a machine is simply
/// dropped by its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachinePhase {
    Uninitialized,
    Active,
}

/// Point-in-time view of a machine, for debug overlays and logs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MachineStatus<I: StateId> {
    pub id: MachineId,
    pub label: Option<String>,
    pub phase: MachinePhase,
    pub current: Option<I>,
    pub pending: Option<I>,
    /// Stored identities in registration order.
    pub stored: Vec<I>,
}

/// Finite state machine over states keyed by `I`.
///
/// The first state added becomes the initial state. The host calls
/// [`initialize`](Self::initialize) once, then [`update`](Self::update)
/// once per tick. Each update first applies the pending transition, if
/// any, then runs exactly one `on_update` on the (possibly new) current
/// state.
///
/// A machine is owned and driven by one thread at a time. Separate
/// machines share nothing and can be driven in parallel.
pub struct StateMachine<I: StateId> {
    label: Option<String>,
    registry: StateRegistry<I>,
    transitions: TransitionController<I>,
    current: Option<I>,
}

impl<I: StateId> Default for StateMachine<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: StateId> StateMachine<I> {
    /// Create an empty, uninitialized machine.
    pub fn new() -> Self {
        Self {
            label: None,
            registry: StateRegistry::new(MachineId::new()),
            transitions: TransitionController::new(),
            current: None,
        }
    }

    /// Create an empty machine with a label used in log output.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new()
        }
    }

    pub fn id(&self) -> MachineId {
        self.registry.owner()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Store `state` under its identity.
    ///
    /// Fails with [`FsmError::DuplicateState`] if that identity is already
    /// stored.
    pub fn add_state<S>(&mut self, state: S) -> Result<(), FsmError>
    where
        S: State<I> + 'static,
    {
        self.add_boxed_state(Box::new(state))
    }

    pub fn add_boxed_state(&mut self, state: Box<dyn State<I>>) -> Result<(), FsmError> {
        let id = self.registry.add(state)?;
        tracing::debug!(
            machine = %self.id(),
            label = self.label(),
            state = id.name(),
            "state added"
        );
        Ok(())
    }

    /// Store a default-constructed `S`.
    pub fn add_default_state<S>(&mut self) -> Result<(), FsmError>
    where
        S: State<I> + Default + 'static,
    {
        self.add_boxed_state(Box::new(S::default()))
    }

    /// Remove the state stored under `id`.
    ///
    /// Fails with [`FsmError::UnknownRemoval`] if nothing is stored under
    /// `id`, and with [`FsmError::ActiveStateRemoval`] if `id` is the
    /// current state. Removing the target of a pending request cancels
    /// that request.
    pub fn remove_state(&mut self, id: I) -> Result<(), FsmError> {
        if self.current == Some(id) {
            return Err(FsmError::ActiveStateRemoval {
                state: id.name().to_string(),
            });
        }

        self.registry.remove(id)?;
        self.transitions.cancel(id);
        tracing::debug!(
            machine = %self.id(),
            label = self.label(),
            state = id.name(),
            "state removed"
        );
        Ok(())
    }

    /// Request a transition to `id`, applied at the start of the next update.
    ///
    /// Only one transition happens per update: a later request before that
    /// update replaces this one.
    pub fn request_state(&mut self, id: I) -> Result<(), FsmError> {
        self.transitions.request(id, self.registry.ids())?;
        tracing::trace!(machine = %self.id(), state = id.name(), "state requested");
        Ok(())
    }

    /// Enter the first stored state.
    ///
    /// Fails with [`FsmError::InitializationFailed`] when no state is
    /// stored (no hook runs), and with [`FsmError::AlreadyInitialized`] on
    /// a second call.
    pub fn initialize(&mut self) -> Result<(), FsmError> {
        if self.current.is_some() {
            return Err(FsmError::AlreadyInitialized);
        }
        let initial = self
            .registry
            .first()
            .ok_or(FsmError::InitializationFailed)?;

        self.current = Some(initial);
        tracing::debug!(
            machine = %self.id(),
            label = self.label(),
            state = initial.name(),
            "state machine initialized"
        );
        self.registry
            .run_hook(initial, Hook::Enter, &mut self.transitions)
    }

    /// Run one tick: apply the pending transition, then update the current state.
    pub fn update(&mut self) -> Result<(), FsmError> {
        let mut current = self.current.ok_or(FsmError::NotInitialized)?;

        let resolved = self
            .transitions
            .resolve(&mut current, &mut self.registry);
        self.current = Some(current);
        resolved?;

        self.registry
            .run_hook(current, Hook::Update, &mut self.transitions)
    }

    pub fn current_state(&self) -> Result<I, FsmError> {
        self.current.ok_or(FsmError::NotInitialized)
    }

    /// Whether the current state is `id`. Fails before initialization.
    pub fn current_state_is(&self, id: I) -> Result<bool, FsmError> {
        Ok(self.current_state()? == id)
    }

    /// Whether a state is stored under `id`. Safe at any time.
    pub fn has_state_stored(&self, id: I) -> bool {
        self.registry.contains(id)
    }

    pub fn pending_state(&self) -> Option<I> {
        self.transitions.pending()
    }

    /// Stored identities in registration order.
    pub fn stored_states(&self) -> impl Iterator<Item = I> + '_ {
        self.registry.ids().iter().copied()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn phase(&self) -> MachinePhase {
        if self.current.is_some() {
            MachinePhase::Active
        } else {
            MachinePhase::Uninitialized
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    pub fn find(&self, id: I) -> Option<&dyn State<I>> {
        self.registry.find(id)
    }

    pub fn find_mut(&mut self, id: I) -> Option<&mut (dyn State<I> + 'static)> {
        self.registry.find_mut(id)
    }

    pub fn status(&self) -> MachineStatus<I> {
        MachineStatus {
            id: self.id(),
            label: self.label.clone(),
            phase: self.phase(),
            current: self.current,
            pending: self.pending_state(),
            stored: self.registry.ids().to_vec(),
        }
    }
}
