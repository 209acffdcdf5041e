//! Single-slot deferred transitions.

use crate::core::{FsmError, StateId};
use crate::fsm::registry::{Hook, StateRegistry};

/// Holds at most one pending transition request.
///
/// Requests are last-write-wins: requesting twice before the next update
/// keeps only the second target. The request is applied by [`resolve`],
/// which the machine calls at the start of every update, so a state that
/// requests a transition from its own update still finishes that update
/// untouched.
///
/// [`resolve`]: TransitionController::resolve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionController<I: StateId> {
    pending: Option<I>,
}

impl<I: StateId> Default for TransitionController<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: StateId> TransitionController<I> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Target of the pending request, if any.
    pub fn pending(&self) -> Option<I> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a request for `id`, which must be one of `stored`.
    ///
    /// An unknown identity fails with [`FsmError::UnknownState`] and leaves
    /// any earlier request in place.
    pub fn request(&mut self, id: I, stored: &[I]) -> Result<(), FsmError> {
        if !stored.contains(&id) {
            return Err(FsmError::unknown(id.name()));
        }
        if let Some(previous) = self.pending.replace(id) {
            if previous != id {
                tracing::trace!(
                    previous = previous.name(),
                    requested = id.name(),
                    "overwriting pending state request"
                );
            }
        }
        Ok(())
    }

    /// Drop the pending request if it targets `id`.
    pub(crate) fn cancel(&mut self, id: I) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    /// Apply the pending request, if any, to `current`.
    ///
    /// A request for the current state is cleared without running any hook.
    /// Otherwise the current state's `on_exit` runs, the slot is cleared
    /// (discarding anything requested during exit), `current` is switched
    /// and the new state's `on_enter` runs. Returns whether a switch
    /// happened.
    ///
    /// If `on_exit` fails nothing changes and the request stays pending. If
    /// `on_enter` fails the switch has already happened.
    pub(crate) fn resolve(
        &mut self,
        current: &mut I,
        registry: &mut StateRegistry<I>,
    ) -> Result<bool, FsmError> {
        let Some(next) = self.pending else {
            return Ok(false);
        };

        if next == *current {
            tracing::trace!(state = next.name(), "ignoring redundant state request");
            self.pending = None;
            return Ok(false);
        }

        if let Err(err) = registry.run_hook(*current, Hook::Exit, self) {
            self.pending = Some(next);
            return Err(err);
        }
        self.pending = None;

        tracing::debug!(
            machine = %registry.owner(),
            from = current.name(),
            to = next.name(),
            "state transition"
        );
        *current = next;

        registry.run_hook(next, Hook::Enter, self)?;
        Ok(true)
    }
}
