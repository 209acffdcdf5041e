//! Storage of states keyed by identity.

use crate::core::{FsmError, MachineId, OwnerBinding, State, StateContext, StateId};
use crate::fsm::transition::TransitionController;

/// Which lifecycle hook to run on a stored state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Hook {
    Enter,
    Update,
    Exit,
}

struct Slot<I: StateId> {
    binding: OwnerBinding,
    state: Box<dyn State<I>>,
}

/// A state taken out of a registry.
///
/// It keeps the binding to the machine it was registered in, so it can be
/// inspected but never registered again.
pub struct DetachedState<I: StateId> {
    binding: OwnerBinding,
    state: Box<dyn State<I>>,
}

impl<I: StateId> DetachedState<I> {
    pub fn id(&self) -> I {
        self.state.id()
    }

    /// Binding to the machine the state was removed from.
    pub fn binding(&self) -> OwnerBinding {
        self.binding
    }

    pub fn state(&self) -> &dyn State<I> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> &mut (dyn State<I> + 'static) {
        self.state.as_mut()
    }
}

/// Registration-ordered mapping from identity to state.
///
/// Keys are unique. The first stored state is the machine's initial state,
/// so insertion order is kept through removals.
pub struct StateRegistry<I: StateId> {
    owner: MachineId,
    // `ids[i]` is the key of `slots[i]`
    ids: Vec<I>,
    slots: Vec<Slot<I>>,
}

impl<I: StateId> StateRegistry<I> {
    /// Create an empty registry whose states will be bound to `owner`.
    pub fn new(owner: MachineId) -> Self {
        Self {
            owner,
            ids: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn owner(&self) -> MachineId {
        self.owner
    }

    /// Store `state` under its own identity and bind it to this registry's owner.
    ///
    /// Fails with [`FsmError::DuplicateState`] if the identity is already
    /// stored; the registry is left untouched in that case.
    pub fn add(&mut self, state: Box<dyn State<I>>) -> Result<I, FsmError> {
        self.insert(OwnerBinding::unbound(), state)
    }

    /// Store a state removed from some registry.
    ///
    /// Always fails with [`FsmError::AlreadyBound`]: a state belongs to the
    /// machine it was first registered in for its whole lifetime.
    pub fn add_detached(&mut self, detached: DetachedState<I>) -> Result<I, FsmError> {
        self.insert(detached.binding, detached.state)
    }

    /// Construct a default `S` and store it.
    pub fn add_default<S>(&mut self) -> Result<I, FsmError>
    where
        S: State<I> + Default + 'static,
    {
        self.add(Box::new(S::default()))
    }

    /// Remove the state stored under `id`, returning it still bound to this
    /// registry's owner.
    pub fn remove(&mut self, id: I) -> Result<DetachedState<I>, FsmError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| FsmError::unknown_removal(id.name()))?;
        self.ids.remove(index);
        let Slot { binding, state } = self.slots.remove(index);
        Ok(DetachedState { binding, state })
    }

    pub fn find(&self, id: I) -> Option<&dyn State<I>> {
        self.index_of(id).map(|i| self.slots[i].state.as_ref())
    }

    pub fn find_mut(&mut self, id: I) -> Option<&mut (dyn State<I> + 'static)> {
        let index = self.index_of(id)?;
        Some(self.slots[index].state.as_mut())
    }

    pub fn contains(&self, id: I) -> bool {
        self.ids.contains(&id)
    }

    /// Owner binding of the state stored under `id`.
    pub fn binding(&self, id: I) -> Option<OwnerBinding> {
        self.index_of(id).map(|i| self.slots[i].binding)
    }

    /// Identity of the first stored state.
    pub fn first(&self) -> Option<I> {
        self.ids.first().copied()
    }

    /// Stored identities in registration order.
    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Run one lifecycle hook of the state stored under `id`.
    ///
    /// The hook's context shares `transitions`, so requests made inside the
    /// hook land in the machine's pending slot.
    pub(crate) fn run_hook(
        &mut self,
        id: I,
        hook: Hook,
        transitions: &mut TransitionController<I>,
    ) -> Result<(), FsmError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| FsmError::unknown(id.name()))?;

        let owner = self.owner;
        let ids = &self.ids;
        let state = &mut self.slots[index].state;
        let mut ctx = StateContext::new(owner, id, ids, transitions);

        match hook {
            Hook::Enter => state.on_enter(&mut ctx),
            Hook::Update => state.on_update(&mut ctx),
            Hook::Exit => state.on_exit(&mut ctx),
        }
    }

    fn insert(&mut self, mut binding: OwnerBinding, state: Box<dyn State<I>>) -> Result<I, FsmError> {
        let id = state.id();
        if self.contains(id) {
            return Err(FsmError::duplicate(id.name()));
        }
        binding.bind(self.owner, id.name())?;

        self.ids.push(id);
        self.slots.push(Slot { binding, state });
        Ok(id)
    }

    fn index_of(&self, id: I) -> Option<usize> {
        self.ids.iter().position(|stored| *stored == id)
    }
}
