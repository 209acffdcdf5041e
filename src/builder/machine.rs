//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{State, StateId};
use crate::fsm::StateMachine;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing state machines with a fluent API.
///
/// States are stored in the order they are added; the first one is the
/// initial state. `build()` checks the whole definition at once and
/// reports every problem it finds, not just the first.
pub struct StateMachineBuilder<I: StateId> {
    label: Option<String>,
    states: Vec<Box<dyn State<I>>>,
}

impl<I: StateId> StateMachineBuilder<I> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            label: None,
            states: Vec::new(),
        }
    }

    /// Label used in the machine's log output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a state.
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: State<I> + 'static,
    {
        self.states.push(Box::new(state));
        self
    }

    /// Add an already boxed state.
    pub fn boxed_state(mut self, state: Box<dyn State<I>>) -> Self {
        self.states.push(state);
        self
    }

    /// Add a default-constructed `S`.
    pub fn default_state<S>(self) -> Self
    where
        S: State<I> + Default + 'static,
    {
        self.state(S::default())
    }

    /// Build the (uninitialized) state machine.
    /// Returns an error listing every problem with the definition.
    pub fn build(self) -> Result<StateMachine<I>, BuildError> {
        self.validate()?;

        let mut machine = match self.label {
            Some(label) => StateMachine::with_label(label),
            None => StateMachine::new(),
        };
        for state in self.states {
            machine.add_boxed_state(state)?;
        }
        Ok(machine)
    }

    /// Build the state machine and enter its initial state.
    pub fn start(self) -> Result<StateMachine<I>, BuildError> {
        let mut machine = self.build()?;
        machine.initialize()?;
        Ok(machine)
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        checks.push(if self.states.is_empty() {
            Validation::fail(BuildError::NoStates)
        } else {
            Validation::success(())
        });

        let mut seen = HashSet::new();
        for state in &self.states {
            let id = state.id();
            let check = if seen.insert(id) {
                Validation::success(())
            } else {
                Validation::fail(BuildError::DuplicateState {
                    state: id.name().to_string(),
                })
            };
            checks.push(check);
        }

        // Accumulate ALL failures using all_vec
        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(BuildError::Invalid(errors.iter().cloned().collect())),
        }
    }
}

impl<I: StateId> Default for StateMachineBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FsmError, StateContext};
    use crate::fsm::MachinePhase;

    crate::state_id! {
        enum TestState {
            Idle,
            Patrol,
            Chase,
        }
    }

    struct Simple(TestState);

    impl State<TestState> for Simple {
        fn id(&self) -> TestState {
            self.0
        }

        fn on_update(&mut self, _ctx: &mut StateContext<'_, TestState>) -> Result<(), FsmError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Idle;

    impl State<TestState> for Idle {
        fn id(&self) -> TestState {
            TestState::Idle
        }

        fn on_update(&mut self, _ctx: &mut StateContext<'_, TestState>) -> Result<(), FsmError> {
            Ok(())
        }
    }

    #[test]
    fn builder_requires_states() {
        let result = StateMachineBuilder::<TestState>::new().build();

        match result {
            Err(BuildError::Invalid(errors)) => assert_eq!(errors, vec![BuildError::NoStates]),
            _ => panic!("Expected NoStates"),
        }
    }

    #[test]
    fn builder_reports_every_duplicate() {
        let result = StateMachineBuilder::new()
            .state(Simple(TestState::Patrol))
            .state(Simple(TestState::Chase))
            .state(Simple(TestState::Patrol))
            .state(Simple(TestState::Chase))
            .build();

        match result {
            Err(BuildError::Invalid(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.contains(&BuildError::DuplicateState {
                    state: "Patrol".to_string()
                }));
                assert!(errors.contains(&BuildError::DuplicateState {
                    state: "Chase".to_string()
                }));
            }
            _ => panic!("Expected duplicate failures"),
        }
    }

    #[test]
    fn fluent_api_builds_machine_in_order() {
        let machine = StateMachineBuilder::new()
            .label("guard-01")
            .state(Simple(TestState::Patrol))
            .default_state::<Idle>()
            .boxed_state(Box::new(Simple(TestState::Chase)))
            .build()
            .unwrap();

        assert_eq!(machine.label(), Some("guard-01"));
        assert_eq!(machine.phase(), MachinePhase::Uninitialized);
        assert_eq!(
            machine.stored_states().collect::<Vec<_>>(),
            vec![TestState::Patrol, TestState::Idle, TestState::Chase]
        );
    }

    #[test]
    fn start_enters_first_state() {
        let machine = StateMachineBuilder::new()
            .default_state::<Idle>()
            .state(Simple(TestState::Chase))
            .start()
            .unwrap();

        assert_eq!(machine.current_state(), Ok(TestState::Idle));
    }
}
