//! Cadence FSM: a finite state machine for per-entity simulation behavior
//!
//! States are registered by identity, transitions are requested at any time
//! and applied at the start of the next update, and AI states can run a
//! second, throttled logic tick on top of the per-frame update.
//!
//! # Core Concepts
//!
//! - **StateId**: Comparable identity of a concrete state kind
//! - **State**: Enter/update/exit hooks with a context for requesting transitions
//! - **StateMachine**: Registry plus single-slot deferred transitions
//! - **DualCadence**: Per-frame update plus a jittered, interval-driven logic update
//!
//! # Example
//!
//! ```rust
//! use cadence_fsm::core::{FsmError, State, StateContext};
//! use cadence_fsm::fsm::StateMachine;
//! use cadence_fsm::state_id;
//!
//! state_id! {
//!     enum Demo {
//!         A,
//!         B,
//!     }
//! }
//!
//! #[derive(Default)]
//! struct StateA {
//!     ticks: u32,
//! }
//!
//! impl State<Demo> for StateA {
//!     fn id(&self) -> Demo {
//!         Demo::A
//!     }
//!
//!     fn on_enter(&mut self, _ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
//!         self.ticks = 0;
//!         Ok(())
//!     }
//!
//!     fn on_update(&mut self, ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
//!         self.ticks += 1;
//!         if self.ticks >= 3 {
//!             ctx.request_state(Demo::B)?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct StateB;
//!
//! impl State<Demo> for StateB {
//!     fn id(&self) -> Demo {
//!         Demo::B
//!     }
//!
//!     fn on_update(&mut self, ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
//!         ctx.request_state(Demo::A)
//!     }
//! }
//!
//! let mut machine = StateMachine::new();
//! machine.add_default_state::<StateA>()?;
//! machine.add_default_state::<StateB>()?;
//! machine.initialize()?;
//!
//! for _ in 0..4 {
//!     machine.update()?;
//! }
//! assert!(machine.current_state_is(Demo::B)?);
//! # Ok::<(), FsmError>(())
//! ```

pub mod builder;
pub mod cadence;
pub mod core;
pub mod fsm;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use cadence::{CadenceBehavior, CadenceConfig, Clock, DualCadence, SharedClock};
pub use crate::core::{FsmError, State, StateContext, StateId};
pub use fsm::StateMachine;
