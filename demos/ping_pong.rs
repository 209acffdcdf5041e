//! Ping Pong State Machine
//!
//! Two counter states hand control back and forth by requesting each other.
//!
//! Key concepts:
//! - States request transitions from inside `on_update`
//! - Requests are applied at the start of the next update
//! - The host can request a state from outside the machine
//! - `on_enter` resets per-visit state
//!
//! Run with: cargo run --example ping_pong
//! Set `RUST_LOG=cadence_fsm=debug` to see transitions as they are applied.

use cadence_fsm::core::{FsmError, State, StateContext};
use cadence_fsm::fsm::StateMachine;
use cadence_fsm::state_id;
use tracing_subscriber::EnvFilter;

const MAIN_LOOP_TICKS: usize = 17;
const SIDE_LOOP_TICKS: usize = 5;

state_id! {
    enum Demo {
        A,
        B,
    }
}

/// Hands over to B after three ticks.
#[derive(Default)]
struct StateA {
    counter: u32,
}

impl StateA {
    const SWITCH_AFTER: u32 = 3;
}

impl State<Demo> for StateA {
    fn id(&self) -> Demo {
        Demo::A
    }

    fn on_enter(&mut self, _ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
        self.counter = 0;
        println!("EXHIBITING A ========");
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
        println!("-------- State A Tick");
        self.counter += 1;
        if self.counter >= Self::SWITCH_AFTER {
            ctx.request_state(Demo::B)?;
        }
        Ok(())
    }
}

/// Hands back to A after five ticks.
#[derive(Default)]
struct StateB {
    counter: u32,
}

impl StateB {
    const SWITCH_AFTER: u32 = 5;
}

impl State<Demo> for StateB {
    fn id(&self) -> Demo {
        Demo::B
    }

    fn on_enter(&mut self, _ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
        self.counter = 0;
        println!("EXHIBITING B ========");
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Demo>) -> Result<(), FsmError> {
        println!("-------- State B Tick");
        self.counter += 1;
        if self.counter >= Self::SWITCH_AFTER {
            ctx.request_state(Demo::A)?;
        }
        Ok(())
    }
}

fn run() -> Result<(), FsmError> {
    let mut machine = StateMachine::with_label("ping-pong");
    machine.add_default_state::<StateA>()?;
    machine.add_default_state::<StateB>()?;
    machine.initialize()?;

    for _ in 0..MAIN_LOOP_TICKS {
        machine.update()?;
    }

    // The machine would carry on with A here; switch it to B instead.
    machine.request_state(Demo::B)?;
    println!("REQUESTED: B ========");

    for _ in 0..SIDE_LOOP_TICKS {
        machine.update()?;
    }

    println!("==================================");
    println!("current_state_is(A) = {}", machine.current_state_is(Demo::A)?);
    println!("has_state_stored(B) = {}", machine.has_state_stored(Demo::B));
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("state machine error: {err}");
        std::process::exit(1);
    }
}
