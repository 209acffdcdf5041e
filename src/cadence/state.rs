//! States with a second, throttled logic tick.

use super::clock::SharedClock;
use super::config::CadenceConfig;
use super::jitter::{jitter_offset, JitterSource, NoJitter, ThreadRngJitter};
use crate::core::{FsmError, State, StateContext, StateId};
use std::fmt;
use std::time::Duration;

/// Behavior driven by a [`DualCadence`] state.
///
/// `regular_update` runs on every machine update and should stay cheap
/// (motion, animation bookkeeping). `logic_update` runs at most once per
/// configured interval and is where expensive evaluation belongs
/// (perception checks, threat scoring).
pub trait CadenceBehavior<I: StateId>: Send {
    fn id(&self) -> I;

    fn on_state_enter(&mut self, _ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        Ok(())
    }

    fn on_state_exit(&mut self, _ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        Ok(())
    }

    /// Runs on every update.
    fn regular_update(&mut self, ctx: &mut StateContext<'_, I>) -> Result<(), FsmError>;

    /// Runs on updates where the logic interval has elapsed.
    fn logic_update(&mut self, ctx: &mut StateContext<'_, I>) -> Result<(), FsmError>;
}

/// Wraps a [`CadenceBehavior`] into a [`State`] with two update rates.
///
/// On enter the first logic tick is scheduled at `now + jitter`, with
/// jitter in `[0, interval)`, so many instances entering together do not
/// run their logic on the same frame. Each fired logic tick moves the
/// schedule forward by exactly one interval from the previous schedule,
/// not from `now`: timing errors do not accumulate and a late tick is
/// caught up on the following updates.
///
/// # Example
///
/// ```rust
/// use cadence_fsm::cadence::{CadenceBehavior, CadenceConfig, DualCadence, ManualClock, SharedClock};
/// use cadence_fsm::core::{FsmError, StateContext};
/// use cadence_fsm::fsm::StateMachine;
/// use cadence_fsm::state_id;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// state_id! {
///     enum Guard {
///         Watch,
///     }
/// }
///
/// #[derive(Default)]
/// struct Watch {
///     frames: u32,
///     scans: u32,
/// }
///
/// impl CadenceBehavior<Guard> for Watch {
///     fn id(&self) -> Guard {
///         Guard::Watch
///     }
///
///     fn regular_update(&mut self, _ctx: &mut StateContext<'_, Guard>) -> Result<(), FsmError> {
///         self.frames += 1;
///         Ok(())
///     }
///
///     fn logic_update(&mut self, _ctx: &mut StateContext<'_, Guard>) -> Result<(), FsmError> {
///         self.scans += 1;
///         Ok(())
///     }
/// }
///
/// let clock = Arc::new(ManualClock::new());
/// let shared: SharedClock = clock.clone();
/// let config = CadenceConfig::new(Duration::from_millis(100)).without_jitter();
///
/// let mut machine: StateMachine<Guard> = StateMachine::new();
/// machine.add_state(DualCadence::new(Watch::default(), config, shared))?;
/// machine.initialize()?;
///
/// for _ in 0..10 {
///     clock.advance(Duration::from_millis(50));
///     machine.update()?;
/// }
/// # Ok::<(), FsmError>(())
/// ```
pub struct DualCadence<B> {
    behavior: B,
    interval: Duration,
    next_logic_at: Duration,
    clock: SharedClock,
    jitter: Box<dyn JitterSource>,
}

impl<B> DualCadence<B> {
    /// Wrap `behavior`. Jitter comes from the thread RNG unless the config
    /// disables it.
    pub fn new(behavior: B, config: CadenceConfig, clock: SharedClock) -> Self {
        let jitter: Box<dyn JitterSource> = if config.jitter {
            Box::new(ThreadRngJitter)
        } else {
            Box::new(NoJitter)
        };
        Self {
            behavior,
            interval: config.interval,
            next_logic_at: Duration::ZERO,
            clock,
            jitter,
        }
    }

    /// Replace the jitter source, e.g. with a seeded one for replays.
    pub fn with_jitter_source(mut self, source: impl JitterSource + 'static) -> Self {
        self.jitter = Box::new(source);
        self
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next logic tick is due, on the clock's timeline.
    pub fn next_logic_at(&self) -> Duration {
        self.next_logic_at
    }
}

impl<B: fmt::Debug> fmt::Debug for DualCadence<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualCadence")
            .field("behavior", &self.behavior)
            .field("interval", &self.interval)
            .field("next_logic_at", &self.next_logic_at)
            .finish_non_exhaustive()
    }
}

impl<I, B> State<I> for DualCadence<B>
where
    I: StateId,
    B: CadenceBehavior<I>,
{
    fn id(&self) -> I {
        self.behavior.id()
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        let offset = jitter_offset(self.jitter.as_mut(), self.interval);
        self.next_logic_at = self.clock.now().saturating_add(offset);
        self.behavior.on_state_enter(ctx)
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        self.behavior.on_state_exit(ctx)
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, I>) -> Result<(), FsmError> {
        self.behavior.regular_update(ctx)?;

        if self.clock.now() >= self.next_logic_at {
            self.next_logic_at = self.next_logic_at.saturating_add(self.interval);
            tracing::trace!(
                state = ctx.state_id().name(),
                next_logic_at = ?self.next_logic_at,
                "logic update"
            );
            self.behavior.logic_update(ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::clock::ManualClock;
    use crate::core::MachineId;
    use crate::fsm::{StateMachine, TransitionController};
    use serde::{Deserialize, Serialize};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum Enemy {
        Patrol,
        Chase,
    }

    impl StateId for Enemy {
        fn name(&self) -> &str {
            match self {
                Self::Patrol => "Patrol",
                Self::Chase => "Chase",
            }
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Counts {
        enters: u32,
        exits: u32,
        regular: u32,
        logic: u32,
    }

    struct Counting {
        id: Enemy,
        counts: Arc<Mutex<Counts>>,
        chase_after_logic: bool,
    }

    impl CadenceBehavior<Enemy> for Counting {
        fn id(&self) -> Enemy {
            self.id
        }

        fn on_state_enter(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
            self.counts.lock().unwrap().enters += 1;
            Ok(())
        }

        fn on_state_exit(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
            self.counts.lock().unwrap().exits += 1;
            Ok(())
        }

        fn regular_update(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
            self.counts.lock().unwrap().regular += 1;
            Ok(())
        }

        fn logic_update(&mut self, ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
            self.counts.lock().unwrap().logic += 1;
            if self.chase_after_logic {
                ctx.request_state(Enemy::Chase)?;
            }
            Ok(())
        }
    }

    struct Fixed(f64);

    impl JitterSource for Fixed {
        fn sample(&mut self) -> Option<f64> {
            Some(self.0)
        }
    }

    fn counting(id: Enemy) -> (Counting, Arc<Mutex<Counts>>) {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let behavior = Counting {
            id,
            counts: Arc::clone(&counts),
            chase_after_logic: false,
        };
        (behavior, counts)
    }

    fn interval() -> Duration {
        Duration::from_millis(100)
    }

    fn enter(state: &mut DualCadence<Counting>) {
        let stored = [state.behavior().id];
        let mut transitions = TransitionController::new();
        let mut ctx = StateContext::new(MachineId::new(), stored[0], &stored, &mut transitions);
        State::on_enter(state, &mut ctx).unwrap();
    }

    #[test]
    fn enter_seeds_schedule_from_now_plus_jitter() {
        let clock = Arc::new(ManualClock::starting_at(Duration::from_secs(1)));
        let (behavior, counts) = counting(Enemy::Patrol);
        let mut state = DualCadence::new(behavior, CadenceConfig::new(interval()), clock.clone())
            .with_jitter_source(Fixed(0.25));

        enter(&mut state);

        assert_eq!(state.next_logic_at(), Duration::from_millis(1025));
        assert_eq!(counts.lock().unwrap().enters, 1);
    }

    #[test]
    fn reentry_reseeds_schedule() {
        let clock = Arc::new(ManualClock::new());
        let (behavior, _) = counting(Enemy::Patrol);
        let config = CadenceConfig::new(interval()).without_jitter();
        let mut state = DualCadence::new(behavior, config, clock.clone());

        enter(&mut state);
        assert_eq!(state.next_logic_at(), Duration::ZERO);

        clock.advance(Duration::from_secs(5));
        enter(&mut state);
        assert_eq!(state.next_logic_at(), Duration::from_secs(5));
    }

    #[test]
    fn regular_update_runs_every_tick() {
        let clock = Arc::new(ManualClock::new());
        let (behavior, counts) = counting(Enemy::Patrol);
        let config = CadenceConfig::new(Duration::from_secs(10)).without_jitter();

        let mut machine: StateMachine<Enemy> = StateMachine::new();
        machine
            .add_state(DualCadence::new(behavior, config, clock.clone()))
            .unwrap();
        machine.initialize().unwrap();

        for _ in 0..5 {
            clock.advance(Duration::from_millis(1));
            machine.update().unwrap();
        }

        let counts = counts.lock().unwrap();
        assert_eq!(counts.regular, 5);
        // zero jitter: the first logic tick is due on entry
        assert_eq!(counts.logic, 1);
    }

    #[test]
    fn logic_update_fires_once_per_interval() {
        let clock = Arc::new(ManualClock::new());
        let (behavior, counts) = counting(Enemy::Patrol);
        let config = CadenceConfig::new(interval()).without_jitter();

        let mut machine: StateMachine<Enemy> = StateMachine::new();
        machine
            .add_state(DualCadence::new(behavior, config, clock.clone()))
            .unwrap();
        machine.initialize().unwrap();

        // updates at t = 0, 25, ..., 225ms: logic at 0, 100 and 200
        for _ in 0..10 {
            machine.update().unwrap();
            clock.advance(Duration::from_millis(25));
        }

        let counts = counts.lock().unwrap();
        assert_eq!(counts.regular, 10);
        assert_eq!(counts.logic, 3);
    }

    #[test]
    fn logic_update_waits_for_jittered_start() {
        let clock = Arc::new(ManualClock::new());
        let (behavior, counts) = counting(Enemy::Patrol);
        let state = DualCadence::new(behavior, CadenceConfig::new(interval()), clock.clone())
            .with_jitter_source(Fixed(0.5));

        let mut machine: StateMachine<Enemy> = StateMachine::new();
        machine.add_state(state).unwrap();
        machine.initialize().unwrap();

        clock.advance(Duration::from_millis(49));
        machine.update().unwrap();
        assert_eq!(counts.lock().unwrap().logic, 0);

        clock.advance(Duration::from_millis(1));
        machine.update().unwrap();
        assert_eq!(counts.lock().unwrap().logic, 1);
    }

    #[test]
    fn missed_ticks_are_caught_up() {
        let clock = Arc::new(ManualClock::new());
        let (behavior, counts) = counting(Enemy::Patrol);
        let config = CadenceConfig::new(interval()).without_jitter();

        let mut machine: StateMachine<Enemy> = StateMachine::new();
        machine
            .add_state(DualCadence::new(behavior, config, clock.clone()))
            .unwrap();
        machine.initialize().unwrap();

        // one long frame spanning three intervals
        clock.advance(Duration::from_millis(300));
        for _ in 0..5 {
            machine.update().unwrap();
        }

        // ticks scheduled at 0, 100, 200 and 300 are all due, one per update
        let counts = counts.lock().unwrap();
        assert_eq!(counts.logic, 4);
        assert_eq!(counts.regular, 5);
    }

    #[test]
    fn logic_update_can_request_transition() {
        let clock = Arc::new(ManualClock::new());
        let config = CadenceConfig::new(interval()).without_jitter();
        let (mut patrol, patrol_counts) = counting(Enemy::Patrol);
        patrol.chase_after_logic = true;
        let (chase, chase_counts) = counting(Enemy::Chase);

        let mut machine: StateMachine<Enemy> = StateMachine::new();
        machine
            .add_state(DualCadence::new(patrol, config, clock.clone()))
            .unwrap();
        machine
            .add_state(DualCadence::new(chase, config, clock.clone()))
            .unwrap();
        machine.initialize().unwrap();

        machine.update().unwrap();
        assert_eq!(machine.current_state(), Ok(Enemy::Patrol));

        machine.update().unwrap();
        assert_eq!(machine.current_state(), Ok(Enemy::Chase));
        assert_eq!(patrol_counts.lock().unwrap().exits, 1);
        assert_eq!(chase_counts.lock().unwrap().enters, 1);
        assert_eq!(chase_counts.lock().unwrap().regular, 1);
    }
}
