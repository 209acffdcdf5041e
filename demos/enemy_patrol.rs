//! Enemy Patrol AI
//!
//! Two enemies patrol their paths, one back and forth and one in a loop.
//! Each chases the player once it spots them and investigates the last known
//! position after losing sight of them.
//!
//! Key concepts:
//! - `DualCadence` states: movement every frame, perception on a throttled tick
//! - Jittered logic ticks so many enemies do not think on the same frame
//! - A fixed-step `ManualClock` driving the whole simulation
//! - Shared blackboard data read by every state of one enemy
//!
//! Run with: cargo run --example enemy_patrol
//! Set `RUST_LOG=cadence_fsm=trace` to see every logic tick.

use cadence_fsm::cadence::{
    CadenceBehavior, CadenceConfig, DualCadence, ManualClock, SeededJitter, SharedClock,
};
use cadence_fsm::core::{FsmError, StateContext};
use cadence_fsm::fsm::StateMachine;
use cadence_fsm::state_id;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(33);
const FRAMES: usize = 600;
const ENEMY_SPEED: f32 = 2.0;
const SIGHT_RANGE: f32 = 4.0;
const ARRIVAL_RADIUS: f32 = 0.1;
const INVESTIGATE_TICKS: u32 = 8;

state_id! {
    enum Enemy {
        FollowTask,
        ChasePlayer,
        InvestigateLocation,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl Vec2 {
    const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Move towards `target` by at most `max_step`.
    fn step_towards(self, target: Vec2, max_step: f32) -> Vec2 {
        let distance = self.distance(target);
        if distance <= max_step || distance == 0.0 {
            return target;
        }
        let t = max_step / distance;
        Vec2::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TraversalMode {
    Circular,
    BackAndForth,
}

/// A loop or line of waypoints an enemy walks along.
#[derive(Clone, Debug)]
struct MovementPath {
    mode: TraversalMode,
    locations: Vec<Vec2>,
    last_index: usize,
    moving_forward: bool,
}

impl MovementPath {
    /// A path needs at least two locations to be traversable.
    fn new(mode: TraversalMode, locations: Vec<Vec2>) -> Option<Self> {
        if locations.len() < 2 {
            tracing::error!("movement path needs at least 2 locations");
            return None;
        }
        Some(Self {
            mode,
            locations,
            last_index: 0,
            moving_forward: true,
        })
    }

    /// Closest waypoint to `position`; traversal continues from there.
    fn closest_starting_location(&mut self, position: Vec2) -> Vec2 {
        let mut closest = 0;
        for (index, location) in self.locations.iter().enumerate().skip(1) {
            if position.distance(*location) < position.distance(self.locations[closest]) {
                closest = index;
            }
        }
        self.last_index = closest;
        self.locations[closest]
    }

    fn next_location(&mut self) -> Vec2 {
        let count = self.locations.len();
        let next = match self.mode {
            TraversalMode::Circular => (self.last_index + 1) % count,
            TraversalMode::BackAndForth if self.moving_forward => {
                if self.last_index + 1 >= count {
                    self.moving_forward = false;
                    count - 2
                } else {
                    self.last_index + 1
                }
            }
            TraversalMode::BackAndForth => {
                if self.last_index == 0 {
                    self.moving_forward = true;
                    1
                } else {
                    self.last_index - 1
                }
            }
        };
        self.last_index = next;
        self.locations[next]
    }
}

/// World state one enemy's states share.
#[derive(Debug, Default)]
struct Blackboard {
    position: Vec2,
    player: Vec2,
    last_seen_player: Option<Vec2>,
}

impl Blackboard {
    fn player_visible(&self) -> bool {
        self.position.distance(self.player) <= SIGHT_RANGE
    }
}

#[derive(Clone, Default)]
struct SharedBlackboard(Arc<Mutex<Blackboard>>);

impl SharedBlackboard {
    fn lock(&self) -> MutexGuard<'_, Blackboard> {
        // A poisoned blackboard still holds usable positions.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn advance(&self, target: Vec2, dt: f32) -> Vec2 {
        let mut board = self.lock();
        board.position = board.position.step_towards(target, ENEMY_SPEED * dt);
        board.position
    }
}

struct FollowTask {
    board: SharedBlackboard,
    path: MovementPath,
    target: Vec2,
}

impl CadenceBehavior<Enemy> for FollowTask {
    fn id(&self) -> Enemy {
        Enemy::FollowTask
    }

    fn on_state_enter(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        let position = self.board.lock().position;
        self.target = self.path.closest_starting_location(position);
        println!("patrol: heading to {:?}", self.target);
        Ok(())
    }

    fn regular_update(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        let position = self.board.advance(self.target, FRAME.as_secs_f32());
        if position.distance(self.target) <= ARRIVAL_RADIUS {
            self.target = self.path.next_location();
        }
        Ok(())
    }

    fn logic_update(&mut self, ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        let mut board = self.board.lock();
        if board.player_visible() {
            board.last_seen_player = Some(board.player);
            drop(board);
            ctx.request_state(Enemy::ChasePlayer)?;
        }
        Ok(())
    }
}

struct ChasePlayer {
    board: SharedBlackboard,
}

impl CadenceBehavior<Enemy> for ChasePlayer {
    fn id(&self) -> Enemy {
        Enemy::ChasePlayer
    }

    fn on_state_enter(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        println!("chase: player spotted");
        Ok(())
    }

    fn regular_update(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        let target = {
            let board = self.board.lock();
            board.last_seen_player.unwrap_or(board.position)
        };
        self.board.advance(target, FRAME.as_secs_f32());
        Ok(())
    }

    fn logic_update(&mut self, ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        let mut board = self.board.lock();
        if board.player_visible() {
            board.last_seen_player = Some(board.player);
        } else {
            drop(board);
            ctx.request_state(Enemy::InvestigateLocation)?;
        }
        Ok(())
    }
}

struct InvestigateLocation {
    board: SharedBlackboard,
    ticks_searched: u32,
}

impl CadenceBehavior<Enemy> for InvestigateLocation {
    fn id(&self) -> Enemy {
        Enemy::InvestigateLocation
    }

    fn on_state_enter(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        self.ticks_searched = 0;
        println!(
            "investigate: lost sight, searching {:?}",
            self.board.lock().last_seen_player
        );
        Ok(())
    }

    fn on_state_exit(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        self.board.lock().last_seen_player = None;
        Ok(())
    }

    fn regular_update(&mut self, _ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        let target = {
            let board = self.board.lock();
            board.last_seen_player.unwrap_or(board.position)
        };
        self.board.advance(target, FRAME.as_secs_f32());
        Ok(())
    }

    fn logic_update(&mut self, ctx: &mut StateContext<'_, Enemy>) -> Result<(), FsmError> {
        if self.board.lock().player_visible() {
            return ctx.request_state(Enemy::ChasePlayer);
        }
        self.ticks_searched += 1;
        if self.ticks_searched >= INVESTIGATE_TICKS {
            println!("investigate: giving up");
            ctx.request_state(Enemy::FollowTask)?;
        }
        Ok(())
    }
}

/// The player walks back and forth along the x axis, passing the patrol.
fn player_position(elapsed: Duration) -> Vec2 {
    let phase = (elapsed.as_secs_f32() / 10.0) % 2.0;
    let x = if phase < 1.0 { phase } else { 2.0 - phase };
    Vec2::new(-12.0 + 24.0 * x, 6.0)
}

/// One enemy's machine plus the blackboard its states share.
struct Patroller {
    machine: StateMachine<Enemy>,
    board: SharedBlackboard,
    last: Enemy,
}

impl Patroller {
    fn spawn(
        label: &str,
        path: MovementPath,
        start: Vec2,
        clock: &SharedClock,
        config: CadenceConfig,
        seed: u64,
    ) -> Result<Self, FsmError> {
        let board = SharedBlackboard::default();
        board.lock().position = start;

        let follow = FollowTask {
            board: board.clone(),
            path,
            target: Vec2::default(),
        };
        let chase = ChasePlayer {
            board: board.clone(),
        };
        let investigate = InvestigateLocation {
            board: board.clone(),
            ticks_searched: 0,
        };

        let mut machine = StateMachine::with_label(label);
        machine.add_state(
            DualCadence::new(follow, config, clock.clone())
                .with_jitter_source(SeededJitter::new(seed)),
        )?;
        machine.add_state(
            DualCadence::new(chase, config, clock.clone())
                .with_jitter_source(SeededJitter::new(seed.wrapping_add(1))),
        )?;
        machine.add_state(
            DualCadence::new(investigate, config, clock.clone())
                .with_jitter_source(SeededJitter::new(seed.wrapping_add(2))),
        )?;
        machine.initialize()?;
        let last = machine.current_state()?;

        Ok(Self {
            machine,
            board,
            last,
        })
    }

    fn update(&mut self, frame: usize, player: Vec2) -> Result<(), FsmError> {
        self.board.lock().player = player;
        self.machine.update()?;

        let current = self.machine.current_state()?;
        if current != self.last {
            let position = self.board.lock().position;
            println!(
                "frame {frame:>3} {}: {:?} -> {current:?} at ({:.1}, {:.1})",
                self.machine.label().unwrap_or("enemy"),
                self.last,
                position.x,
                position.y
            );
            self.last = current;
        }
        Ok(())
    }
}

fn run() -> Result<(), FsmError> {
    let clock = Arc::new(ManualClock::new());
    let shared: SharedClock = clock.clone();
    let config = CadenceConfig::new(Duration::from_millis(200));

    let line = MovementPath::new(
        TraversalMode::BackAndForth,
        vec![
            Vec2::new(-6.0, 0.0),
            Vec2::new(0.0, 3.0),
            Vec2::new(6.0, 0.0),
        ],
    )
    .ok_or(FsmError::InitializationFailed)?;
    let ring = MovementPath::new(
        TraversalMode::Circular,
        vec![
            Vec2::new(4.0, -4.0),
            Vec2::new(8.0, -4.0),
            Vec2::new(8.0, 2.0),
            Vec2::new(4.0, 2.0),
        ],
    )
    .ok_or(FsmError::InitializationFailed)?;

    let mut enemies = vec![
        Patroller::spawn("enemy-01", line, Vec2::new(-5.0, 0.5), &shared, config, 7)?,
        Patroller::spawn("enemy-02", ring, Vec2::new(5.0, -3.5), &shared, config, 19)?,
    ];

    let mut elapsed = Duration::ZERO;
    for frame in 0..FRAMES {
        clock.advance(FRAME);
        elapsed += FRAME;
        let player = player_position(elapsed);
        for enemy in &mut enemies {
            enemy.update(frame, player)?;
        }
    }

    for enemy in &enemies {
        println!("final status: {:?}", enemy.machine.status());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("enemy AI error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(count: usize) -> Vec<Vec2> {
        (0..count).map(|i| Vec2::new(i as f32, 0.0)).collect()
    }

    fn indices(path: &mut MovementPath, steps: usize) -> Vec<usize> {
        (0..steps).map(|_| path.next_location().x as usize).collect()
    }

    #[test]
    fn path_requires_two_locations() {
        assert!(MovementPath::new(TraversalMode::Circular, points(1)).is_none());
        assert!(MovementPath::new(TraversalMode::Circular, points(2)).is_some());
    }

    #[test]
    fn circular_path_wraps_around() {
        let mut path = MovementPath::new(TraversalMode::Circular, points(3)).unwrap();
        assert_eq!(indices(&mut path, 5), vec![1, 2, 0, 1, 2]);
    }

    #[test]
    fn back_and_forth_path_turns_at_both_ends() {
        let mut path = MovementPath::new(TraversalMode::BackAndForth, points(3)).unwrap();
        assert_eq!(indices(&mut path, 6), vec![1, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn traversal_continues_from_closest_location() {
        let mut path = MovementPath::new(TraversalMode::Circular, points(4)).unwrap();
        let start = path.closest_starting_location(Vec2::new(2.2, 1.0));
        assert_eq!(start, Vec2::new(2.0, 0.0));
        assert_eq!(path.next_location(), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn circular_patroller_walks_its_loop() {
        let clock = Arc::new(ManualClock::new());
        let shared: SharedClock = clock.clone();
        let ring = MovementPath::new(TraversalMode::Circular, points(3)).unwrap();
        let config = CadenceConfig::new(Duration::from_millis(200));
        let mut enemy =
            Patroller::spawn("ring", ring, Vec2::new(0.0, 0.0), &shared, config, 3).unwrap();
        let far_away = Vec2::new(100.0, 100.0);

        for frame in 0..60 {
            clock.advance(FRAME);
            enemy.update(frame, far_away).unwrap();
        }

        assert_eq!(enemy.machine.current_state().unwrap(), Enemy::FollowTask);
        assert_ne!(enemy.board.lock().position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn step_towards_stops_at_target() {
        let from = Vec2::new(0.0, 0.0);
        let target = Vec2::new(3.0, 4.0);
        assert_eq!(from.step_towards(target, 10.0), target);
        assert_eq!(from.step_towards(target, 2.5), Vec2::new(1.5, 2.0));
    }
}
