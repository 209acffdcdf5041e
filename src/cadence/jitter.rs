//! Randomness sources for staggering logic ticks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Supplies uniform samples in `[0, 1)`.
///
/// `None` means no randomness is available; callers fall back to zero
/// jitter.
pub trait JitterSource: Send {
    fn sample(&mut self) -> Option<f64>;
}

/// Samples from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&mut self) -> Option<f64> {
        Some(rand::thread_rng().gen::<f64>())
    }
}

/// Deterministic samples from a seeded ChaCha stream, for replays.
#[derive(Clone, Debug)]
pub struct SeededJitter {
    rng: ChaCha8Rng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl JitterSource for SeededJitter {
    fn sample(&mut self) -> Option<f64> {
        Some(self.rng.gen::<f64>())
    }
}

/// No randomness: every instance fires in phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&mut self) -> Option<f64> {
        None
    }
}

/// Offset in `[0, interval)` for the first logic tick.
///
/// Missing or out-of-range samples give zero.
pub(crate) fn jitter_offset(source: &mut dyn JitterSource, interval: Duration) -> Duration {
    match source.sample() {
        Some(sample) if (0.0..1.0).contains(&sample) => interval
            .mul_f64(sample)
            .min(interval.saturating_sub(Duration::from_nanos(1))),
        Some(sample) => {
            tracing::warn!(sample, "jitter sample outside [0, 1), using zero jitter");
            Duration::ZERO
        }
        None => Duration::ZERO,
    }
}
