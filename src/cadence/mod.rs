//! Dual-cadence states for AI behavior.
//!
//! A [`DualCadence`] state runs a cheap update on every machine tick and a
//! heavier logic update on a throttled, randomly phased schedule. Time and
//! randomness are injected: a [`Clock`] shared by the host and a
//! [`JitterSource`] owned by each state.

mod clock;
mod config;
mod jitter;
mod state;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use config::{CadenceConfig, DEFAULT_LOGIC_INTERVAL};
pub use jitter::{JitterSource, NoJitter, SeededJitter, ThreadRngJitter};
pub use state::{CadenceBehavior, DualCadence};
