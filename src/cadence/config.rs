//! Configuration of the throttled logic cadence.

use crate::builder::BuildError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time between two logic ticks.
pub const DEFAULT_LOGIC_INTERVAL: Duration = Duration::from_millis(250);

/// Settings for a [`DualCadence`](super::DualCadence) state.
///
/// Serializable so hosts can embed it in their own configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Time between two logic ticks.
    pub interval: Duration,
    /// Randomly phase the first logic tick within one interval.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_jitter() -> bool {
    true
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_LOGIC_INTERVAL,
            jitter: true,
        }
    }
}

impl CadenceConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter: true,
        }
    }

    /// Build from an interval in seconds, as game settings usually store it.
    ///
    /// Negative, NaN, infinite, overflowing or zero values are rejected.
    pub fn from_secs_f32(seconds: f32) -> Result<Self, BuildError> {
        let config = Duration::try_from_secs_f32(seconds)
            .map(Self::new)
            .map_err(|_| BuildError::InvalidInterval { seconds })?;
        config.validate()?;
        Ok(config)
    }

    /// Check a config built by hand or deserialized from a host file.
    ///
    /// The interval must be non-zero.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.interval.is_zero() {
            return Err(BuildError::InvalidInterval {
                seconds: self.interval.as_secs_f32(),
            });
        }
        Ok(())
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CadenceConfig::default();
        assert_eq!(config.interval, Duration::from_millis(250));
        assert!(config.jitter);
    }

    #[test]
    fn from_secs_accepts_valid_interval() {
        let config = CadenceConfig::from_secs_f32(0.5).unwrap();
        assert_eq!(config.interval, Duration::from_millis(500));
    }

    #[test]
    fn from_secs_rejects_invalid_interval() {
        assert!(matches!(
            CadenceConfig::from_secs_f32(-1.0),
            Err(BuildError::InvalidInterval { .. })
        ));
        assert!(CadenceConfig::from_secs_f32(f32::NAN).is_err());
        assert!(CadenceConfig::from_secs_f32(f32::INFINITY).is_err());
    }

    #[test]
    fn from_secs_rejects_zero_interval() {
        assert_eq!(
            CadenceConfig::from_secs_f32(0.0),
            Err(BuildError::InvalidInterval { seconds: 0.0 })
        );
    }

    #[test]
    fn validate_accepts_default() {
        assert!(CadenceConfig::default().validate().is_ok());
        assert!(CadenceConfig::new(Duration::from_nanos(1)).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_interval_from_file() {
        let json = r#"{"interval":{"secs":0,"nanos":0},"jitter":false}"#;
        let config: CadenceConfig = serde_json::from_str(json).unwrap();

        assert!(matches!(
            config.validate(),
            Err(BuildError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn without_jitter_disables_phase_offset() {
        let config = CadenceConfig::default().without_jitter();
        assert!(!config.jitter);
    }

    #[test]
    fn jitter_defaults_on_when_missing() {
        let json = r#"{"interval":{"secs":1,"nanos":0}}"#;
        let config: CadenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert!(config.jitter);
    }
}
