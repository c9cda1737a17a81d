//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Trainer configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Delay between starting a session and the patient's greeting.
    pub greeting_delay: Duration,
    /// Delay between a trainee message and the patient's reply.
    pub response_delay: Duration,
    /// Trainee message count that counts as a complete session (100% progress).
    pub progress_target: u32,
    /// Directory transcript reports are written into.
    pub report_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            greeting_delay: Duration::from_millis(1000),
            response_delay: Duration::from_millis(1500),
            progress_target: 20,
            report_dir: PathBuf::from("."),
        }
    }
}

impl TrainerConfig {
    /// Build config from environment variables, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let greeting_delay = std::env::var("THERAPY_TRAINER_GREETING_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.greeting_delay);

        let response_delay = std::env::var("THERAPY_TRAINER_RESPONSE_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.response_delay);

        let progress_target: u32 = std::env::var("THERAPY_TRAINER_PROGRESS_TARGET")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.progress_target);

        let report_dir = std::env::var("THERAPY_TRAINER_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.report_dir);

        Self {
            greeting_delay,
            response_delay,
            progress_target,
            report_dir,
        }
    }

    /// Reject settings the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_target == 0 {
            return Err(ConfigError::InvalidValue {
                key: "progress_target".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Config with no artificial latency, for tests and scripted runs.
    pub fn instant() -> Self {
        Self {
            greeting_delay: Duration::ZERO,
            response_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
