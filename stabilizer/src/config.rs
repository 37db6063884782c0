//! Stabilizer configuration.
//!
//! The browser host hands this over as a JSON object (camelCase keys, every
//! field optional); native hosts build it directly or from the environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CONFIRM_INTERVAL_MS, DEFAULT_CONFIRM_PASSES, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RESIZE_DEBOUNCE_MS,
};
use crate::geometry::FitMode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Retry cadence, give-up threshold and fit behavior for one stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StabilizerConfig {
    /// Requested fit of the feed inside the container.
    pub fit_mode: FitMode,
    /// Delay between lookups while `Pending`.
    pub poll_interval_ms: u64,
    /// Lookups per cycle before the cycle is aborted.
    pub max_attempts: u32,
    /// Re-applications after the first successful apply.
    pub confirm_passes: u32,
    /// Delay between re-applications while `Retrying`.
    pub confirm_interval_ms: u64,
    /// Quiet period that collapses a burst of resize events into one restart.
    pub resize_debounce_ms: u64,
    /// Reveal the overlay when a cycle aborts instead of leaving it hidden.
    pub reveal_on_abort: bool,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            confirm_passes: DEFAULT_CONFIRM_PASSES,
            confirm_interval_ms: DEFAULT_CONFIRM_INTERVAL_MS,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            reveal_on_abort: true,
        }
    }
}

impl StabilizerConfig {
    /// Parse and validate a JSON config object.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value fails [`Self::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would spin a timer at zero delay or abort immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Zero { field: "pollIntervalMs" });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero { field: "maxAttempts" });
        }
        if self.confirm_passes > 0 && self.confirm_interval_ms == 0 {
            return Err(ConfigError::Zero { field: "confirmIntervalMs" });
        }
        Ok(())
    }

    /// `self` if it validates, otherwise the defaults (with a warning).
    #[must_use]
    pub fn or_default_if_invalid(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                log::warn!("invalid stabilizer config, using defaults: {err}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn confirm_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_interval_ms)
    }

    #[must_use]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}
