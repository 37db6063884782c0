//! Environment configuration for the native host.
//!
//! Every knob has a default; unparsable values are logged and ignored rather
//! than failing startup. Parsing goes through a lookup function so tests can
//! supply a map instead of mutating the process environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use stabilizer::config::StabilizerConfig;
use stabilizer::geometry::{Size, ViewportSize};
use tracing::warn;

const DEFAULT_SIM_SURFACE_DELAY_POLLS: u32 = 3;
const DEFAULT_SIM_METADATA_DELAY_POLLS: u32 = 2;
const DEFAULT_SIM_NATURAL_WIDTH: u32 = 1280;
const DEFAULT_SIM_NATURAL_HEIGHT: u32 = 720;
const DEFAULT_SIM_CONTAINER_WIDTH: u32 = 390;
const DEFAULT_SIM_CONTAINER_HEIGHT: u32 = 844;

/// Parse `key` through `lookup`, falling back to `default` when the key is
/// unset or unparsable.
fn lookup_parse<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    if let Ok(value) = raw.parse::<T>() {
        value
    } else {
        warn!(key, value = %raw, "ignoring unparsable config value");
        default
    }
}

/// Stabilizer settings from `STABILIZER_*` environment variables.
#[must_use]
pub fn stabilizer_config_from_env() -> StabilizerConfig {
    stabilizer_config_from_lookup(|k| std::env::var(k).ok())
}

/// Stabilizer settings from an arbitrary key lookup.
///
/// A combination that fails validation (e.g. a zero poll interval) is
/// replaced wholesale by the defaults.
#[must_use]
pub fn stabilizer_config_from_lookup<F>(lookup: F) -> StabilizerConfig
where
    F: Fn(&str) -> Option<String>,
{
    let d = StabilizerConfig::default();
    let config = StabilizerConfig {
        fit_mode: lookup_parse(&lookup, "STABILIZER_FIT_MODE", d.fit_mode),
        poll_interval_ms: lookup_parse(&lookup, "STABILIZER_POLL_INTERVAL_MS", d.poll_interval_ms),
        max_attempts: lookup_parse(&lookup, "STABILIZER_MAX_ATTEMPTS", d.max_attempts),
        confirm_passes: lookup_parse(&lookup, "STABILIZER_CONFIRM_PASSES", d.confirm_passes),
        confirm_interval_ms: lookup_parse(&lookup, "STABILIZER_CONFIRM_INTERVAL_MS", d.confirm_interval_ms),
        resize_debounce_ms: lookup_parse(&lookup, "STABILIZER_RESIZE_DEBOUNCE_MS", d.resize_debounce_ms),
        reveal_on_abort: lookup_parse(&lookup, "STABILIZER_REVEAL_ON_ABORT", d.reveal_on_abort),
    };
    if let Err(err) = config.validate() {
        warn!(error = %err, "invalid stabilizer config; using defaults");
        return d;
    }
    config
}

/// Knobs for the simulated camera host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Polls before the library "inserts" its video element.
    pub surface_delay_polls: u32,
    /// Further polls before the video reports its intrinsic size.
    pub metadata_delay_polls: u32,
    pub natural_width: u32,
    pub natural_height: u32,
    pub container_width: u32,
    pub container_height: u32,
    /// Whether the fake library re-asserts its own style on every lookup.
    pub adversarial: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            surface_delay_polls: DEFAULT_SIM_SURFACE_DELAY_POLLS,
            metadata_delay_polls: DEFAULT_SIM_METADATA_DELAY_POLLS,
            natural_width: DEFAULT_SIM_NATURAL_WIDTH,
            natural_height: DEFAULT_SIM_NATURAL_HEIGHT,
            container_width: DEFAULT_SIM_CONTAINER_WIDTH,
            container_height: DEFAULT_SIM_CONTAINER_HEIGHT,
            adversarial: true,
        }
    }
}

impl SimConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            surface_delay_polls: lookup_parse(&lookup, "SIM_SURFACE_DELAY_POLLS", d.surface_delay_polls),
            metadata_delay_polls: lookup_parse(&lookup, "SIM_METADATA_DELAY_POLLS", d.metadata_delay_polls),
            natural_width: lookup_parse(&lookup, "SIM_NATURAL_WIDTH", d.natural_width),
            natural_height: lookup_parse(&lookup, "SIM_NATURAL_HEIGHT", d.natural_height),
            container_width: lookup_parse(&lookup, "SIM_CONTAINER_WIDTH", d.container_width),
            container_height: lookup_parse(&lookup, "SIM_CONTAINER_HEIGHT", d.container_height),
            adversarial: lookup_parse(&lookup, "SIM_ADVERSARIAL", d.adversarial),
        }
    }

    /// `None` when either container dimension is zero (hidden container).
    #[must_use]
    pub fn container(&self) -> Option<ViewportSize> {
        Size::new(self.container_width, self.container_height)
    }

    /// The container after a device rotation.
    #[must_use]
    pub fn rotated_container(&self) -> Option<ViewportSize> {
        Size::new(self.container_height, self.container_width)
    }
}
