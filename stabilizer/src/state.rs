//! Stabilization states and the reasons the overlay can be revealed.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::fmt;

/// Where the current stabilization cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StabilizationState {
    /// Polling for the surface, its metadata, or a visible container.
    #[default]
    Pending,
    /// A transform has been applied; re-applying it through the confirmation
    /// window because the library restyles its elements after load.
    Retrying,
    /// Confirmation window completed. No timers run until the next resize.
    Stable,
    /// Attempt budget ran out for this cycle. A resize starts a new one.
    Aborted,
}

impl StabilizationState {
    /// Whether a driver should keep a timer scheduled in this state.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Retrying)
    }

    /// Whether the current cycle has finished, successfully or not.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Stable | Self::Aborted)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Retrying => "retrying",
            Self::Stable => "stable",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StabilizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the scanning overlay was made visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealReason {
    /// The feed was fitted and survived the confirmation window.
    Stable,
    /// The feed never stabilized; revealed anyway so scanning is not blocked.
    Fallback,
}
