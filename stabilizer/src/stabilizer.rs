//! The stabilization state machine.
//!
//! DESIGN
//! ======
//! `Stabilizer` is sans-io. It never sleeps or registers listeners; a driver
//! calls [`Stabilizer::stabilize`] once, then [`Stabilizer::tick`] whenever
//! [`Stabilizer::next_delay`] elapses, and [`Stabilizer::on_resize`] after a
//! debounced resize/orientation burst. Every call returns the [`Event`]s it
//! produced so drivers can forward them (overlay reveal, telemetry).
//!
//! A successful apply is never trusted on its own: the AR library restyles
//! its video/canvas after metadata loads, so the transform is re-applied
//! `confirm_passes` more times before the cycle is declared stable.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails. A missing container, surface or metadata keeps the
//! cycle `Pending`; an exhausted attempt budget aborts the cycle and, unless
//! configured otherwise, still reveals the overlay.

#[cfg(test)]
#[path = "stabilizer_test.rs"]
mod stabilizer_test;

use std::fmt;
use std::time::Duration;

use crate::config::StabilizerConfig;
use crate::geometry::{Transform, ViewportSize, compute_transform};
use crate::state::{RevealReason, StabilizationState};
use crate::surface::{Host, MediaSurface, SurfaceStyle};

/// Observable outputs of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    StateChanged { from: StabilizationState, to: StabilizationState },
    /// A style was written to the surface. `pass` 0 is the initial apply,
    /// later passes belong to the confirmation window.
    TransformApplied { style: SurfaceStyle, pass: u32 },
    /// Fires once per cycle that completes its confirmation window.
    Stable { cycle: u32, transform: Transform },
    /// Fires once per cycle that runs out of attempts.
    Aborted { cycle: u32, attempts: u32 },
    /// Fires at most once per stabilizer lifetime.
    OverlayRevealed { reason: RevealReason },
}

/// What an apply attempt was still waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Container,
    Surface,
    Metadata,
}

impl fmt::Display for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Container => "visible container",
            Self::Surface => "media surface",
            Self::Metadata => "media metadata",
        })
    }
}

/// Brings an externally inserted media surface into a centered, correctly
/// scaled state inside the host container.
pub struct Stabilizer<H: Host> {
    host: H,
    config: StabilizerConfig,
    state: StabilizationState,
    cycle: u32,
    attempts: u32,
    confirms_left: u32,
    pass: u32,
    container: Option<ViewportSize>,
    last_style: Option<SurfaceStyle>,
    overlay_revealed: bool,
}

impl<H: Host> Stabilizer<H> {
    #[must_use]
    pub fn new(host: H, config: StabilizerConfig) -> Self {
        Self {
            host,
            config,
            state: StabilizationState::Pending,
            cycle: 0,
            attempts: 0,
            confirms_left: 0,
            pass: 0,
            container: None,
            last_style: None,
            overlay_revealed: false,
        }
    }

    // --- Triggers ---

    /// Start the first stabilization cycle.
    pub fn stabilize(&mut self) -> Vec<Event> {
        self.begin_cycle()
    }

    /// Restart after a (debounced) resize or orientation change.
    ///
    /// Valid in every state: a settled cycle is reopened, an active one is
    /// replaced. The driver must have dropped any timer scheduled for the old
    /// cycle before calling this.
    pub fn on_resize(&mut self) -> Vec<Event> {
        log::debug!("resize during {} (cycle {}), restarting", self.state, self.cycle);
        self.begin_cycle()
    }

    /// Advance the current cycle by one timer tick.
    ///
    /// Ticks outside an active cycle are ignored.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.cycle == 0 {
            return events;
        }
        match self.state {
            StabilizationState::Pending => self.poll(&mut events),
            StabilizationState::Retrying => self.confirm(&mut events),
            StabilizationState::Stable | StabilizationState::Aborted => {}
        }
        events
    }

    // --- Queries ---

    /// Delay until the next tick, or `None` when no timer should run.
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        if self.cycle == 0 {
            return None;
        }
        match self.state {
            StabilizationState::Pending => Some(self.config.poll_interval()),
            StabilizationState::Retrying => Some(self.config.confirm_interval()),
            StabilizationState::Stable | StabilizationState::Aborted => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> StabilizationState {
        self.state
    }

    /// Number of cycles started so far (0 before [`Self::stabilize`]).
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Lookups spent by the current cycle.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Container size seen by the most recent lookup.
    #[must_use]
    pub fn container(&self) -> Option<ViewportSize> {
        self.container
    }

    /// The style most recently written to the surface.
    #[must_use]
    pub fn last_style(&self) -> Option<SurfaceStyle> {
        self.last_style
    }

    #[must_use]
    pub fn overlay_revealed(&self) -> bool {
        self.overlay_revealed
    }

    #[must_use]
    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    // --- Internals ---

    fn begin_cycle(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.cycle += 1;
        self.attempts = 0;
        self.confirms_left = 0;
        self.pass = 0;
        self.container = self.host.container_size();
        self.transition(StabilizationState::Pending, &mut events);
        log::debug!("cycle {} started, container {:?}", self.cycle, self.container);
        events
    }

    fn poll(&mut self, events: &mut Vec<Event>) {
        self.attempts += 1;
        match self.apply() {
            Ok(style) => {
                self.pass = 0;
                events.push(Event::TransformApplied { style, pass: 0 });
                if self.config.confirm_passes == 0 {
                    self.settle_stable(style, events);
                } else {
                    self.confirms_left = self.config.confirm_passes;
                    self.transition(StabilizationState::Retrying, events);
                }
            }
            Err(wait) => {
                log::debug!("cycle {} attempt {}: waiting for {wait}", self.cycle, self.attempts);
                if self.attempts >= self.config.max_attempts {
                    self.abort(events);
                }
            }
        }
    }

    fn confirm(&mut self, events: &mut Vec<Event>) {
        match self.apply() {
            Ok(style) => {
                self.pass += 1;
                self.confirms_left = self.confirms_left.saturating_sub(1);
                events.push(Event::TransformApplied { style, pass: self.pass });
                if self.confirms_left == 0 {
                    self.settle_stable(style, events);
                }
            }
            Err(wait) => {
                log::debug!("cycle {} lost {wait} during confirmation", self.cycle);
                self.transition(StabilizationState::Pending, events);
                if self.attempts >= self.config.max_attempts {
                    self.abort(events);
                }
            }
        }
    }

    /// Look up container, surface and metadata; write the fitted style.
    fn apply(&mut self) -> Result<SurfaceStyle, Wait> {
        let container = self.host.container_size();
        self.container = container;
        let container = container.ok_or(Wait::Container)?;
        let surface = self.host.find_surface().ok_or(Wait::Surface)?;
        let natural = surface.natural_size().ok_or(Wait::Metadata)?;

        if !self.host.invoke_library_resize() {
            log::trace!("no library resize hook, patching styles directly");
        }

        let fit = self.config.fit_mode;
        let style = SurfaceStyle::new(fit, compute_transform(fit, natural, container));
        surface.apply_style(&style);
        self.last_style = Some(style);
        Ok(style)
    }

    fn settle_stable(&mut self, style: SurfaceStyle, events: &mut Vec<Event>) {
        self.transition(StabilizationState::Stable, events);
        events.push(Event::Stable { cycle: self.cycle, transform: style.transform });
        self.reveal(RevealReason::Stable, events);
    }

    fn abort(&mut self, events: &mut Vec<Event>) {
        log::warn!(
            "cycle {} gave up after {} attempts, feed never stabilized",
            self.cycle,
            self.attempts
        );
        self.transition(StabilizationState::Aborted, events);
        events.push(Event::Aborted { cycle: self.cycle, attempts: self.attempts });
        if self.config.reveal_on_abort {
            self.reveal(RevealReason::Fallback, events);
        }
    }

    fn reveal(&mut self, reason: RevealReason, events: &mut Vec<Event>) {
        if self.overlay_revealed {
            return;
        }
        self.overlay_revealed = true;
        events.push(Event::OverlayRevealed { reason });
    }

    fn transition(&mut self, to: StabilizationState, events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        log::debug!("cycle {}: {from} -> {to}", self.cycle);
        events.push(Event::StateChanged { from, to });
    }
}
