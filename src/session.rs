//! Session driver: runs a [`Stabilizer`] on a tokio task.
//!
//! DESIGN
//! ======
//! One task owns the state machine. It waits on three things at once: the
//! command channel, the pending tick deadline and the pending resize
//! deadline. A resize command cancels the tick and (re)arms the debounce;
//! only when the burst goes quiet does the cycle restart. Teardown, or
//! dropping the handle, ends the task before any further style write.
//!
//! ERROR HANDLING
//! ==============
//! The state machine cannot fail. Event delivery is best-effort: once the
//! handle stops reading, events are dropped and the task keeps running until
//! its command channel closes.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::future;

use stabilizer::stabilizer::{Event, Stabilizer};
use stabilizer::state::StabilizationState;
use stabilizer::surface::Host;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Resize,
    Teardown,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session task has stopped")]
    Closed,
    #[error("session task failed: {0}")]
    Join(#[from] JoinError),
}

/// Final state reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub cycles: u32,
    pub final_state: StabilizationState,
    pub overlay_revealed: bool,
}

/// Caller side of a running session.
pub struct SessionHandle {
    commands: UnboundedSender<Command>,
    events: UnboundedReceiver<Event>,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Report a resize or orientation change. Bursts are debounced.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the task has already ended.
    pub fn resize(&self) -> Result<(), SessionError> {
        self.commands.send(Command::Resize).map_err(|_| SessionError::Closed)
    }

    /// Next event, or `None` once the task has ended and the queue is drained.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Next already-queued event, without waiting.
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Wait for the current cycle to end, returning its `Stable` or
    /// `Aborted` event. Other events are consumed along the way.
    pub async fn settled(&mut self) -> Option<Event> {
        while let Some(event) = self.next_event().await {
            if matches!(event, Event::Stable { .. } | Event::Aborted { .. }) {
                return Some(event);
            }
        }
        None
    }

    /// Stop the session and wait for the task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Join`] if the task panicked or was cancelled.
    pub async fn teardown(self) -> Result<SessionSummary, SessionError> {
        if self.commands.send(Command::Teardown).is_err() {
            debug!("session already stopped before teardown");
        }
        Ok(self.task.await?)
    }
}

/// Start `stabilizer` on a new task and return its handle.
///
/// Must be called from within a tokio runtime.
pub fn spawn<H>(stabilizer: Stabilizer<H>) -> SessionHandle
where
    H: Host + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(stabilizer, command_rx, event_tx));
    SessionHandle { commands: command_tx, events: event_rx, task }
}

async fn run<H: Host>(
    mut stabilizer: Stabilizer<H>,
    mut commands: UnboundedReceiver<Command>,
    events: UnboundedSender<Event>,
) -> SessionSummary {
    let debounce = stabilizer.config().resize_debounce();
    info!(
        fit_mode = stabilizer.config().fit_mode.css_value(),
        poll_interval_ms = stabilizer.config().poll_interval_ms,
        max_attempts = stabilizer.config().max_attempts,
        confirm_passes = stabilizer.config().confirm_passes,
        "session started"
    );

    forward(&events, stabilizer.stabilize());
    let mut tick_at = deadline(stabilizer.next_delay());
    let mut restart_at: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(Command::Resize) => {
                    tick_at = None;
                    restart_at = Some(Instant::now() + debounce);
                }
                Some(Command::Teardown) | None => break,
            },
            () = sleep_until(restart_at) => {
                restart_at = None;
                forward(&events, stabilizer.on_resize());
                tick_at = deadline(stabilizer.next_delay());
            }
            () = sleep_until(tick_at) => {
                forward(&events, stabilizer.tick());
                tick_at = deadline(stabilizer.next_delay());
            }
        }
    }

    let summary = SessionSummary {
        cycles: stabilizer.cycle(),
        final_state: stabilizer.state(),
        overlay_revealed: stabilizer.overlay_revealed(),
    };
    info!(
        cycles = summary.cycles,
        state = %summary.final_state,
        overlay_revealed = summary.overlay_revealed,
        "session ended"
    );
    summary
}

fn deadline(delay: Option<Duration>) -> Option<Instant> {
    delay.map(|d| Instant::now() + d)
}

/// Sleep until `at`, or forever when there is nothing scheduled.
async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => future::pending().await,
    }
}

fn forward(tx: &UnboundedSender<Event>, batch: Vec<Event>) {
    for event in batch {
        match event {
            Event::Stable { cycle, transform } => {
                info!(
                    cycle,
                    width = transform.width,
                    height = transform.height,
                    left = transform.left,
                    top = transform.top,
                    "viewport stable"
                );
            }
            Event::Aborted { cycle, attempts } => warn!(cycle, attempts, "stabilization aborted"),
            Event::OverlayRevealed { reason } => info!(?reason, "overlay revealed"),
            Event::StateChanged { from, to } => debug!(%from, %to, "state changed"),
            Event::TransformApplied { style, pass } => debug!(pass, css = %style.css_text(), "transform applied"),
        }
        if tx.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}
