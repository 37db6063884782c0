//! Simulated camera host.
//!
//! Mimics the AR library's behavior around its media element: the video is
//! inserted a few polls after mount, reports its intrinsic size a few polls
//! later, and (when adversarial) the library re-asserts its own inline style
//! every time the element is looked up. Every style write is recorded.

#[cfg(test)]
#[path = "sim_test.rs"]
mod sim_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stabilizer::geometry::{FitMode, NaturalSize, Size, Transform, ViewportSize};
use stabilizer::surface::{Host, MediaSurface, SurfaceStyle};

use crate::config::SimConfig;

struct SimState {
    lookups: u32,
    surface_after: u32,
    metadata_after: u32,
    natural: Option<NaturalSize>,
    container: Option<ViewportSize>,
    adversarial: bool,
    removed: bool,
    current: Option<SurfaceStyle>,
    applied: Vec<SurfaceStyle>,
    library_restyles: u32,
}

/// Shared handle; clones observe the same simulated page.
#[derive(Clone)]
pub struct SimulatedHost {
    inner: Arc<Mutex<SimState>>,
}

impl SimulatedHost {
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimState {
                lookups: 0,
                surface_after: config.surface_delay_polls,
                metadata_after: config.metadata_delay_polls,
                natural: Size::new(config.natural_width, config.natural_height),
                container: config.container(),
                adversarial: config.adversarial,
                removed: false,
                current: None,
                applied: Vec::new(),
                library_restyles: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate a resize of the host container (`None` hides it).
    pub fn set_container(&self, container: Option<ViewportSize>) {
        self.lock().container = container;
    }

    /// Simulate the library tearing its video element out of the page.
    pub fn remove_surface(&self) {
        self.lock().removed = true;
    }

    /// Undo [`Self::remove_surface`].
    pub fn restore_surface(&self) {
        self.lock().removed = false;
    }

    /// Number of styles written by the stabilizer.
    #[must_use]
    pub fn apply_count(&self) -> usize {
        self.lock().applied.len()
    }

    /// Every style the stabilizer wrote, oldest first.
    #[must_use]
    pub fn applied(&self) -> Vec<SurfaceStyle> {
        self.lock().applied.clone()
    }

    /// The element's current inline style, whoever wrote it last.
    #[must_use]
    pub fn current_style(&self) -> Option<SurfaceStyle> {
        self.lock().current
    }

    /// How often the fake library overwrote the element's style.
    #[must_use]
    pub fn library_restyles(&self) -> u32 {
        self.lock().library_restyles
    }

    #[must_use]
    pub fn lookups(&self) -> u32 {
        self.lock().lookups
    }
}

impl SimState {
    fn surface_present(&self) -> bool {
        !self.removed && self.lookups > self.surface_after
    }

    fn metadata_loaded(&self) -> bool {
        self.lookups > self.surface_after + self.metadata_after
    }

    /// The library's own layout: intrinsic size pinned to the top-left corner.
    fn library_style(&self) -> Option<SurfaceStyle> {
        let natural = self.natural?;
        let transform = Transform { width: natural.width(), height: natural.height(), left: 0, top: 0 };
        Some(SurfaceStyle::new(FitMode::None, transform))
    }
}

impl Host for SimulatedHost {
    type Surface = SimulatedSurface;

    fn container_size(&self) -> Option<ViewportSize> {
        self.lock().container
    }

    fn find_surface(&self) -> Option<Self::Surface> {
        let mut state = self.lock();
        state.lookups += 1;
        if !state.surface_present() {
            return None;
        }
        if state.adversarial && state.metadata_loaded() {
            state.current = state.library_style();
            state.library_restyles += 1;
        }
        Some(SimulatedSurface { inner: Arc::clone(&self.inner) })
    }
}

/// The simulated `<video>` element.
pub struct SimulatedSurface {
    inner: Arc<Mutex<SimState>>,
}

impl MediaSurface for SimulatedSurface {
    fn natural_size(&self) -> Option<NaturalSize> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if state.metadata_loaded() { state.natural } else { None }
    }

    fn apply_style(&self, style: &SurfaceStyle) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.current = Some(*style);
        state.applied.push(*style);
    }
}
