//! Viewport stabilizer for the AR scanner camera feed.
//!
//! The marker-based AR library inserts its own `<video>` / `<canvas>` under the
//! host container some time after the scene mounts, sizes them for its own
//! idea of the viewport, and keeps re-asserting those styles. This crate owns
//! the procedure that finds those elements, computes a centered Cover /
//! Contain / None fit against the container, re-applies it through a short
//! confirmation window, and only then reveals the scanning overlay.
//!
//! The core is sans-io: [`stabilizer::Stabilizer`] is driven by `tick()` and
//! `on_resize()` calls and talks to the outside world through the
//! [`surface::Host`] trait, so it can be tested without a browser. Drivers own
//! the timers.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`stabilizer`] | The stabilization state machine and its events |
//! | [`geometry`] | Sizes, fit modes and the cover/contain transform math |
//! | [`surface`] | Host / media-surface capability traits and applied styles |
//! | [`state`] | `StabilizationState` and reveal reasons |
//! | [`config`] | Serde-backed stabilizer configuration |
//! | [`scene`] | AR library configuration strings and asset URLs |
//! | [`overlay`] | Scanning-frame decoration and its stylesheet |
//! | [`consts`] | Shared defaults |
//! | `dom` | Browser binding and `gloo-timers` driver (feature `hydrate`) |

pub mod config;
pub mod consts;
#[cfg(feature = "hydrate")]
pub mod dom;
pub mod geometry;
pub mod overlay;
pub mod scene;
pub mod stabilizer;
pub mod state;
pub mod surface;
