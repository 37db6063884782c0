//! Native host for the AR scanner viewport stabilizer.
//!
//! The browser build drives [`stabilizer::stabilizer::Stabilizer`] from DOM
//! timers; this crate drives the same state machine from a tokio task so it
//! can be exercised (and replayed against a simulated camera) off-browser.
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | tokio driver: poll/confirm timers, resize debounce, teardown |
//! | [`config`] | Environment-backed configuration |
//! | [`sim`] | Simulated host whose feed appears late and gets restyled |

pub mod config;
pub mod session;
pub mod sim;
