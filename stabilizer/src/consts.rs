//! Shared defaults for the stabilizer crate.

// ── Polling ─────────────────────────────────────────────────────

/// Delay between surface lookups while waiting for the feed, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Lookups allowed per cycle before giving up and revealing the overlay.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

// ── Confirmation window ─────────────────────────────────────────

/// Extra applications after the first one. The AR library re-asserts its
/// own inline styles shortly after metadata loads.
pub const DEFAULT_CONFIRM_PASSES: u32 = 2;

/// Delay between confirmation passes, in milliseconds.
pub const DEFAULT_CONFIRM_INTERVAL_MS: u64 = 300;

// ── Resize ──────────────────────────────────────────────────────

/// Quiet period after the last resize/orientation event before a new cycle starts.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;

// ── Scene ───────────────────────────────────────────────────────

/// Marker pattern file name, relative to the deployment base path.
pub const PATTERN_FILE: &str = "pola.patt";

/// glTF model file name, relative to the deployment base path.
pub const MODEL_FILE: &str = "ekosistem.glb";

/// Vertical field of view of the scene camera, in degrees.
pub const CAMERA_FOV_DEG: u32 = 80;
