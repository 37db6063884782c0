//! Scanning-frame decoration drawn above the camera feed.
//!
//! The frame is a dashed square with four accent corners and a scan line
//! sweeping top to bottom. It is emitted hidden (`data-state="hidden"`) and
//! made visible once the stabilizer reveals it, so users never see it float
//! over a mis-sized feed.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use serde::{Deserialize, Serialize};

/// Attribute toggled to show the overlay.
pub const STATE_ATTR: &str = "data-state";
pub const STATE_HIDDEN: &str = "hidden";
pub const STATE_VISIBLE: &str = "visible";

/// Corner class suffixes: top-left, top-right, bottom-left, bottom-right.
pub const CORNERS: [&str; 4] = ["tl", "tr", "bl", "br"];

/// Geometry and colors of the scanning frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScannerFrame {
    pub size_px: u32,
    pub corner_px: u32,
    pub corner_border_px: u32,
    pub radius_px: u32,
    /// Corner and scan-line color.
    pub accent: String,
    /// Seconds for one top-to-bottom sweep.
    pub scan_period_secs: f64,
    pub z_index: i32,
}

impl Default for ScannerFrame {
    fn default() -> Self {
        Self {
            size_px: 280,
            corner_px: 32,
            corner_border_px: 4,
            radius_px: 12,
            accent: "#00ffcc".to_owned(),
            scan_period_secs: 2.5,
            z_index: 20,
        }
    }
}

impl ScannerFrame {
    /// Stylesheet for the container, frame, corners and scan-line animation.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let Self { size_px, corner_px, corner_border_px, radius_px, accent, scan_period_secs, z_index } = self;
        format!(
            "\
body {{ margin: 0; overflow: hidden; }}
.ar-container {{ position: relative; width: 100vw; height: 100vh; overflow: hidden; }}
.scanner-frame {{
    position: absolute; top: 50%; left: 50%; width: {size_px}px; height: {size_px}px;
    transform: translate(-50%, -50%); border-radius: {radius_px}px; box-sizing: border-box;
    z-index: {z_index}; background: rgba(0, 0, 0, 0.1); backdrop-filter: blur(2px);
    border: 2px dashed rgba(255, 255, 255, 0.25);
    transition: opacity 0.3s ease;
}}
.scanner-frame[{STATE_ATTR}=\"{STATE_HIDDEN}\"] {{ opacity: 0; pointer-events: none; }}
.corner {{
    position: absolute; width: {corner_px}px; height: {corner_px}px;
    border: {corner_border_px}px solid {accent}; border-radius: 4px;
}}
.corner.tl {{ top: -2px; left: -2px; border-right: none; border-bottom: none; }}
.corner.tr {{ top: -2px; right: -2px; border-left: none; border-bottom: none; }}
.corner.bl {{ bottom: -2px; left: -2px; border-right: none; border-top: none; }}
.corner.br {{ bottom: -2px; right: -2px; border-left: none; border-top: none; }}
.scan-line {{
    position: absolute; left: 0; top: 0; width: 100%; height: 3px;
    background: linear-gradient(to right, transparent, {accent}, transparent);
    animation: scan {scan_period_secs}s linear infinite;
}}
@keyframes scan {{
    0% {{ top: 0%; }}
    100% {{ top: 100%; }}
}}
"
        )
    }

    /// Frame markup, initially hidden.
    #[must_use]
    pub fn markup(&self) -> String {
        let corners: String = CORNERS
            .iter()
            .map(|c| format!(r#"<div class="corner {c}"></div>"#))
            .collect();
        format!(
            r#"<div class="scanner-frame" {STATE_ATTR}="{STATE_HIDDEN}">{corners}<div class="scan-line"></div></div>"#
        )
    }
}
