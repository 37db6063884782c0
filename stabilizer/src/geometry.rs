#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pixel size with both dimensions non-zero.
///
/// Used both for the host container's visible area and for a media
/// surface's intrinsic dimensions. A zero dimension means "hidden" for a
/// container and "metadata not loaded yet" for media, so it never reaches
/// the transform math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    width: u32,
    height: u32,
}

/// The host container's visible pixel dimensions.
pub type ViewportSize = Size;

/// Intrinsic width/height of a loaded video or canvas.
pub type NaturalSize = Size;

impl Size {
    /// Returns `None` when either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How the media surface is fitted into the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Scale until both axes fill the container, cropping the overflow.
    #[default]
    Cover,
    /// Scale until both axes fit inside the container, letterboxing the rest.
    Contain,
    /// Keep the intrinsic pixel size and center it.
    None,
}

impl FitMode {
    /// The matching CSS `object-fit` keyword.
    #[must_use]
    pub fn css_value(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fit mode: {0:?} (expected cover, contain or none)")]
pub struct ParseFitModeError(String);

impl FromStr for FitMode {
    type Err = ParseFitModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "none" => Ok(Self::None),
            _ => Err(ParseFitModeError(s.to_owned())),
        }
    }
}

/// Pixel box applied to the media surface, relative to the container's
/// top-left corner. `left` / `top` are negative when the surface overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transform {
    pub width: u32,
    pub height: u32,
    pub left: i64,
    pub top: i64,
}

/// Cover fit: `scale = max(cw / nw, ch / nh)`, then center.
///
/// The scaled box is never smaller than the container on either axis, and
/// `width - 2 * -left` equals the container width to within one pixel of
/// rounding (same for height).
#[must_use]
pub fn compute_cover_transform(natural: NaturalSize, container: ViewportSize) -> Transform {
    let scale = axis_scale(natural.width, container.width).max(axis_scale(natural.height, container.height));
    scaled_transform(natural, container, scale)
}

/// Contain fit: `scale = min(cw / nw, ch / nh)`, then center.
///
/// Offsets come out non-positive, so `left` / `top` are the letterbox margins.
#[must_use]
pub fn compute_contain_transform(natural: NaturalSize, container: ViewportSize) -> Transform {
    let scale = axis_scale(natural.width, container.width).min(axis_scale(natural.height, container.height));
    scaled_transform(natural, container, scale)
}

/// Dispatch on the fit mode. `FitMode::None` keeps the natural size.
#[must_use]
pub fn compute_transform(fit: FitMode, natural: NaturalSize, container: ViewportSize) -> Transform {
    match fit {
        FitMode::Cover => compute_cover_transform(natural, container),
        FitMode::Contain => compute_contain_transform(natural, container),
        FitMode::None => scaled_transform(natural, container, 1.0),
    }
}

fn axis_scale(natural: u32, container: u32) -> f64 {
    f64::from(container) / f64::from(natural)
}

fn scaled_transform(natural: NaturalSize, container: ViewportSize, scale: f64) -> Transform {
    let width = round_px(f64::from(natural.width) * scale);
    let height = round_px(f64::from(natural.height) * scale);
    let offset_x = centering_offset(width, container.width);
    let offset_y = centering_offset(height, container.height);
    Transform { width, height, left: -offset_x, top: -offset_y }
}

/// Round to whole pixels, never collapsing below one pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_px(value: f64) -> u32 {
    value.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// `round((scaled - container) / 2)`, half away from zero, in integers.
fn centering_offset(scaled: u32, container: u32) -> i64 {
    let diff = i64::from(scaled) - i64::from(container);
    (diff + diff.signum()) / 2
}
