//! Capability traits for the externally owned pieces the stabilizer touches.
//!
//! The AR library owns the `<video>` / `<canvas>` it inserts and the page owns
//! the container. The stabilizer only ever sees them through [`Host`] and
//! [`MediaSurface`], which keeps the state machine testable with plain mocks.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::geometry::{FitMode, NaturalSize, Transform, ViewportSize};

/// The host container plus lookup of the lazily inserted media surface.
pub trait Host {
    type Surface: MediaSurface;

    /// Visible container size, or `None` while it is hidden or detached.
    fn container_size(&self) -> Option<ViewportSize>;

    /// The library's media element, if it has been inserted yet.
    fn find_surface(&self) -> Option<Self::Surface>;

    /// Best-effort call into the library's own resize hooks before patching
    /// styles. Returns whether any hook was found.
    fn invoke_library_resize(&self) -> bool {
        false
    }
}

/// A video or canvas element owned by the rendering library.
pub trait MediaSurface {
    /// Intrinsic dimensions, or `None` until media metadata has loaded.
    fn natural_size(&self) -> Option<NaturalSize>;

    /// Overwrite the element's inline layout styles.
    fn apply_style(&self, style: &SurfaceStyle);
}

/// Inline layout applied to a media surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStyle {
    pub fit: FitMode,
    pub transform: Transform,
}

impl SurfaceStyle {
    #[must_use]
    pub fn new(fit: FitMode, transform: Transform) -> Self {
        Self { fit, transform }
    }

    /// CSS property/value pairs, in the order they are written.
    ///
    /// `transform` and `margin` are reset because the library uses both to
    /// shift its feed.
    #[must_use]
    pub fn declarations(&self) -> [(&'static str, String); 8] {
        let t = self.transform;
        [
            ("position", "absolute".to_owned()),
            ("width", format!("{}px", t.width)),
            ("height", format!("{}px", t.height)),
            ("left", format!("{}px", t.left)),
            ("top", format!("{}px", t.top)),
            ("object-fit", self.fit.css_value().to_owned()),
            ("transform", "none".to_owned()),
            ("margin", "0".to_owned()),
        ]
    }

    /// The declarations joined as an inline `style` attribute value.
    #[must_use]
    pub fn css_text(&self) -> String {
        self.declarations()
            .iter()
            .map(|(prop, value)| format!("{prop}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
