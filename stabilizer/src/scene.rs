//! AR scene configuration: the library's attribute strings and asset URLs.
//!
//! The rendering library owns the format of these strings; this module only
//! assembles them from typed values and passes them through verbatim.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_FOV_DEG, MODEL_FILE, PATTERN_FILE};

/// A capture or display resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Settings for the AR library's `arjs` scene attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArjsConfig {
    pub source_type: String,
    pub debug_ui_enabled: bool,
    /// Requested camera capture resolution.
    pub source: Option<Resolution>,
    /// Resolution the library should lay its output out for.
    pub display: Option<Resolution>,
    /// Camera calibration file (`camera_para.dat`).
    pub camera_parameters_url: Option<String>,
}

impl Default for ArjsConfig {
    fn default() -> Self {
        Self {
            source_type: "webcam".to_owned(),
            debug_ui_enabled: false,
            source: None,
            display: None,
            camera_parameters_url: None,
        }
    }
}

impl ArjsConfig {
    /// Render as `key: value;` pairs, e.g. `sourceType: webcam; debugUIEnabled: false;`.
    #[must_use]
    pub fn attribute(&self) -> String {
        let mut out = format!("sourceType: {}; debugUIEnabled: {};", self.source_type, self.debug_ui_enabled);
        if let Some(source) = self.source {
            push_pair(&mut out, "sourceWidth", source.width);
            push_pair(&mut out, "sourceHeight", source.height);
        }
        if let Some(display) = self.display {
            push_pair(&mut out, "displayWidth", display.width);
            push_pair(&mut out, "displayHeight", display.height);
        }
        if let Some(url) = &self.camera_parameters_url {
            push_pair(&mut out, "cameraParametersUrl", url);
        }
        out
    }
}

fn push_pair(out: &mut String, key: &str, value: impl std::fmt::Display) {
    out.push_str(&format!(" {key}: {value};"));
}

/// Marker pattern and model locations under a deployment base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    base: String,
}

impl AssetPaths {
    /// `base` is the public URL prefix; a trailing slash is ignored and an
    /// empty base resolves assets from the site root.
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self { base: base.trim_end_matches('/').to_owned() }
    }

    #[must_use]
    pub fn pattern_url(&self) -> String {
        format!("{}/{PATTERN_FILE}", self.base)
    }

    /// Model URL wrapped the way the scene's `gltf-model` attribute expects it.
    #[must_use]
    pub fn model_url(&self) -> String {
        format!("url({}/{MODEL_FILE})", self.base)
    }
}

/// Scale, rotation and position of the model entity on the marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPlacement {
    pub scale: [f64; 3],
    /// Degrees; -90 on x lays the model flat on the marker.
    pub rotation: [f64; 3],
    pub position: [f64; 3],
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self { scale: [0.1, 0.1, 0.1], rotation: [-90.0, 0.0, 0.0], position: [0.0, 0.5, 0.0] }
    }
}

impl ModelPlacement {
    #[must_use]
    pub fn scale_attr(&self) -> String {
        vec3(self.scale)
    }

    #[must_use]
    pub fn rotation_attr(&self) -> String {
        vec3(self.rotation)
    }

    #[must_use]
    pub fn position_attr(&self) -> String {
        vec3(self.position)
    }
}

fn vec3(v: [f64; 3]) -> String {
    format!("{} {} {}", v[0], v[1], v[2])
}

/// Everything needed to emit the scene markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub arjs: ArjsConfig,
    pub logarithmic_depth_buffer: bool,
    pub camera_fov: u32,
    pub placement: ModelPlacement,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            arjs: ArjsConfig::default(),
            logarithmic_depth_buffer: true,
            camera_fov: CAMERA_FOV_DEG,
            placement: ModelPlacement::default(),
        }
    }
}

impl SceneConfig {
    #[must_use]
    pub fn renderer_attribute(&self) -> String {
        format!("logarithmicDepthBuffer: {};", self.logarithmic_depth_buffer)
    }

    /// Embedded scene with one pattern marker carrying the model.
    ///
    /// The scene sits under the overlay (`z-index` 10 vs 20) and has VR UI
    /// disabled.
    #[must_use]
    pub fn markup(&self, assets: &AssetPaths) -> String {
        let p = &self.placement;
        format!(
            concat!(
                r#"<a-scene embedded arjs="{arjs}" vr-mode-ui="enabled: false" renderer="{renderer}" "#,
                r#"style="position: absolute; top: 0; left: 0; z-index: 10;">"#,
                r#"<a-marker type="pattern" url="{pattern}">"#,
                r#"<a-entity gltf-model="{model}" scale="{scale}" rotation="{rotation}" position="{position}"></a-entity>"#,
                r#"</a-marker>"#,
                r#"<a-camera fov="{fov}"></a-camera>"#,
                r#"</a-scene>"#,
            ),
            arjs = escape_attr(&self.arjs.attribute()),
            renderer = self.renderer_attribute(),
            pattern = escape_attr(&assets.pattern_url()),
            model = escape_attr(&assets.model_url()),
            scale = p.scale_attr(),
            rotation = p.rotation_attr(),
            position = p.position_attr(),
            fov = self.camera_fov,
        )
    }
}

/// Escape a value for a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
