//! Render configuration shared by the frame loop and the rasterizer
//!
//! All mode and toggle state lives in one plain value. Input handling mutates
//! it between frames; `SoftwareRenderer::render` only reads it.

use serde::{Serialize, Deserialize};
use super::types::ColorRGB;

/// Which triangles survive, based on projected winding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    BackFace,
    FrontFace,
    NoCulling,
}

impl CullMode {
    pub fn next(self) -> Self {
        match self {
            CullMode::BackFace => CullMode::FrontFace,
            CullMode::FrontFace => CullMode::NoCulling,
            CullMode::NoCulling => CullMode::BackFace,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CullMode::BackFace => "back-face",
            CullMode::FrontFace => "front-face",
            CullMode::NoCulling => "none",
        }
    }

    /// Whether a triangle with the given signed raster area is drawn
    pub fn accepts(self, signed_area: f32) -> bool {
        match self {
            CullMode::BackFace => signed_area > 0.0,
            CullMode::FrontFace => signed_area <= 0.0,
            CullMode::NoCulling => true,
        }
    }
}

/// What the shading stage outputs per fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    ObservedArea,
    Diffuse,
    Specular,
    Combined,
}

impl ShadingMode {
    pub fn next(self) -> Self {
        match self {
            ShadingMode::ObservedArea => ShadingMode::Diffuse,
            ShadingMode::Diffuse => ShadingMode::Specular,
            ShadingMode::Specular => ShadingMode::Combined,
            ShadingMode::Combined => ShadingMode::ObservedArea,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShadingMode::ObservedArea => "observed area",
            ShadingMode::Diffuse => "diffuse",
            ShadingMode::Specular => "specular",
            ShadingMode::Combined => "combined",
        }
    }
}

/// Default background
pub const BACKGROUND: ColorRGB = ColorRGB::gray(0.39);
/// Background when the uniform clear color is on
pub const UNIFORM_BACKGROUND: ColorRGB = ColorRGB::gray(0.1);

/// Per-frame render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub cull_mode: CullMode,
    pub shading_mode: ShadingMode,
    pub use_normal_map: bool,
    /// Output remapped depth instead of shaded color
    pub show_depth_buffer: bool,
    /// Paint every triangle's screen bounding box white
    pub show_bounding_boxes: bool,
    pub uniform_clear_color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::BackFace,
            shading_mode: ShadingMode::Combined,
            use_normal_map: true,
            show_depth_buffer: false,
            show_bounding_boxes: false,
            uniform_clear_color: false,
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl RenderConfig {
    pub fn background(&self) -> ColorRGB {
        if self.uniform_clear_color {
            UNIFORM_BACKGROUND
        } else {
            BACKGROUND
        }
    }

    pub fn toggle_shading_mode(&mut self) {
        self.shading_mode = self.shading_mode.next();
        log::info!("Current shading mode is {}", self.shading_mode.label());
    }

    pub fn toggle_normal_map(&mut self) {
        self.use_normal_map = !self.use_normal_map;
        log::info!("Normal map {}", on_off(self.use_normal_map));
    }

    pub fn toggle_depth_buffer_view(&mut self) {
        self.show_depth_buffer = !self.show_depth_buffer;
        log::info!("Depth-buffer visualization {}", on_off(self.show_depth_buffer));
    }

    pub fn toggle_bounding_box_view(&mut self) {
        self.show_bounding_boxes = !self.show_bounding_boxes;
        log::info!("Bounding-box visualization {}", on_off(self.show_bounding_boxes));
    }

    pub fn toggle_cull_mode(&mut self) {
        self.cull_mode = self.cull_mode.next();
        log::info!("Culling mode is {}", self.cull_mode.label());
    }

    pub fn toggle_uniform_clear_color(&mut self) {
        self.uniform_clear_color = !self.uniform_clear_color;
        log::info!("Uniform clear color {}", on_off(self.uniform_clear_color));
    }
}
