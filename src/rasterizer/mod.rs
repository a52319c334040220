//! Software rasterizer for a textured, normal-mapped mesh
//!
//! Pipeline:
//! - Vertex transform to NDC, w kept for perspective correction
//! - Triangle list / strip assembly with a coarse frustum reject
//! - Edge-function coverage, depth test, perspective-correct attributes
//! - Lambert + Phong shading with tangent-space normal mapping

mod math;
mod types;
mod settings;
mod brdf;
mod shading;
mod camera;
mod render;
mod renderer;

pub use math::*;
pub use types::*;
pub use settings::*;
pub use shading::*;
pub use camera::*;
pub use render::*;
pub use renderer::*;

/// Frame buffer dimensions
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
