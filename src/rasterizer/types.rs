//! Core types for the rasterizer

use std::ops::{Add, Mul};
use serde::{Serialize, Deserialize};
use super::math::{Matrix, Vec2, Vec3, Vec4};

/// Linear RGB color, one float per channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorRGB {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRGB {
    pub const BLACK: ColorRGB = ColorRGB { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: ColorRGB = ColorRGB { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Rescale so the brightest channel is at most 1, preserving hue
    pub fn max_to_one(self) -> Self {
        let max = self.r.max(self.g).max(self.b);
        if max > 1.0 {
            self * (1.0 / max)
        } else {
            self
        }
    }

    /// Quantize to an opaque 8-bit color. Negative channels saturate to 0.
    pub fn to_color(self) -> Color {
        let c = self.max_to_one();
        Color::new((c.r * 255.0) as u8, (c.g * 255.0) as u8, (c.b * 255.0) as u8)
    }
}

impl Add for ColorRGB {
    type Output = ColorRGB;
    fn add(self, other: ColorRGB) -> ColorRGB {
        ColorRGB::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl Mul<f32> for ColorRGB {
    type Output = ColorRGB;
    fn mul(self, s: f32) -> ColorRGB {
        ColorRGB::new(self.r * s, self.g * s, self.b * s)
    }
}

/// Component-wise product
impl Mul<ColorRGB> for ColorRGB {
    type Output = ColorRGB;
    fn mul(self, other: ColorRGB) -> ColorRGB {
        ColorRGB::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl From<Vec3> for ColorRGB {
    fn from(v: Vec3) -> Self {
        ColorRGB::new(v.x, v.y, v.z)
    }
}

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Model-space input vertex
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub pos: Vec3,
    pub color: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

impl Vertex {
    pub fn new(pos: Vec3, uv: Vec2, normal: Vec3, tangent: Vec3) -> Self {
        Self {
            pos,
            color: Vec3::ONE,
            uv,
            normal,
            tangent,
        }
    }
}

/// Vertex after the transform stage
///
/// `pos` holds NDC x/y/z after the perspective divide, with the clip-space
/// `w` kept for perspective-correct interpolation. `view_dir` points from
/// the camera to the world-space vertex.
#[derive(Debug, Clone, Copy)]
pub struct VertexOut {
    pub pos: Vec4,
    pub color: ColorRGB,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub view_dir: Vec3,
}

impl Default for VertexOut {
    fn default() -> Self {
        Self {
            pos: Vec4::default(),
            color: ColorRGB::WHITE,
            uv: Vec2::default(),
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
            view_dir: Vec3::ZERO,
        }
    }
}

/// How an index buffer forms triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
}

/// Indexed triangle mesh with its world transform
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: PrimitiveTopology,
    pub world: Matrix,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: PrimitiveTopology) -> Self {
        Self {
            vertices,
            indices,
            topology,
            world: Matrix::IDENTITY,
        }
    }
}

/// Decoded texture, sampled with nearest-neighbor lookup
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<ColorRGB>,
    pub name: String,
}

impl Texture {
    /// Single-color texture, used as a stand-in when an asset fails to load
    pub fn solid(color: ColorRGB, name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            name: name.to_string(),
        }
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| {
                ColorRGB::new(
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                )
            })
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: ColorRGB, color2: ColorRGB) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Sample texture at UV coordinates (nearest texel, truncating).
    ///
    /// UV outside [0,1] is a caller error. Texel indices are clamped to the
    /// image so such lookups stay in bounds; they return edge texels rather
    /// than wrapping.
    pub fn sample(&self, uv: Vec2) -> ColorRGB {
        if self.pixels.is_empty() {
            return ColorRGB::BLACK;
        }
        let tx = ((uv.x * self.width as f32) as usize).min(self.width - 1);
        let ty = ((uv.y * self.height as f32) as usize).min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_2x2() -> Texture {
        Texture {
            width: 2,
            height: 2,
            pixels: vec![
                ColorRGB::new(1.0, 0.0, 0.0),
                ColorRGB::new(0.0, 1.0, 0.0),
                ColorRGB::new(0.0, 0.0, 1.0),
                ColorRGB::WHITE,
            ],
            name: "gradient".to_string(),
        }
    }

    #[test]
    fn test_sample_truncates_to_texel() {
        let tex = gradient_2x2();
        assert_eq!(tex.sample(Vec2::new(0.1, 0.1)), ColorRGB::new(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(Vec2::new(0.6, 0.1)), ColorRGB::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(Vec2::new(0.1, 0.6)), ColorRGB::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_sample_out_of_range_stays_in_bounds() {
        let tex = gradient_2x2();
        assert_eq!(tex.sample(Vec2::new(1.0, 1.0)), ColorRGB::WHITE);
        assert_eq!(tex.sample(Vec2::new(7.5, -3.0)), ColorRGB::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_max_to_one_preserves_ratio() {
        let c = ColorRGB::new(2.0, 1.0, 0.5).max_to_one();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
        assert!((c.b - 0.25).abs() < 1e-6);
        assert_eq!(ColorRGB::gray(0.5).max_to_one(), ColorRGB::gray(0.5));
    }

    #[test]
    fn test_to_color_saturates_negative() {
        assert_eq!(ColorRGB::gray(-0.5).to_color(), Color::new(0, 0, 0));
        assert_eq!(ColorRGB::gray(3.0).to_color(), Color::new(255, 255, 255));
    }
}
