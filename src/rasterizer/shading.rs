//! Per-fragment shading with a single fixed directional light

use super::brdf;
use super::math::{Vec2, Vec3};
use super::settings::ShadingMode;
use super::types::{ColorRGB, Texture};

pub const LIGHT_DIRECTION: Vec3 = Vec3::new(0.577, -0.577, 0.577);
pub const LIGHT_INTENSITY: f32 = 7.0;
pub const SHININESS: f32 = 25.0;
pub const AMBIENT: ColorRGB = ColorRGB::gray(0.025);

/// Textures sampled during shading
pub struct Materials<'a> {
    pub diffuse: &'a Texture,
    pub normal: &'a Texture,
    pub specular: &'a Texture,
    pub gloss: &'a Texture,
}

/// Owned set of the four surface textures
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub diffuse: Texture,
    pub normal: Texture,
    pub specular: Texture,
    pub gloss: Texture,
}

impl TextureSet {
    pub fn materials(&self) -> Materials<'_> {
        Materials {
            diffuse: &self.diffuse,
            normal: &self.normal,
            specular: &self.specular,
            gloss: &self.gloss,
        }
    }
}

/// Interpolated attributes of one covered pixel
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Vertex color, multiplied into the diffuse texel
    pub color: ColorRGB,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub view_dir: Vec3,
}

/// Perturb `normal` with a tangent-space normal map sample
pub fn sample_normal_map(map: &Texture, uv: Vec2, normal: Vec3, tangent: Vec3) -> Vec3 {
    let s = map.sample(uv);
    // [0,1] -> [-1,1]
    let sampled = Vec3::new(2.0 * s.r - 1.0, 2.0 * s.g - 1.0, 2.0 * s.b - 1.0);

    let n = normal.normalize();
    let t = tangent.reject(n).normalize();
    let b = n.cross(t);

    (t * sampled.x + b * sampled.y + n * sampled.z).normalize()
}

/// Cosine between the surface normal and the incoming light
pub fn observed_area(normal: Vec3) -> f32 {
    normal.dot(-LIGHT_DIRECTION)
}

/// Shade one fragment. Returns linear RGB, possibly above 1.
pub fn shade(fragment: &Fragment, materials: &Materials, mode: ShadingMode, use_normal_map: bool) -> ColorRGB {
    // Interpolated normals are renormalized in both paths; unit-length
    // normals brighten triangle interiors compared with raw interpolation.
    let normal = if use_normal_map {
        sample_normal_map(materials.normal, fragment.uv, fragment.normal, fragment.tangent)
    } else {
        fragment.normal.normalize()
    };

    let area = observed_area(normal);
    if area < 0.0 {
        return ColorRGB::BLACK;
    }

    let base_color = materials.diffuse.sample(fragment.uv) * fragment.color;
    let ks = materials.specular.sample(fragment.uv).r;
    let gloss = materials.gloss.sample(fragment.uv).r;

    let diffuse = brdf::lambert(LIGHT_INTENSITY, base_color);
    let specular = brdf::phong(ks, gloss * SHININESS, -LIGHT_DIRECTION, fragment.view_dir, normal)
        .max_to_one();

    match mode {
        ShadingMode::ObservedArea => ColorRGB::gray(area),
        ShadingMode::Diffuse => diffuse,
        ShadingMode::Specular => specular,
        ShadingMode::Combined => (diffuse + specular + AMBIENT) * area,
    }
}
