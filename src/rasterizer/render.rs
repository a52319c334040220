//! Core rendering functions
//! Vertex transform, primitive assembly, culling and triangle rasterization

use std::ops::{Add, Mul};
use super::camera::Camera;
use super::math::{cross2, inverse_lerp, Matrix, Vec2, Vec3};
use super::settings::RenderConfig;
use super::shading::{shade, Fragment, Materials};
use super::types::{Color, ColorRGB, PrimitiveTopology, Vertex, VertexOut, Mesh};

/// Depth band stretched over the full gray range by the depth view
pub const DEPTH_VIEW_NEAR: f32 = 0.985;
pub const DEPTH_VIEW_FAR: f32 = 1.0;

/// Triangles with a smaller raster area (in pixels, doubled) are skipped
const DEGENERATE_AREA: f32 = 1e-6;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,    // RGBA, 4 bytes per pixel
    pub zbuffer: Vec<f32>,  // Depth buffer
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![f32::MAX; width * height],
            width,
            height,
        }
    }

    /// Fill with `color` and reset every depth to `f32::MAX`
    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(f32::MAX);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Depth test; on pass the new depth is written immediately
    pub fn test_and_set_depth(&mut self, x: usize, y: usize, z: f32) -> bool {
        let idx = y * self.width + x;
        if z < self.zbuffer[idx] {
            self.zbuffer[idx] = z;
            return true;
        }
        false
    }
}

#[cfg(test)]
impl Framebuffer {
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        let idx = (y * self.width + x) * 4;
        Color {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.zbuffer[y * self.width + x]
    }
}

/// Model space to NDC.
///
/// Positions go through `world * inv_view * projection` and are divided by
/// the resulting w, which is kept. Normals and tangents only go through the
/// world matrix (no inverse-transpose, so non-uniform scale skews them).
///
/// `view_dir` is built from the world-space position, not the projected
/// one, which shifts specular highlights relative to a projected-position
/// view vector.
pub fn transform_vertices(
    vertices: &[Vertex],
    world: &Matrix,
    inv_view: &Matrix,
    projection: &Matrix,
    eye: Vec3,
) -> Vec<VertexOut> {
    let world_view_projection = *world * *inv_view * *projection;

    vertices
        .iter()
        .map(|v| {
            let mut pos = world_view_projection.transform_point(v.pos);
            pos.x /= pos.w;
            pos.y /= pos.w;
            pos.z /= pos.w;

            let world_pos = world.transform_point(v.pos).xyz();

            VertexOut {
                pos,
                color: v.color.into(),
                uv: v.uv,
                normal: world.transform_vector(v.normal),
                tangent: world.transform_vector(v.tangent),
                view_dir: (world_pos - eye).normalize(),
            }
        })
        .collect()
}

/// Walk an index buffer as triangles.
///
/// Strips flip every odd triangle so all triangles share one winding.
pub fn assemble_triangles(
    indices: &[u32],
    topology: PrimitiveTopology,
) -> impl Iterator<Item = [u32; 3]> + '_ {
    let (step, count) = match topology {
        PrimitiveTopology::TriangleList => (3, indices.len() / 3),
        PrimitiveTopology::TriangleStrip => (1, indices.len().saturating_sub(2)),
    };

    (0..count).map(move |i| {
        let start = i * step;
        let mut tri = [indices[start], indices[start + 1], indices[start + 2]];
        if topology == PrimitiveTopology::TriangleStrip && i % 2 == 1 {
            tri.swap(1, 2);
        }
        tri
    })
}

/// Whether a vertex lies in the canonical view volume
pub fn in_frustum(v: &VertexOut) -> bool {
    (-1.0..=1.0).contains(&v.pos.x)
        && (-1.0..=1.0).contains(&v.pos.y)
        && (0.0..=1.0).contains(&v.pos.z)
}

/// NDC x/y to raster coordinates (y pointing down)
pub fn to_raster(v: &VertexOut, width: usize, height: usize) -> Vec2 {
    Vec2::new(
        (v.pos.x + 1.0) / 2.0 * width as f32,
        (1.0 - v.pos.y) / 2.0 * height as f32,
    )
}

/// Twice the signed area of a raster triangle
pub fn signed_area(v: [Vec2; 3]) -> f32 {
    cross2(v[1] - v[0], v[2] - v[0])
}

/// Barycentric weights of `p` from the three edge functions.
/// `None` for degenerate triangles.
pub fn edge_weights(p: Vec2, v: [Vec2; 3]) -> Option<[f32; 3]> {
    let area = signed_area(v);
    if area.abs() < DEGENERATE_AREA {
        return None;
    }

    Some([
        cross2(v[2] - v[1], p - v[1]) / area,
        cross2(v[0] - v[2], p - v[2]) / area,
        cross2(v[1] - v[0], p - v[0]) / area,
    ])
}

/// Strictly inside: pixels exactly on an edge belong to neither side
pub fn is_inside(weights: [f32; 3]) -> bool {
    weights.iter().all(|&w| w > 0.0)
}

/// Perspective-correct depth from per-vertex NDC depth
pub fn interpolate_depth(weights: [f32; 3], z: [f32; 3]) -> f32 {
    1.0 / (weights[0] / z[0] + weights[1] / z[1] + weights[2] / z[2])
}

/// Perspective-correct attribute interpolation using clip-space `w`
pub fn perspective_interpolate<T>(values: [T; 3], weights: [f32; 3], w: [f32; 3]) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let w_interp = 1.0 / (weights[0] / w[0] + weights[1] / w[1] + weights[2] / w[2]);
    (values[0] * (weights[0] / w[0])
        + values[1] * (weights[1] / w[1])
        + values[2] * (weights[2] / w[2]))
        * w_interp
}

/// Linear remap of depth from the visualized band to gray, unclamped
pub fn depth_to_gray(depth: f32) -> f32 {
    inverse_lerp(DEPTH_VIEW_NEAR, DEPTH_VIEW_FAR, depth)
}

/// Pixel range covered by a triangle's bounding box: clamped to the screen,
/// grown by one pixel on every side, then kept inside the buffer
fn pixel_bounds(raster: [Vec2; 3], width: usize, height: usize) -> (i32, i32, i32, i32) {
    let (w, h) = (width as f32, height as f32);
    let min_x = raster[0].x.min(raster[1].x).min(raster[2].x).clamp(0.0, w);
    let max_x = raster[0].x.max(raster[1].x).max(raster[2].x).clamp(0.0, w);
    let min_y = raster[0].y.min(raster[1].y).min(raster[2].y).clamp(0.0, h);
    let max_y = raster[0].y.max(raster[1].y).max(raster[2].y).clamp(0.0, h);

    (
        ((min_x - 1.0) as i32).max(0),
        ((max_x + 1.0) as i32).min(width as i32),
        ((min_y - 1.0) as i32).max(0),
        ((max_y + 1.0) as i32).min(height as i32),
    )
}

/// Rasterize a single triangle
pub fn rasterize_triangle(
    fb: &mut Framebuffer,
    tri: [&VertexOut; 3],
    materials: &Materials,
    config: &RenderConfig,
) {
    let raster = tri.map(|v| to_raster(v, fb.width, fb.height));
    let (min_x, max_x, min_y, max_y) = pixel_bounds(raster, fb.width, fb.height);

    if config.show_bounding_boxes {
        let white = ColorRGB::WHITE.to_color();
        for py in min_y..max_y {
            for px in min_x..max_x {
                fb.set_pixel(px as usize, py as usize, white);
            }
        }
        return;
    }

    // Culling depends only on the projected winding
    if !config.cull_mode.accepts(signed_area(raster)) {
        return;
    }

    let depths = tri.map(|v| v.pos.z);
    let ws = tri.map(|v| v.pos.w);

    for py in min_y..max_y {
        for px in min_x..max_x {
            let p = Vec2::new(px as f32, py as f32);
            let Some(weights) = edge_weights(p, raster) else {
                return;
            };
            if !is_inside(weights) {
                continue;
            }

            let (x, y) = (px as usize, py as usize);
            let depth = interpolate_depth(weights, depths);
            if !fb.test_and_set_depth(x, y, depth) {
                continue;
            }

            let color = if config.show_depth_buffer {
                ColorRGB::gray(depth_to_gray(depth))
            } else {
                let fragment = Fragment {
                    color: perspective_interpolate(tri.map(|v| v.color), weights, ws),
                    uv: perspective_interpolate(tri.map(|v| v.uv), weights, ws),
                    normal: perspective_interpolate(tri.map(|v| v.normal), weights, ws),
                    tangent: perspective_interpolate(tri.map(|v| v.tangent), weights, ws),
                    view_dir: perspective_interpolate(tri.map(|v| v.view_dir), weights, ws),
                };
                shade(&fragment, materials, config.shading_mode, config.use_normal_map)
            };

            fb.set_pixel(x, y, color.to_color());
        }
    }
}

/// Assemble, cull and rasterize already-transformed vertices
pub fn draw_triangles(
    fb: &mut Framebuffer,
    vertices: &[VertexOut],
    indices: &[u32],
    topology: PrimitiveTopology,
    materials: &Materials,
    config: &RenderConfig,
) {
    for [i0, i1, i2] in assemble_triangles(indices, topology) {
        let (Some(v0), Some(v1), Some(v2)) = (
            vertices.get(i0 as usize),
            vertices.get(i1 as usize),
            vertices.get(i2 as usize),
        ) else {
            continue;
        };

        // Coarse accept/reject, no clipping
        if !(in_frustum(v0) && in_frustum(v1) && in_frustum(v2)) {
            continue;
        }

        rasterize_triangle(fb, [v0, v1, v2], materials, config);
    }
}

/// Render a mesh to the framebuffer
pub fn render_mesh(
    fb: &mut Framebuffer,
    mesh: &Mesh,
    camera: &Camera,
    materials: &Materials,
    config: &RenderConfig,
) {
    let transformed = transform_vertices(
        &mesh.vertices,
        &mesh.world,
        &camera.inv_view_matrix(),
        &camera.projection_matrix(),
        camera.origin(),
    );
    draw_triangles(fb, &transformed, &mesh.indices, mesh.topology, materials, config);
}
