//! Scene assets and the model's world transform
//!
//! Meshes come from OBJ files through `tobj`, textures through `image`.
//! Every loader has a placeholder fallback so a missing asset never stops
//! the frame loop.

use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::config::AppConfig;
use crate::rasterizer::{
    cross2, ColorRGB, Matrix, Mesh, PrimitiveTopology, Texture, TextureSet, Vec2, Vec3, Vertex,
};

/// Half the side length of the fallback quad
const PLACEHOLDER_HALF_EXTENT: f32 = 10.0;

/// Below this the UV triangle is degenerate and gives no tangent
const UV_EPSILON: f32 = 1e-8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("OBJ parse error for {path}: {message}")]
    Mesh { path: PathBuf, message: String },
    #[error("Mesh has no geometry: {0}")]
    EmptyMesh(PathBuf),
}

/// Load a triangulated OBJ as an indexed triangle list with tangents
pub fn load_mesh(path: &Path) -> Result<Mesh, AssetError> {
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, _materials) = tobj::load_obj(path, &load_options).map_err(|e| AssetError::Mesh {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if models.len() > 1 {
        log::warn!("OBJ contains {} objects/groups, merging", models.len());
    }

    let (mut vertices, indices) = merge_models(&models);
    if vertices.is_empty() || indices.is_empty() {
        return Err(AssetError::EmptyMesh(path.to_path_buf()));
    }

    generate_tangents(&mut vertices, &indices);
    log::info!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        vertices.len(),
        indices.len() / 3
    );

    Ok(Mesh::new(vertices, indices, PrimitiveTopology::TriangleList))
}

fn merge_models(models: &[tobj::Model]) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let vert_count = mesh.positions.len() / 3;
        if vert_count == 0 {
            continue;
        }

        let has_uvs = mesh.texcoords.len() >= vert_count * 2;
        let has_normals = mesh.normals.len() >= vert_count * 3;
        if !has_uvs {
            log::warn!("Mesh '{}' has no UV coordinates, using (0, 0)", model.name);
        }
        if !has_normals {
            log::warn!("Mesh '{}' has no normals, facing them toward -Z", model.name);
        }

        let offset = vertices.len() as u32;
        for i in 0..vert_count {
            let pos = Vec3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            // OBJ v grows upward, texture rows grow downward
            let uv = if has_uvs {
                Vec2::new(mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1])
            } else {
                Vec2::new(0.0, 0.0)
            };
            let normal = if has_normals {
                Vec3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vec3::new(0.0, 0.0, -1.0)
            };
            vertices.push(Vertex::new(pos, uv, normal, Vec3::ZERO));
        }

        indices.extend(mesh.indices.iter().map(|&i| i + offset));
    }

    (vertices, indices)
}

/// Per-vertex tangents from UV derivatives, orthogonalized against the normal
pub fn generate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accum = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(v0), Some(v1), Some(v2)) = (vertices.get(i0), vertices.get(i1), vertices.get(i2))
        else {
            continue;
        };

        let edge0 = v1.pos - v0.pos;
        let edge1 = v2.pos - v0.pos;
        let diff_x = Vec2::new(v1.uv.x - v0.uv.x, v2.uv.x - v0.uv.x);
        let diff_y = Vec2::new(v1.uv.y - v0.uv.y, v2.uv.y - v0.uv.y);

        let det = cross2(diff_x, diff_y);
        if det.abs() < UV_EPSILON {
            continue;
        }
        let tangent = (edge0 * diff_y.y - edge1 * diff_y.x) / det;

        accum[i0] += tangent;
        accum[i1] += tangent;
        accum[i2] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(accum) {
        let t = tangent.reject(vertex.normal).normalize();
        vertex.tangent = if t == Vec3::ZERO { fallback_tangent(vertex.normal) } else { t };
    }
}

/// Any unit vector perpendicular to `n`
fn fallback_tangent(n: Vec3) -> Vec3 {
    let axis = if n.x.abs() < 0.9 { Vec3::UNIT_X } else { Vec3::UNIT_Y };
    axis.reject(n).normalize()
}

/// Camera-facing quad drawn when the mesh is unavailable
pub fn placeholder_quad() -> Mesh {
    let h = PLACEHOLDER_HALF_EXTENT;
    let n = Vec3::new(0.0, 0.0, -1.0);
    let t = Vec3::UNIT_X;
    let vertices = vec![
        Vertex::new(Vec3::new(-h, h, 0.0), Vec2::new(0.0, 0.0), n, t),
        Vertex::new(Vec3::new(h, h, 0.0), Vec2::new(1.0, 0.0), n, t),
        Vertex::new(Vec3::new(-h, -h, 0.0), Vec2::new(0.0, 1.0), n, t),
        Vertex::new(Vec3::new(h, -h, 0.0), Vec2::new(1.0, 1.0), n, t),
    ];
    Mesh::new(vertices, vec![0, 1, 2, 3], PrimitiveTopology::TriangleStrip)
}

pub fn load_mesh_or_placeholder(path: &Path) -> Mesh {
    load_mesh(path).unwrap_or_else(|e| {
        log::error!("{}; drawing a placeholder quad", e);
        placeholder_quad()
    })
}

pub fn load_texture(path: &Path) -> Result<Texture, AssetError> {
    let texture = Texture::from_file(path)?;
    log::info!("Loaded texture {} ({}x{})", path.display(), texture.width, texture.height);
    Ok(texture)
}

fn load_texture_or(path: &Path, fallback: impl FnOnce() -> Texture) -> Texture {
    load_texture(path).unwrap_or_else(|e| {
        let placeholder = fallback();
        log::warn!("Texture {}: {}; using placeholder '{}'", path.display(), e, placeholder.name);
        placeholder
    })
}

/// Load the four surface textures named in `config`
pub fn load_textures(config: &AppConfig) -> TextureSet {
    TextureSet {
        diffuse: load_texture_or(&config.diffuse_path, || {
            Texture::checkerboard(64, 64, ColorRGB::gray(0.8), ColorRGB::gray(0.3))
        }),
        normal: load_texture_or(&config.normal_path, || {
            Texture::solid(ColorRGB::new(0.5, 0.5, 1.0), "flat_normal")
        }),
        specular: load_texture_or(&config.specular_path, || {
            Texture::solid(ColorRGB::gray(0.5), "specular")
        }),
        gloss: load_texture_or(&config.gloss_path, || Texture::solid(ColorRGB::gray(1.0), "gloss")),
    }
}

/// Model placement and spin
#[derive(Debug, Clone)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub angle: f32,
    pub rotation_speed: f32,
    pub spinning: bool,
}

impl ModelTransform {
    pub fn new(translation: Vec3, rotation_speed: f32, spinning: bool) -> Self {
        Self {
            translation,
            angle: 0.0,
            rotation_speed,
            spinning,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.spinning {
            self.angle = (self.angle + self.rotation_speed * dt) % std::f32::consts::TAU;
        }
    }

    pub fn toggle_spinning(&mut self) {
        self.spinning = !self.spinning;
        log::info!("Spinning {}", if self.spinning { "on" } else { "off" });
    }

    pub fn world_matrix(&self) -> Matrix {
        Matrix::scale(Vec3::ONE) * Matrix::rotation_y(self.angle) * Matrix::translation(self.translation)
    }
}
