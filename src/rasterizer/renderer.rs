//! Owns the frame buffer and the scene it draws every frame

use std::path::Path;
use thiserror::Error;
use super::camera::Camera;
use super::math::Matrix;
use super::render::{render_mesh, Framebuffer};
use super::settings::RenderConfig;
use super::shading::TextureSet;
use super::types::Mesh;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to write frame: {0}")]
    Image(#[from] image::ImageError),
}

pub struct SoftwareRenderer {
    fb: Framebuffer,
    meshes: Vec<Mesh>,
    textures: TextureSet,
}

impl SoftwareRenderer {
    pub fn new(width: usize, height: usize, meshes: Vec<Mesh>, textures: TextureSet) -> Self {
        Self {
            fb: Framebuffer::new(width, height),
            meshes,
            textures,
        }
    }

    /// Push a new world transform to every mesh
    pub fn update(&mut self, world: Matrix) {
        for mesh in &mut self.meshes {
            mesh.world = world;
        }
    }

    /// Clear and draw one frame
    pub fn render(&mut self, camera: &Camera, config: &RenderConfig) -> &Framebuffer {
        self.fb.clear(config.background().to_color());

        let materials = self.textures.materials();
        for mesh in &self.meshes {
            render_mesh(&mut self.fb, mesh, camera, &materials, config);
        }
        &self.fb
    }

    /// Write the current color buffer as a 24-bit BMP
    pub fn save_frame_to_image(&self, path: impl AsRef<Path>) -> Result<(), CaptureError> {
        let rgb: Vec<u8> = self
            .fb
            .pixels
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect();

        image::save_buffer_with_format(
            path,
            &rgb,
            self.fb.width as u32,
            self.fb.height as u32,
            image::ColorType::Rgb8,
            image::ImageFormat::Bmp,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::{Vec2, Vec3};
    use crate::rasterizer::settings::CullMode;
    use crate::rasterizer::types::{ColorRGB, PrimitiveTopology, Texture, Vertex};

    fn textures() -> TextureSet {
        TextureSet {
            diffuse: Texture::solid(ColorRGB::WHITE, "diffuse"),
            normal: Texture::solid(ColorRGB::new(0.5, 0.5, 1.0), "normal"),
            specular: Texture::solid(ColorRGB::BLACK, "specular"),
            gloss: Texture::solid(ColorRGB::BLACK, "gloss"),
        }
    }

    /// Quad facing the camera, 10 units in front of it
    fn quad() -> Mesh {
        let n = Vec3::new(0.0, 0.0, -1.0);
        let t = Vec3::UNIT_X;
        let vertices = vec![
            Vertex::new(Vec3::new(-3.0, 3.0, 10.0), Vec2::new(0.0, 0.0), n, t),
            Vertex::new(Vec3::new(3.0, 3.0, 10.0), Vec2::new(1.0, 0.0), n, t),
            Vertex::new(Vec3::new(-3.0, -3.0, 10.0), Vec2::new(0.0, 1.0), n, t),
            Vertex::new(Vec3::new(3.0, -3.0, 10.0), Vec2::new(1.0, 1.0), n, t),
        ];
        Mesh::new(vertices, vec![0, 1, 2, 3], PrimitiveTopology::TriangleStrip)
    }

    fn camera() -> Camera {
        Camera::new(1.0, Vec3::ZERO, 90.0, 0.1, 100.0)
    }

    #[test]
    fn test_empty_scene_clears_to_background() {
        let mut renderer = SoftwareRenderer::new(8, 8, Vec::new(), textures());
        let config = RenderConfig::default();
        let fb = renderer.render(&camera(), &config);
        let expected = config.background().to_color();
        assert_eq!(fb.get_pixel(0, 0), expected);
        assert_eq!(fb.get_pixel(7, 7), expected);
        assert_eq!(fb.depth(3, 3), f32::MAX);
    }

    #[test]
    fn test_uniform_clear_color_changes_background() {
        let mut renderer = SoftwareRenderer::new(4, 4, Vec::new(), textures());
        let mut config = RenderConfig::default();
        let default_bg = renderer.render(&camera(), &config).get_pixel(0, 0);
        config.toggle_uniform_clear_color();
        let uniform_bg = renderer.render(&camera(), &config).get_pixel(0, 0);
        assert_ne!(default_bg, uniform_bg);
    }

    #[test]
    fn test_quad_covers_center() {
        let mut renderer = SoftwareRenderer::new(32, 32, vec![quad()], textures());
        let config = RenderConfig {
            cull_mode: CullMode::NoCulling,
            ..RenderConfig::default()
        };
        let fb = renderer.render(&camera(), &config);
        // Off the shared diagonal, inside the first triangle
        assert!(fb.depth(14, 14) < 1.0);
        // Corners stay untouched
        assert_eq!(fb.depth(0, 0), f32::MAX);
    }

    #[test]
    fn test_update_moves_mesh_out_of_view() {
        let mut renderer = SoftwareRenderer::new(32, 32, vec![quad()], textures());
        let config = RenderConfig {
            cull_mode: CullMode::NoCulling,
            ..RenderConfig::default()
        };
        renderer.update(Matrix::translation(Vec3::new(0.0, 0.0, -50.0)));
        let fb = renderer.render(&camera(), &config);
        assert!(fb.zbuffer.iter().all(|&z| z == f32::MAX));
    }

    #[test]
    fn test_save_frame_writes_bmp() {
        let mut renderer = SoftwareRenderer::new(6, 4, Vec::new(), textures());
        let config = RenderConfig::default();
        renderer.render(&camera(), &config);

        let path = std::env::temp_dir().join("dual_rasterizer_capture_test.bmp");
        renderer.save_frame_to_image(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (6, 4));
        let bg = config.background().to_color();
        assert_eq!(img.get_pixel(2, 1).0, [bg.r, bg.g, bg.b]);
        let _ = std::fs::remove_file(&path);
    }
}
