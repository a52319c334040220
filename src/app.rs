//! Application state and key-driven actions
//!
//! Input is mapped to a fixed set of actions. Each action mutates either the
//! render configuration, the model transform, or app-level flags; the next
//! `render` picks the change up.

use macroquad::prelude::KeyCode;
use crate::config::AppConfig;
use crate::rasterizer::{Camera, Framebuffer, Mesh, SoftwareRenderer, TextureSet, HEIGHT, WIDTH};
use crate::scene::{load_mesh_or_placeholder, load_textures, ModelTransform};

/// Everything a key press can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ToggleSpin,
    CycleShadingMode,
    ToggleNormalMap,
    ToggleDepthView,
    ToggleBoundingBoxes,
    CycleCullMode,
    ToggleClearColor,
    TogglePrintFps,
    SaveFrame,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::ToggleSpin,
        Action::CycleShadingMode,
        Action::ToggleNormalMap,
        Action::ToggleDepthView,
        Action::ToggleBoundingBoxes,
        Action::CycleCullMode,
        Action::ToggleClearColor,
        Action::TogglePrintFps,
        Action::SaveFrame,
    ];

    pub fn key(&self) -> KeyCode {
        match self {
            Action::ToggleSpin => KeyCode::F2,
            Action::CycleShadingMode => KeyCode::F5,
            Action::ToggleNormalMap => KeyCode::F6,
            Action::ToggleDepthView => KeyCode::F7,
            Action::ToggleBoundingBoxes => KeyCode::F8,
            Action::CycleCullMode => KeyCode::F9,
            Action::ToggleClearColor => KeyCode::F10,
            Action::TogglePrintFps => KeyCode::F11,
            Action::SaveFrame => KeyCode::F12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::ToggleSpin => "Toggle rotation",
            Action::CycleShadingMode => "Cycle shading mode",
            Action::ToggleNormalMap => "Toggle normal map",
            Action::ToggleDepthView => "Toggle depth buffer view",
            Action::ToggleBoundingBoxes => "Toggle bounding box view",
            Action::CycleCullMode => "Cycle cull mode",
            Action::ToggleClearColor => "Toggle uniform clear color",
            Action::TogglePrintFps => "Toggle FPS printing",
            Action::SaveFrame => "Save frame to image",
        }
    }

    pub fn from_key(key: KeyCode) -> Option<Action> {
        Action::ALL.iter().copied().find(|a| a.key() == key)
    }
}

/// Frame counter that reports once per second
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: f32,
    frames: u32,
}

impl FpsCounter {
    fn tick(&mut self, dt: f32) -> Option<u32> {
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames;
        self.elapsed -= 1.0;
        self.frames = 0;
        Some(fps)
    }
}

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    pub camera: Camera,
    pub model: ModelTransform,
    pub renderer: SoftwareRenderer,
    pub print_fps: bool,
    fps: FpsCounter,
}

impl AppState {
    /// Load the configured assets, falling back to placeholders
    pub fn new(config: AppConfig) -> Self {
        let mesh = load_mesh_or_placeholder(&config.mesh_path);
        let textures = load_textures(&config);
        Self::with_assets(config, vec![mesh], textures)
    }

    pub fn with_assets(config: AppConfig, meshes: Vec<Mesh>, textures: TextureSet) -> Self {
        let camera = Camera::new(
            WIDTH as f32 / HEIGHT as f32,
            config.camera_origin,
            config.fov,
            config.near,
            config.far,
        );
        let model = ModelTransform::new(config.model_translation, config.rotation_speed, config.spin);

        let mut renderer = SoftwareRenderer::new(WIDTH, HEIGHT, meshes, textures);
        renderer.update(model.world_matrix());

        Self {
            config,
            camera,
            model,
            renderer,
            print_fps: false,
            fps: FpsCounter::default(),
        }
    }

    pub fn apply(&mut self, action: Action) {
        let render = &mut self.config.render;
        match action {
            Action::ToggleSpin => self.model.toggle_spinning(),
            Action::CycleShadingMode => render.toggle_shading_mode(),
            Action::ToggleNormalMap => render.toggle_normal_map(),
            Action::ToggleDepthView => render.toggle_depth_buffer_view(),
            Action::ToggleBoundingBoxes => render.toggle_bounding_box_view(),
            Action::CycleCullMode => render.toggle_cull_mode(),
            Action::ToggleClearColor => render.toggle_uniform_clear_color(),
            Action::TogglePrintFps => {
                self.print_fps = !self.print_fps;
                log::info!("Print FPS {}", if self.print_fps { "on" } else { "off" });
            }
            Action::SaveFrame => {
                let path = &self.config.capture_path;
                match self.renderer.save_frame_to_image(path) {
                    Ok(()) => log::info!("Saved frame to {}", path.display()),
                    Err(e) => log::error!("Could not save frame to {}: {}", path.display(), e),
                }
            }
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.model.update(dt);
        self.renderer.update(self.model.world_matrix());

        if let Some(fps) = self.fps.tick(dt) {
            if self.print_fps {
                log::info!("FPS: {}", fps);
            }
        }
    }

    pub fn render(&mut self) -> &Framebuffer {
        self.renderer.render(&self.camera, &self.config.render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{ColorRGB, ShadingMode, Texture};
    use crate::scene::placeholder_quad;

    fn test_app() -> AppState {
        let textures = TextureSet {
            diffuse: Texture::solid(ColorRGB::WHITE, "diffuse"),
            normal: Texture::solid(ColorRGB::new(0.5, 0.5, 1.0), "normal"),
            specular: Texture::solid(ColorRGB::BLACK, "specular"),
            gloss: Texture::solid(ColorRGB::BLACK, "gloss"),
        };
        AppState::with_assets(AppConfig::default(), vec![placeholder_quad()], textures)
    }

    #[test]
    fn test_every_action_has_a_unique_key() {
        for action in Action::ALL {
            assert_eq!(Action::from_key(action.key()), Some(action));
        }
        assert_eq!(Action::from_key(KeyCode::F1), None);
    }

    #[test]
    fn test_actions_toggle_render_config() {
        let mut app = test_app();
        app.apply(Action::CycleShadingMode);
        assert_eq!(app.config.render.shading_mode, ShadingMode::ObservedArea);
        app.apply(Action::ToggleNormalMap);
        assert!(!app.config.render.use_normal_map);
        app.apply(Action::ToggleDepthView);
        app.apply(Action::ToggleDepthView);
        assert!(!app.config.render.show_depth_buffer);
        app.apply(Action::TogglePrintFps);
        assert!(app.print_fps);
    }

    #[test]
    fn test_spin_changes_world_matrix() {
        let mut app = test_app();
        let before = app.model.world_matrix();
        app.update(0.1);
        assert_eq!(app.model.world_matrix(), before);

        app.apply(Action::ToggleSpin);
        app.update(0.1);
        assert_ne!(app.model.world_matrix(), before);
    }

    #[test]
    fn test_placeholder_quad_is_visible() {
        let mut app = test_app();
        let fb = app.render();
        let (cx, cy) = (WIDTH / 2 - 3, HEIGHT / 2 - 3);
        assert!(fb.depth(cx, cy) < 1.0);
        assert_eq!(fb.depth(0, 0), f32::MAX);
    }

    #[test]
    fn test_fps_counter_reports_once_per_second() {
        let mut fps = FpsCounter::default();
        let reports: Vec<u32> = (0..25).filter_map(|_| fps.tick(0.1)).collect();
        assert_eq!(reports.len(), 2);
        assert!(reports[0] >= 10 && reports[0] <= 11);
    }
}
