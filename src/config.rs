//! Application configuration
//!
//! Stored as RON next to the binary. Every field has a default, so a partial
//! file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::rasterizer::{RenderConfig, Vec3};

pub const DEFAULT_CONFIG_PATH: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mesh_path: PathBuf,
    pub diffuse_path: PathBuf,
    pub normal_path: PathBuf,
    pub specular_path: PathBuf,
    pub gloss_path: PathBuf,

    pub camera_origin: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    pub model_translation: Vec3,
    pub spin: bool,
    /// Radians per second
    pub rotation_speed: f32,

    pub capture_path: PathBuf,
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from("Resources/vehicle.obj"),
            diffuse_path: PathBuf::from("Resources/vehicle_diffuse.png"),
            normal_path: PathBuf::from("Resources/vehicle_normal.png"),
            specular_path: PathBuf::from("Resources/vehicle_specular.png"),
            gloss_path: PathBuf::from("Resources/vehicle_gloss.png"),
            camera_origin: Vec3::ZERO,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            model_translation: Vec3::new(0.0, 0.0, 50.0),
            spin: false,
            rotation_speed: std::f32::consts::FRAC_PI_4,
            capture_path: PathBuf::from("Rasterizer_ColorBuffer.bmp"),
            render: RenderConfig::default(),
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

pub fn load_config_from_str(s: &str) -> Result<AppConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load `path`, falling back to defaults when it is missing or malformed.
/// A missing file is created from the defaults as an editable template.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> AppConfig {
    let path = path.as_ref();
    if !path.exists() {
        let config = AppConfig::default();
        match save_config(&config, path) {
            Ok(()) => log::info!("No config at {}, wrote defaults there", path.display()),
            Err(e) => log::warn!("No config at {}, using defaults ({})", path.display(), e),
        }
        return config;
    }

    match load_config(path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Ignoring config {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{CullMode, ShadingMode};

    #[test]
    fn test_round_trip_through_file() {
        let mut config = AppConfig::default();
        config.spin = true;
        config.fov = 60.0;
        config.render.shading_mode = ShadingMode::Specular;
        config.render.cull_mode = CullMode::NoCulling;

        let path = std::env::temp_dir().join("dual_rasterizer_config_test.ron");
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = load_config_from_str("(spin: true, far: 500.0)").unwrap();
        assert!(config.spin);
        assert_eq!(config.far, 500.0);
        assert_eq!(config.near, AppConfig::default().near);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_partial_render_section() {
        let config = load_config_from_str("(render: (show_depth_buffer: true))").unwrap();
        assert!(config.render.show_depth_buffer);
        assert!(config.render.use_normal_map);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let err = load_config_from_str("(spin: maybe").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_writes_default_template() {
        let path = std::env::temp_dir().join("dual_rasterizer_template_config.ron");
        let _ = fs::remove_file(&path);

        assert_eq!(load_or_default(&path), AppConfig::default());
        assert!(path.exists());
        assert_eq!(load_config(&path).unwrap(), AppConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_is_left_alone() {
        let path = std::env::temp_dir().join("dual_rasterizer_malformed_config.ron");
        fs::write(&path, "(fov: ").unwrap();

        assert_eq!(load_or_default(&path), AppConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "(fov: ");
        let _ = fs::remove_file(&path);
    }
}
