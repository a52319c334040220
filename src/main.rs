//! Dual Rasterizer: CPU rasterization of a textured, normal-mapped mesh
//!
//! - Perspective-correct attribute interpolation
//! - Lambert + Phong shading under a fixed directional light
//! - Tangent-space normal mapping
//! - Depth buffer and bounding box debug views

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod config;
mod scene;
mod app;

use macroquad::prelude::*;
use app::{Action, AppState};
use rasterizer::{HEIGHT, WIDTH};

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Dual Rasterizer v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::load_or_default(&config_path);

    let mut app = AppState::new(config);

    log::info!("=== Dual Rasterizer v{} ===", VERSION);
    for action in Action::ALL {
        log::info!("  [{:?}] {}", action.key(), action.label());
    }

    // One GPU texture, refreshed from the color buffer every frame
    let texture = Texture2D::from_rgba8(WIDTH as u16, HEIGHT as u16, &vec![0; WIDTH * HEIGHT * 4]);
    texture.set_filter(FilterMode::Nearest);

    loop {
        if let Some(action) = get_last_key_pressed().and_then(Action::from_key) {
            app.apply(action);
        }

        app.update(get_frame_time());
        let fb = app.render();

        // Blit the color buffer, stretched to the window
        texture.update_from_bytes(fb.width as u32, fb.height as u32, &fb.pixels);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
