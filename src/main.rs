//! softpipe: software 3D rendering pipeline
//!
//! Meshes are transformed, clipped, projected and rasterized on the CPU into
//! a framebuffer that macroquad only presents:
//! - View-space frustum clipping
//! - Flat shading from a directional light
//! - Perspective-correct texture mapping with a depth buffer
//! - Wireframe, vertex, fill and texture render modes toggled at runtime

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod world;
mod pipeline;
mod input;
mod app;

use std::path::{Path, PathBuf};
use macroquad::prelude::*;
use tracing::{error, info, warn};
use app::{AppState, FrameClock};
use input::poll_input;
use pipeline::RenderContext;
use rasterizer::Framebuffer;
use world::{load_scene, save_scene, SceneConfig, SceneError};

/// Flag that writes the default scene to a file and exits
const WRITE_SCENE_FLAG: &str = "--write-scene";

/// Optional scene file from the first command-line argument
fn scene_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .filter(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
}

/// Target of `--write-scene <path>`
fn write_scene_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(flag) if flag == WRITE_SCENE_FLAG => args.next().map(PathBuf::from),
        _ => None,
    }
}

fn read_scene() -> Result<(SceneConfig, PathBuf), SceneError> {
    match scene_path() {
        Some(path) => {
            let scene = load_scene(&path)?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            Ok((scene, base_dir))
        }
        None => Ok((SceneConfig::default(), PathBuf::from("."))),
    }
}

fn window_conf() -> Conf {
    // errors are reported once logging is up, in main
    let scene = read_scene().map(|(s, _)| s).unwrap_or_default();
    Conf {
        window_title: format!("softpipe v{}", VERSION),
        window_width: scene.width as i32,
        window_height: scene.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Upload the framebuffer and stretch it over the window
fn present(fb: &Framebuffer) {
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.to_rgba_bytes());
    texture.set_filter(FilterMode::Nearest);

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
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Some(path) = write_scene_path() {
        match save_scene(&SceneConfig::default(), &path) {
            Ok(()) => info!(path = %path.display(), "Wrote default scene"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write scene"),
        }
        return;
    }

    let (scene, base_dir) = match read_scene() {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!(error = %e, "Failed to load scene, using default");
            (SceneConfig::default(), PathBuf::from("."))
        }
    };

    let mut ctx = match RenderContext::from_scene(&scene, &base_dir) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "Failed to build scene");
            return;
        }
    };

    let mut fb = Framebuffer::new(scene.width, scene.height);
    let mut app = AppState::new(scene.render);
    let mut clock = FrameClock::new(scene.fps);

    info!(
        width = scene.width,
        height = scene.height,
        fps = scene.fps,
        frame_ms = clock.target().as_millis() as u64,
        meshes = ctx.meshes().len(),
        "=== softpipe v{} ===",
        VERSION
    );

    while app.running {
        let delta_time = clock.tick();

        for event in poll_input(delta_time) {
            app.apply(event, &mut ctx.camera);
        }

        ctx.update(delta_time);
        ctx.render_frame(&mut fb, &app.settings());

        clear_background(BLACK);
        present(&fb);

        next_frame().await;
    }

    info!("Shutting down");
}
