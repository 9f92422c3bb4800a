//! Trirast: CPU-only triangle rasterizer
//!
//! Everything between the mesh and the pixels happens on the CPU:
//! - Homogeneous transforms, backface culling, flat shading
//! - Near-plane and screen-edge triangle clipping
//! - Painter's algorithm ordering (no depth test)
//! - Bounding-box fill with an equal-areas inside test
//!
//! The window only shows the finished frame and collects held keys.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod scene;

use macroquad::prelude::*;
use scene::{load_config, load_obj, CameraInput, RenderConfig, Scene};
use std::path::Path;
use std::sync::OnceLock;

/// Optional settings file in the working directory
const SETTINGS_FILE: &str = "trirast.ron";

/// Window pixels per frame pixel
const WINDOW_SCALE: usize = 2;

/// Prints log records to stderr
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// One-shot requests from the keyboard, handled between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostAction {
    ToggleWireframe,
    RemoveLastMesh,
    Screenshot,
    #[cfg(not(target_arch = "wasm32"))]
    OpenMesh,
}

/// Window side for a frame side, scaled and clamped to what the window API takes
fn window_side(frame_side: usize) -> i32 {
    i32::try_from(frame_side.saturating_mul(WINDOW_SCALE)).unwrap_or(i32::MAX)
}

fn window_conf() -> Conf {
    let config = settings();
    Conf {
        window_title: format!("Trirast v{}", VERSION),
        window_width: window_side(config.width),
        window_height: window_side(config.height),
        window_resizable: true,
        ..Default::default()
    }
}

/// Settings read once, shared by the window setup and the scene
fn settings() -> &'static RenderConfig {
    static SETTINGS: OnceLock<RenderConfig> = OnceLock::new();
    SETTINGS.get_or_init(load_settings)
}

fn load_settings() -> RenderConfig {
    if !Path::new(SETTINGS_FILE).exists() {
        return RenderConfig::default();
    }
    match load_config(SETTINGS_FILE) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}, using defaults", SETTINGS_FILE, e);
            RenderConfig::default()
        }
    }
}

fn add_mesh_from<P: AsRef<Path>>(scene: &mut Scene, path: P) {
    match load_obj(path.as_ref()) {
        Ok(mesh) => {
            scene.add_mesh(mesh);
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}", path.as_ref().display(), e);
        }
    }
}

/// Keys held right now
fn read_camera_input() -> CameraInput {
    CameraInput {
        forward: is_key_down(KeyCode::W),
        backward: is_key_down(KeyCode::S),
        turn_left: is_key_down(KeyCode::A),
        turn_right: is_key_down(KeyCode::D),
    }
}

fn read_actions() -> Vec<HostAction> {
    let mut actions = Vec::new();
    if is_key_pressed(KeyCode::Tab) {
        actions.push(HostAction::ToggleWireframe);
    }
    if is_key_pressed(KeyCode::Backspace) {
        actions.push(HostAction::RemoveLastMesh);
    }
    if is_key_pressed(KeyCode::P) {
        actions.push(HostAction::Screenshot);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if is_key_pressed(KeyCode::O) {
            actions.push(HostAction::OpenMesh);
        }
    }
    actions
}

fn handle_action(action: HostAction, scene: &mut Scene, screenshots: &mut u32) {
    match action {
        HostAction::ToggleWireframe => {
            let on = !scene.config().wireframe;
            scene.set_wireframe(on);
        }
        HostAction::RemoveLastMesh => {
            if scene.mesh_count() > 0 {
                scene.remove_mesh(scene.mesh_count() - 1);
            }
        }
        HostAction::Screenshot => {
            let path = format!("frame_{:03}.png", *screenshots);
            *screenshots += 1;
            if let Err(e) = scene.framebuffer().save_png(&path) {
                eprintln!("Screenshot failed: {}", e);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        HostAction::OpenMesh => {
            let dialog = rfd::FileDialog::new().add_filter("Wavefront OBJ", &["obj"]);
            if let Some(path) = dialog.pick_file() {
                add_mesh_from(scene, path);
            }
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }

    let mut scene = match Scene::new(settings().clone()) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Cannot create frame: {}", e);
            return;
        }
    };

    match std::env::args().nth(1) {
        Some(path) => add_mesh_from(&mut scene, path),
        None => println!("No model given, press O to open an OBJ file"),
    }

    // FPS roll-over runs on wall time, once a second
    let stats = scene.stats();
    let mut next_roll_over = get_time() + 1.0;
    let mut screenshots = 0;

    println!("=== Trirast v{} ===", VERSION);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let input = read_camera_input();
        let frame = scene.render(&input);

        for action in read_actions() {
            handle_action(action, &mut scene, &mut screenshots);
        }

        let now = get_time();
        if now >= next_roll_over {
            stats.roll_over();
            next_roll_over = now + 1.0;
        }

        clear_background(BLACK);

        let texture = Texture2D::from_rgba8(frame.width() as u16, frame.height() as u16, frame.as_raw());
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

        // Debug info
        draw_text(&format!("FPS: {}", scene.fps()), 20.0, 36.0, 20.0, WHITE);
        draw_text(&format!("Camera: {}", scene.camera().position), 20.0, 56.0, 20.0, WHITE);

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_follows_frame_size() {
        let config = RenderConfig { width: 320, height: 240, ..RenderConfig::default() };
        assert_eq!((window_side(config.width), window_side(config.height)), (640, 480));
        assert_eq!(window_side(usize::MAX), i32::MAX);
    }
}
