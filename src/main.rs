#![warn(clippy::all, rust_2018_idioms)]

use doodle_canvas::{CanvasConfig, DoodleApp};

fn main() -> eframe::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = match std::env::args().nth(1) {
        Some(path) => CanvasConfig::load(&path).unwrap_or_else(|err| {
            log::error!("Could not load config from {}: {}", path, err);
            CanvasConfig::default()
        }),
        None => CanvasConfig::default(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Doodle Canvas")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Doodle Canvas",
        native_options,
        Box::new(|cc| Ok(Box::new(DoodleApp::new(cc, config)))),
    )
}
