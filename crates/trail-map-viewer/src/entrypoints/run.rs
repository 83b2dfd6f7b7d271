#[cfg(not(target_arch = "wasm32"))]
use super::{logging::setup_logging, metadata::log_version_info};
#[cfg(not(target_arch = "wasm32"))]
use crate::app::TrailMapApp;

pub const APP_NAME: &str = "Trail Map";

/// Native entry point: open the viewer window
#[cfg(not(target_arch = "wasm32"))]
pub async fn native_main() {
    // Must run before anything logs
    setup_logging();
    log_version_info();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(TrailMapApp::new(cc, None)))),
    ) {
        tracing::error!("Failed to run {}: {}", APP_NAME, e);
    }
}
