//! Trail Map Viewer - Application Library
//!
//! The egui/eframe application showing the track, photo clusters and images
//! of a trip on a `walkers` map, with one shared info popup.

mod app;
mod entrypoints;

pub use app::TrailMapApp;

#[cfg(not(target_arch = "wasm32"))]
pub use entrypoints::run::native_main;

#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;
