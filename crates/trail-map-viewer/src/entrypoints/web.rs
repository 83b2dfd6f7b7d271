//! Web entry point
//!
//! The page passes the map data as JSON to [`WebHandle::start`], so the web
//! build needs no file access. Thumbnails are fetched relative to the data's
//! base URL.

use super::logging::setup_logging;
use super::metadata::log_version_info;
use super::run::APP_NAME;
use crate::app::TrailMapApp;
use trail_map_lib::MapData;
use wasm_bindgen::prelude::*;

/// Handle to the web app from JavaScript.
#[derive(Clone)]
#[wasm_bindgen]
pub struct WebHandle {
    runner: eframe::WebRunner,
}

#[wasm_bindgen]
impl WebHandle {
    /// Installs logging and the panic hook, then returns.
    #[allow(clippy::new_without_default)]
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        setup_logging();
        log_version_info();

        Self {
            runner: eframe::WebRunner::new(),
        }
    }

    /// Call this once from JavaScript to start the app.
    ///
    /// `map_data` is the JSON form of the map data (track points, optional
    /// clusters and images layers, base URL). Without it the app starts empty
    /// and shows an error.
    #[wasm_bindgen]
    pub async fn start(
        &self,
        canvas: web_sys::HtmlCanvasElement,
        map_data: Option<String>,
    ) -> Result<(), wasm_bindgen::JsValue> {
        let data = match map_data {
            Some(json) => Some(serde_json::from_str::<MapData>(&json).map_err(|e| {
                tracing::error!("Invalid map data: {}", e);
                JsValue::from_str(&format!("Invalid map data: {}", e))
            })?),
            None => None,
        };
        tracing::info!("Starting {} on the web", APP_NAME);

        self.runner
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(TrailMapApp::new(cc, data)))),
            )
            .await
    }

    /// Destroys the app and frees resources.
    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    /// The JavaScript can check whether or not the app has crashed.
    #[wasm_bindgen]
    pub fn has_panicked(&self) -> bool {
        self.runner.has_panicked()
    }

    /// Returns the panic message if the app has panicked.
    #[wasm_bindgen]
    pub fn panic_message(&self) -> Option<String> {
        self.runner.panic_summary().map(|s| s.message())
    }

    /// Returns the panic callstack if the app has panicked.
    #[wasm_bindgen]
    pub fn panic_callstack(&self) -> Option<String> {
        self.runner.panic_summary().map(|s| s.callstack())
    }
}
