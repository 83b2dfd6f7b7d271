//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with the track, photo cluster and image markers
//! - One info popup shared by all markers
//! - Toggleable sidebar (layers, tiles provider, reload)
//! - Responsive layout (sidebar from bottom on portrait displays)

mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;
mod widget;

use crate::app::plugin::{MarkerPlugin, PluginOutput};
use crate::app::settings::Settings;
use crate::app::state::{AppState, TilesProvider, UiSettings};
use crate::app::widget::WalkersWidget;
use eframe::egui;
use std::sync::{Arc, RwLock};
use trail_map_lib::{MapData, initialize_map};
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

const PERSISTED_SETTINGS_KEY: &str = "persisted_settings";

/// Main application structure
pub struct TrailMapApp {
    /// Application state (data, popup, UI settings)
    state: AppState,

    /// The map widget the markers are created on
    widget: WalkersWidget,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Shared plugin output (updated by the plugin each frame)
    plugin_output: Arc<RwLock<PluginOutput>>,
}

impl TrailMapApp {
    /// `provided` replaces the data directory (used by the web build)
    pub fn new(cc: &eframe::CreationContext<'_>, provided: Option<MapData>) -> Self {
        let cli_args = Settings::from_cli();

        let ui_settings = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            UiSettings::default()
        } else {
            cc.storage
                .map(Self::load_persisted_settings)
                .unwrap_or_default()
        };

        let state = AppState::new(&cli_args, provided, ui_settings);

        // Thumbnails in the popups are loaded from file:// or http(s):// URLs
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        tracing::info!("Initialized, map data from {}", state.loader.source.describe());

        Self {
            state,
            widget: WalkersWidget::default(),
            tiles_osm,
            tiles_otm,
            map_memory: MapMemory::default(),
            plugin_output: Arc::new(RwLock::new(PluginOutput::default())),
        }
    }

    /// Load persisted settings from storage
    fn load_persisted_settings(storage: &dyn eframe::Storage) -> UiSettings {
        if let Some(json) = storage.get_string(PERSISTED_SETTINGS_KEY)
            && !json.is_empty()
        {
            match serde_json::from_str::<UiSettings>(&json) {
                Ok(settings) => {
                    tracing::info!("Restored settings");
                    return settings;
                }
                Err(e) => tracing::warn!("Ignoring invalid persisted settings: {}", e),
            }
        }

        tracing::info!("No persisted settings found, starting fresh");
        UiSettings::default()
    }

    /// Start a load when requested or due, and apply a finished one
    fn process_loading(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);

        if self.state.loader.refresh_due(now) {
            tracing::debug!("Periodic reload of the map data");
            self.state.pending_reload = true;
        }
        if self.state.pending_reload && !self.state.loader.is_loading() {
            self.state.pending_reload = false;
            self.state.loader.start_load(now);
        }

        match self.state.loader.poll() {
            Some(Ok(data)) => self.apply_data(data),
            Some(Err(e)) => self.fail(e),
            None => {}
        }

        if self.state.loader.is_loading() {
            ctx.request_repaint();
        } else if self.state.loader.refresh_secs > 0 {
            ctx.request_repaint_after(std::time::Duration::from_secs(
                self.state.loader.refresh_secs,
            ));
        }
    }

    /// Create the map and its markers for freshly loaded data
    fn apply_data(&mut self, data: MapData) {
        profiling::scope!("apply_data");

        match initialize_map(&mut self.widget, data) {
            Ok(layout) => self.state.set_layout(layout),
            Err(e) => self.fail(format!("Failed to initialize the map: {}", e)),
        }
    }

    /// Show `error` instead of the map data, markers included
    fn fail(&mut self, error: String) {
        self.widget.clear_markers();
        self.state.set_error(error);
    }

    /// Move the camera to the view requested by the map initialization
    fn recenter(&mut self) {
        let Some(options) = self.widget.options() else {
            return;
        };
        let zoom = self.state.zoom.unwrap_or(options.zoom);

        self.map_memory
            .center_at(walkers::lat_lon(options.center.y(), options.center.x()));
        if self.map_memory.set_zoom(zoom).is_err() {
            tracing::warn!("Invalid zoom level {}", zoom);
        }
        tracing::debug!(
            "Centered at ({:.5}, {:.5}), zoom {}",
            options.center.y(),
            options.center.x(),
            zoom
        );
    }

    /// Open the popup for a marker clicked on the map
    ///
    /// Returns where the popup points, unknown on the frame of a click.
    fn handle_click(&mut self) -> Option<egui::Pos2> {
        let (clicked, anchor) = {
            // Use try_write for non-blocking UI polling.
            let Ok(mut output) = self.plugin_output.try_write() else {
                return None;
            };
            output.take_click()
        };

        if let Some(id) = clicked
            && let Some(layout) = &self.state.layout
        {
            layout.handle_click(id, &mut self.state.popup);
        }
        anchor
    }
}

#[profiling::all_functions]
impl eframe::App for TrailMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_loading(ctx);

        if self.state.pending_recenter && self.state.layout.is_some() {
            self.state.pending_recenter = false;
            self.recenter();
        }

        // Render the main sidebar (responsive: side or bottom based on orientation)
        ui_panels::render_sidebar(ctx, &mut self.state);

        let mut anchor = None;

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles_provider = self.state.ui_settings.tiles_provider;
                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let my_position = self
                    .widget
                    .options()
                    .map(|options| walkers::lat_lon(options.center.y(), options.center.x()))
                    .unwrap_or_else(|| walkers::lat_lon(0.0, 0.0));

                let marker_plugin = MarkerPlugin::new(
                    self.widget.markers(),
                    self.state.ui_settings.layers,
                    self.state.popup.anchor(),
                    self.plugin_output.clone(),
                );

                let map = Map::new(Some(tiles), &mut self.map_memory, my_position)
                    .with_plugin(marker_plugin);
                ui.add(map);

                anchor = self.handle_click();

                ui_panels::sidebar_toggle_button(ui, &mut self.state);
                ui_panels::attribution(ui, tiles_provider);

                if self.state.layout.is_none() {
                    let message = match &self.state.loader.error {
                        Some(error) => StatusMessage::Error(error.clone()),
                        None => StatusMessage::Loading,
                    };
                    message.show(ui);
                }
            });

        if self.state.popup.is_open() {
            match anchor {
                Some(anchor) => ui_panels::popup_window(ctx, &mut self.state.popup, anchor),
                // Just opened: the plugin reports the anchor position next frame
                None => ctx.request_repaint(),
            }
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = serde_json::to_string(&self.state.ui_settings) {
            storage.set_string(PERSISTED_SETTINGS_KEY, json);
            tracing::debug!("Saved settings");
        }
    }
}

/// Centered message shown instead of the markers
enum StatusMessage {
    Loading,
    Error(String),
}

impl StatusMessage {
    fn show(&self, ui: &egui::Ui) {
        let (text, color) = match self {
            Self::Loading => ("Loading map data...".to_string(), ui.visuals().text_color()),
            Self::Error(error) => (format!("⚠ {}", error), ui.visuals().error_fg_color),
        };
        let rect = ui.max_rect();
        let galley = ui.painter().layout(
            text,
            egui::FontId::proportional(16.0),
            color,
            rect.width() * 0.8,
        );
        let pos = rect.center() - galley.size() / 2.0;
        ui.painter().rect_filled(
            egui::Rect::from_min_size(pos, galley.size()).expand(10.0),
            5.0,
            ui.visuals().window_fill,
        );
        ui.painter().galley(pos, galley, color);
    }
}
