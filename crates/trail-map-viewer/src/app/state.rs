//! Application state management
//!
//! This module manages the map data source and its (re)loading, the marker
//! layout with the shared popup, and the UI settings.

use crate::app::settings::Settings;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use trail_map_lib::{DataStore, InfoPopup, MapData, MapLayout, MarkerAction, Result};

/// Main application state
pub struct AppState {
    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Data loading state
    pub loader: DataLoader,

    /// Markers of the loaded data (None until the first successful load)
    pub layout: Option<MapLayout>,

    /// The info popup shared by all markers
    pub popup: InfoPopup,

    /// Initial zoom override from the command line
    pub zoom: Option<f64>,

    /// Move the map to the layout's view once it is available
    pub pending_recenter: bool,

    /// Reload the data on the next frame
    pub pending_reload: bool,

    /// Statistics about loaded data
    pub stats: Stats,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Layer visibility
    pub layers: LayerVisibility,
}

/// Which marker layers are drawn
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerVisibility {
    pub track: bool,
    pub clusters: bool,
    pub images: bool,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TilesProvider {
    #[default]
    OpenStreetMap,
    OpenTopoMap,
}

/// Where the map data comes from
#[derive(Clone, Debug)]
pub enum DataSource {
    /// The data directory written by the pipeline
    Directory { store: DataStore, base_url: String },
    /// Data handed over by the host page (web)
    Provided(MapData),
}

/// Map data loading state
pub struct DataLoader {
    pub source: DataSource,

    /// Load the optional images layer
    pub with_images: bool,

    /// Load the optional clusters layer
    pub with_clusters: bool,

    /// Reload interval in seconds (0 = never)
    pub refresh_secs: u64,

    /// Result of the load in progress
    pending: Option<oneshot::Receiver<Result<MapData>>>,

    /// `egui` time of the last load start
    pub last_load_time: Option<f64>,

    /// Last load or initialization error
    pub error: Option<String>,
}

/// Statistics about loaded data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    pub track_points: usize,
    pub clusters: usize,
    pub cluster_photos: usize,
    pub images: usize,
    pub markers: usize,
    /// Timestamp of the last track point
    pub last_timestamp: Option<String>,
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings, provided: Option<MapData>, ui_settings: UiSettings) -> Self {
        let source = match provided {
            Some(data) => DataSource::Provided(data),
            None => DataSource::Directory {
                store: DataStore::new(&settings.data_dir),
                base_url: settings.thumbnails_base_url(),
            },
        };

        let mut ui_settings = ui_settings;
        if let Some(provider) = settings.tiles.as_deref().and_then(TilesProvider::from_name) {
            ui_settings.tiles_provider = provider;
        }

        Self {
            ui_settings,
            loader: DataLoader {
                source,
                with_images: settings.images,
                with_clusters: !settings.no_clusters,
                refresh_secs: settings.refresh_secs,
                pending: None,
                last_load_time: None,
                error: None,
            },
            layout: None,
            popup: InfoPopup::default(),
            zoom: settings.zoom,
            pending_recenter: true,
            pending_reload: true,
            stats: Stats::default(),
        }
    }

    /// Replace the layout with a freshly initialized one
    ///
    /// The popup is closed, since its anchor belongs to the old markers.
    pub fn set_layout(&mut self, layout: MapLayout) {
        self.stats = Stats::from_layout(&layout);
        self.popup.close();
        self.layout = Some(layout);
        self.loader.error = None;
    }

    /// Record a load or initialization failure
    pub fn set_error(&mut self, error: String) {
        tracing::error!("{}", error);
        self.popup.close();
        self.layout = None;
        self.stats = Stats::default();
        self.loader.error = Some(error);
    }
}

impl DataLoader {
    /// Start loading the map data (in the background for a data directory)
    pub fn start_load(&mut self, now: f64) {
        profiling::scope!("start_load");

        let (tx, rx) = oneshot::channel();
        let with_images = self.with_images;
        let with_clusters = self.with_clusters;

        match &self.source {
            DataSource::Directory { store, base_url } => {
                let store = store.clone();
                let base_url = base_url.clone();
                let load = move || {
                    let result = store
                        .load_map_data(&base_url, with_images)
                        .map(|data| select_layers(data, with_images, with_clusters));
                    let _ = tx.send(result);
                };

                #[cfg(not(target_arch = "wasm32"))]
                tokio::task::spawn_blocking(load);
                #[cfg(target_arch = "wasm32")]
                load();
            }
            DataSource::Provided(data) => {
                let _ = tx.send(Ok(select_layers(
                    data.clone(),
                    with_images,
                    with_clusters,
                )));
            }
        }

        tracing::debug!("Loading map data from {}", self.source.describe());
        self.pending = Some(rx);
        self.last_load_time = Some(now);
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking check for the result of the load in progress
    pub fn poll(&mut self) -> Option<std::result::Result<MapData, String>> {
        let rx = self.pending.as_mut()?;
        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                Some(result.map_err(|e| format!("Failed to load map data: {}", e)))
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                Some(Err("Map data loading was interrupted".to_string()))
            }
        }
    }

    /// Whether the periodic reload is due at `now`
    pub fn refresh_due(&self, now: f64) -> bool {
        if self.refresh_secs == 0 || self.is_loading() {
            return false;
        }
        if !matches!(self.source, DataSource::Directory { .. }) {
            return false;
        }
        self.last_load_time
            .is_some_and(|last| now - last >= self.refresh_secs as f64)
    }
}

/// Drop the layers that are not shown
fn select_layers(mut data: MapData, with_images: bool, with_clusters: bool) -> MapData {
    if !with_images {
        data.images = None;
    }
    if !with_clusters {
        data.clusters = None;
    }
    data
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Directory { store, .. } => store.root().display().to_string(),
            Self::Provided(_) => "the host page".to_string(),
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            layers: LayerVisibility::default(),
        }
    }
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            track: true,
            clusters: true,
            images: true,
        }
    }
}

impl LayerVisibility {
    /// Whether a marker with this action is drawn
    pub fn shows(&self, action: MarkerAction) -> bool {
        match action {
            MarkerAction::TrackPoint(_) => self.track,
            MarkerAction::Cluster(_) => self.clusters,
            MarkerAction::Image(_) => self.images,
        }
    }
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }

    /// Case-insensitive lookup by [`TilesProvider::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|provider| provider.name().eq_ignore_ascii_case(name))
    }
}

impl Stats {
    pub fn from_layout(layout: &MapLayout) -> Self {
        let data = layout.data();
        Self {
            track_points: data.track_points.len(),
            clusters: data.clusters.as_ref().map_or(0, Vec::len),
            cluster_photos: data
                .clusters
                .iter()
                .flatten()
                .map(|cluster| cluster.photos.len())
                .sum(),
            images: data
                .images
                .iter()
                .flatten()
                .filter(|image| image.usable)
                .count(),
            markers: layout.markers().len(),
            last_timestamp: data.track_points.last().map(|p| p.timestamp.clone()),
        }
    }
}
