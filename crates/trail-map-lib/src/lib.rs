//! Trail Map Library - Markers, popups and data preparation
//!
//! This library turns the location data of a trip (device track points sent
//! over an Iridium link, geotagged photos grouped into clusters) into map
//! markers with a single shared info popup. The map itself is an external
//! collaborator reached through the [`MapWidget`] trait, so the same layout
//! code drives the `walkers` viewer and the tests.
//!
//! # Architecture
//!
//! - **[`MapData`]**: Typed input (track points, optional clusters and image layers, base URL)
//! - **[`initialize_map`]**: Creates the map and every marker through a [`MapWidget`]
//! - **[`MapLayout`]**: Answers marker clicks by filling the shared [`InfoPopup`]
//! - **[`DataStore`]**: CSV/JSON files written by the pipeline and read by the viewer
//! - **[`cluster`]**, **[`iridium`]**, **[`exif_gps`]**, **[`thumbnail`]**: data preparation

pub mod cluster;
pub mod exif_gps;
mod icon;
mod initializer;
pub mod iridium;
mod model;
mod popup;
mod store;
pub mod thumbnail;
mod widget;

// Public API exports
pub use icon::{CircleSymbol, MarkerIcon, Rgb};
pub use initializer::{DEFAULT_ZOOM, MapLayout, MapOptions, initialize_map};
pub use model::{Cluster, ImagePoint, MapData, PhotoRecord, TrackPoint};
pub use popup::{InfoPopup, POPUP_MAX_WIDTH, PopupContent, image_source, thumbnail_name};
pub use store::DataStore;
pub use widget::{Marker, MarkerAction, MarkerId, MapWidget};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("No track points: the map center is the last track point")]
    NoTrackPoints,

    #[error("Invalid coordinate: {0:?}")]
    InvalidCoordinate(String),

    #[error("Invalid Iridium message: {0:?}")]
    InvalidMessage(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;

/// Build a position from latitude and longitude in degrees (x = longitude, y = latitude)
#[inline]
pub fn lat_lon(lat: f64, lon: f64) -> geo::Point<f64> {
    geo::Point::new(lon, lat)
}
