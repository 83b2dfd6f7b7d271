//! Map initialization: one marker per record, one shared popup
//!
//! The map is centered on the last track point. Markers are created in the
//! order clusters, track points, images, so that the track is drawn above the
//! clusters and the images above both.

use crate::icon::{CircleSymbol, MarkerIcon};
use crate::model::MapData;
use crate::popup::{InfoPopup, PopupContent, image_source};
use crate::widget::{MapWidget, Marker, MarkerAction, MarkerId};
use crate::{MapError, Result};
use geo::Point;

/// Zoom level the map opens at
pub const DEFAULT_ZOOM: f64 = 7.0;

/// Initial map view
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapOptions {
    /// x = longitude, y = latitude
    pub center: Point<f64>,
    pub zoom: f64,
}

/// The markers created for a [`MapData`] and the data their clicks refer to
#[derive(Clone, Debug)]
pub struct MapLayout {
    options: MapOptions,
    markers: Vec<Marker>,
    data: MapData,
}

/// Create the map and all markers through `widget`
///
/// Fails with [`MapError::NoTrackPoints`] when there is no track point to center
/// on, and with [`MapError::InvalidCoordinate`] when a track point does not parse.
/// Nothing is created on the widget in either case.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn initialize_map<W: MapWidget>(widget: &mut W, data: MapData) -> Result<MapLayout> {
    let track_positions = data
        .track_points
        .iter()
        .map(|point| point.position())
        .collect::<Result<Vec<_>>>()?;
    let center = *track_positions.last().ok_or(MapError::NoTrackPoints)?;

    let options = MapOptions {
        center,
        zoom: DEFAULT_ZOOM,
    };
    widget.create_map(&options);

    let mut markers = Vec::new();
    let mut place = |position, icon, action| {
        let marker = Marker {
            id: MarkerId(markers.len()),
            position,
            icon,
            action,
        };
        widget.add_marker(&marker);
        markers.push(marker);
    };

    if let Some(clusters) = &data.clusters {
        for (index, cluster) in clusters.iter().enumerate() {
            place(
                cluster.position(),
                MarkerIcon::Circle(CircleSymbol::CLUSTER),
                MarkerAction::Cluster(index),
            );
        }
    }

    let last_index = track_positions.len() - 1;
    for (index, position) in track_positions.into_iter().enumerate() {
        let icon = if index < last_index {
            MarkerIcon::Circle(CircleSymbol::TRACK_POINT)
        } else {
            MarkerIcon::DefaultPin
        };
        place(position, icon, MarkerAction::TrackPoint(index));
    }

    if let Some(images) = &data.images {
        for (index, image) in images.iter().enumerate() {
            if !image.usable {
                continue;
            }
            place(
                image.position(),
                MarkerIcon::Circle(CircleSymbol::IMAGE),
                MarkerAction::Image(index),
            );
        }
    }

    tracing::info!(
        "Map initialized at ({:.5}, {:.5}) with {} markers ({} track points)",
        center.y(),
        center.x(),
        markers.len(),
        data.track_points.len()
    );

    Ok(MapLayout {
        options,
        markers,
        data,
    })
}

impl MapLayout {
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0)
    }

    pub fn data(&self) -> &MapData {
        &self.data
    }

    /// Fill `popup` with the content of marker `id` and open it there
    ///
    /// Returns `false` (leaving the popup untouched) for an unknown marker.
    pub fn handle_click(&self, id: MarkerId, popup: &mut InfoPopup) -> bool {
        let Some(content) = self.marker(id).and_then(|m| self.popup_content(m.action)) else {
            tracing::warn!("Click on unknown marker {:?}", id);
            return false;
        };
        tracing::debug!("Opening popup for marker {:?}", id);
        popup.set_content(content);
        popup.open(id);
        true
    }

    /// Popup content for a marker action
    pub fn popup_content(&self, action: MarkerAction) -> Option<PopupContent> {
        let base_url = &self.data.base_url;
        match action {
            MarkerAction::TrackPoint(index) => {
                let point = self.data.track_points.get(index)?;
                Some(PopupContent::Text(format!(
                    "Date: {} \nAltitude: {}m",
                    point.timestamp, point.altitude
                )))
            }
            MarkerAction::Cluster(index) => {
                let cluster = self.data.clusters.as_ref()?.get(index)?;
                Some(PopupContent::Images {
                    sources: cluster
                        .photos
                        .iter()
                        .map(|photo| image_source(base_url, &photo.filename))
                        .collect(),
                    caption: None,
                })
            }
            MarkerAction::Image(index) => {
                let image = self.data.images.as_ref()?.get(index)?;
                Some(PopupContent::Images {
                    sources: vec![image_source(base_url, &image.filename)],
                    caption: Some(image.timestamp.clone()),
                })
            }
        }
    }
}
