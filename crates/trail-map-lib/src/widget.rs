//! Seam between the marker layout and the map widget that displays it

use crate::MarkerIcon;
use crate::initializer::MapOptions;
use geo::Point;

/// Identifier of a marker, sequential in creation order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

/// What a click on a marker shows, bound to the record index at creation time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerAction {
    TrackPoint(usize),
    Cluster(usize),
    Image(usize),
}

/// A marker placed on the map
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    /// x = longitude, y = latitude
    pub position: Point<f64>,
    pub icon: MarkerIcon,
    pub action: MarkerAction,
}

/// A map widget able to show markers
///
/// Implementations report clicks back through
/// [`crate::MapLayout::handle_click`] with the clicked marker's id.
pub trait MapWidget {
    /// Create (or reset) the map view
    fn create_map(&mut self, options: &MapOptions);

    /// Place a marker on the map
    fn add_marker(&mut self, marker: &Marker);
}
