//! The `walkers` side of the map widget seam
//!
//! [`initialize_map`](trail_map_lib::initialize_map) talks to the map through
//! [`MapWidget`]. This implementation keeps the requested view and the
//! markers; the app applies the view to its `MapMemory` and hands the markers
//! to the [`MarkerPlugin`](crate::app::plugin::MarkerPlugin) every frame.

use std::sync::Arc;
use trail_map_lib::{MapOptions, MapWidget, Marker};

#[derive(Default)]
pub struct WalkersWidget {
    /// View requested by the last `create_map`
    options: Option<MapOptions>,
    /// Shared with the plugin, which is rebuilt every frame
    markers: Arc<Vec<Marker>>,
}

impl WalkersWidget {
    pub fn options(&self) -> Option<&MapOptions> {
        self.options.as_ref()
    }

    pub fn markers(&self) -> Arc<Vec<Marker>> {
        Arc::clone(&self.markers)
    }

    /// Drop the markers, keeping the view
    pub fn clear_markers(&mut self) {
        self.markers = Arc::new(Vec::new());
    }
}

impl MapWidget for WalkersWidget {
    fn create_map(&mut self, options: &MapOptions) {
        tracing::debug!(
            "Creating map at ({:.5}, {:.5}), zoom {}",
            options.center.y(),
            options.center.x(),
            options.zoom
        );
        self.options = Some(*options);
        self.markers = Arc::new(Vec::new());
    }

    fn add_marker(&mut self, marker: &Marker) {
        Arc::make_mut(&mut self.markers).push(marker.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_map_lib::{MapData, MarkerIcon, TrackPoint, initialize_map};

    fn create_data(n: usize) -> MapData {
        MapData {
            track_points: (0..n)
                .map(|i| {
                    TrackPoint::new(
                        format!("-12.0{}", i),
                        "-77.02",
                        "160",
                        "2017-07-21 20:13:07",
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_through_walkers_widget() {
        let mut widget = WalkersWidget::default();
        assert!(widget.options().is_none());

        let layout = initialize_map(&mut widget, create_data(3)).unwrap();
        assert_eq!(widget.options(), Some(layout.options()));
        assert_eq!(widget.markers().as_slice(), layout.markers());
        assert!(widget.markers()[2].icon.is_default());
        assert!(matches!(widget.markers()[0].icon, MarkerIcon::Circle(_)));
    }

    #[test]
    fn test_create_map_resets_markers() {
        let mut widget = WalkersWidget::default();
        initialize_map(&mut widget, create_data(3)).unwrap();
        let previous = widget.markers();

        initialize_map(&mut widget, create_data(1)).unwrap();
        assert_eq!(widget.markers().len(), 1);
        // Markers handed out earlier are not modified
        assert_eq!(previous.len(), 3);
    }

    #[test]
    fn test_clear_markers_keeps_view() {
        let mut widget = WalkersWidget::default();
        let layout = initialize_map(&mut widget, create_data(2)).unwrap();

        widget.clear_markers();
        assert!(widget.markers().is_empty());
        assert_eq!(widget.options(), Some(layout.options()));
    }

    #[test]
    fn test_failed_initialization_keeps_previous_map() {
        let mut widget = WalkersWidget::default();
        initialize_map(&mut widget, create_data(2)).unwrap();

        assert!(initialize_map(&mut widget, MapData::default()).is_err());
        assert_eq!(widget.markers().len(), 2);
    }
}
