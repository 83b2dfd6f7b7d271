//! Data model for the map layers
//!
//! All records are read-only once handed to [`crate::initialize_map`]. Field order
//! matters: the CSV files in the data directory are header-less and map columns
//! to fields by position.

use crate::{MapError, Result, lat_lon};
use geo::Point;
use serde::{Deserialize, Serialize};

/// A timestamped device position sample with altitude
///
/// Coordinates are kept as the text the server wrote; they are parsed when a
/// position is needed so that popups show the original values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: String,
    pub longitude: String,
    pub altitude: String,
    pub timestamp: String,
}

impl TrackPoint {
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        altitude: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            altitude: altitude.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Parsed position (x = longitude, y = latitude)
    pub fn position(&self) -> Result<Point<f64>> {
        Ok(lat_lon(
            parse_degrees(&self.latitude)?,
            parse_degrees(&self.longitude)?,
        ))
    }
}

fn parse_degrees(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| MapError::InvalidCoordinate(text.to_string()))
}

/// A photo inside a cluster
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub filename: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub timestamp: String,
}

impl PhotoRecord {
    pub fn position(&self) -> Point<f64> {
        lat_lon(self.latitude, self.longitude)
    }
}

/// A group of photos shown as one marker at `center` (`[latitude, longitude]`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u32,
    pub center: [f64; 2],
    pub photos: Vec<PhotoRecord>,
}

impl Cluster {
    pub fn position(&self) -> Point<f64> {
        lat_lon(self.center[0], self.center[1])
    }
}

/// A processed photo as recorded in `images.csv`
///
/// Photos without GPS information are still recorded (so they are not
/// processed twice) but are not usable as markers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    #[serde(serialize_with = "flag::serialize", deserialize_with = "flag::deserialize")]
    pub usable: bool,
    pub filename: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub timestamp: String,
}

impl ImagePoint {
    /// Record for a photo with GPS information
    pub fn from_photo(photo: PhotoRecord) -> Self {
        Self {
            usable: true,
            filename: photo.filename,
            latitude: photo.latitude,
            longitude: photo.longitude,
            altitude: photo.altitude,
            timestamp: photo.timestamp,
        }
    }

    /// Record for a photo that had no usable GPS information
    pub fn unusable(filename: impl Into<String>) -> Self {
        Self {
            usable: false,
            filename: filename.into(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            timestamp: "0".to_string(),
        }
    }

    pub fn position(&self) -> Point<f64> {
        lat_lon(self.latitude, self.longitude)
    }

    pub fn to_photo(&self) -> PhotoRecord {
        PhotoRecord {
            filename: self.filename.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            timestamp: self.timestamp.clone(),
        }
    }
}

/// Everything the map initializer needs
///
/// `clusters` and `images` are independent optional layers: `None` means the
/// layer is not shown at all, an empty list means it is shown but has no markers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub track_points: Vec<TrackPoint>,
    pub clusters: Option<Vec<Cluster>>,
    pub images: Option<Vec<ImagePoint>>,
    /// Base URL of the thumbnails, without trailing `/images`
    pub base_url: String,
}

/// `usable` is stored as `1`/`0` in `images.csv`
mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_point_position() {
        let point = TrackPoint::new("-12.04", "-77.02", "160", "2017-07-21 20:13:07");
        let position = point.position().unwrap();
        assert_eq!(position.y(), -12.04);
        assert_eq!(position.x(), -77.02);
    }

    #[test]
    fn test_track_point_invalid_coordinate() {
        let point = TrackPoint::new("north", "-77.02", "160", "2017-07-21 20:13:07");
        match point.position() {
            Err(MapError::InvalidCoordinate(text)) => assert_eq!(text, "north"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_cluster_center_order() {
        let cluster = Cluster {
            id: 130,
            center: [-12.044581875003733, -77.02696227777153],
            photos: Vec::new(),
        };
        assert_eq!(cluster.position().y(), -12.044581875003733);
        assert_eq!(cluster.position().x(), -77.02696227777153);
    }

    #[test]
    fn test_image_point_from_photo() {
        let photo = PhotoRecord {
            filename: "IMG_1.jpg".to_string(),
            latitude: 1.0,
            longitude: 2.0,
            altitude: 3.0,
            timestamp: "2017-07-21 20:13:07".to_string(),
        };
        let image = ImagePoint::from_photo(photo.clone());
        assert!(image.usable);
        assert_eq!(image.to_photo(), photo);
        assert!(!ImagePoint::unusable("IMG_2.jpg").usable);
    }
}
