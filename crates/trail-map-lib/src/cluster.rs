//! Grouping of photos taken close together into clusters
//!
//! DBSCAN with a minimum of one sample per cluster: every photo belongs to a
//! cluster, and two photos share a cluster when they are linked by a chain of
//! photos each within `radius` meters (haversine distance) of the next.

use crate::lat_lon;
use crate::model::{Cluster, PhotoRecord};
use geo::{Distance, Haversine, Point};
use std::collections::{HashSet, VecDeque};

/// Default cluster radius in meters
pub const DEFAULT_RADIUS_M: f64 = 100.0;

/// Cluster `photos`, numbering clusters from 1 in order of first photo
///
/// Photos with a filename already present in their cluster are dropped.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn cluster_photos(photos: &[PhotoRecord], radius_m: f64) -> Vec<Cluster> {
    let positions: Vec<Point<f64>> = photos.iter().map(PhotoRecord::position).collect();
    let mut assigned = vec![false; photos.len()];
    let mut clusters = Vec::new();

    for start in 0..photos.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;

        // Breadth-first expansion over the "within radius" graph
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for candidate in 0..photos.len() {
                if !assigned[candidate]
                    && Haversine.distance(positions[current], positions[candidate]) <= radius_m
                {
                    assigned[candidate] = true;
                    members.push(candidate);
                    queue.push_back(candidate);
                }
            }
        }
        members.sort_unstable();

        let member_positions: Vec<Point<f64>> = members.iter().map(|&i| positions[i]).collect();
        let center = spherical_center(&member_positions);

        let mut seen = HashSet::new();
        let cluster_photos = members
            .iter()
            .map(|&i| &photos[i])
            .filter(|photo| seen.insert(photo.filename.as_str()))
            .cloned()
            .collect();

        clusters.push(Cluster {
            id: clusters.len() as u32 + 1,
            center: [center.y(), center.x()],
            photos: cluster_photos,
        });
    }

    tracing::info!(
        "Clustered {} photos into {} clusters (radius {} m)",
        photos.len(),
        clusters.len(),
        radius_m
    );
    clusters
}

/// Center of points on the sphere: the direction of the mean of their unit vectors
pub fn spherical_center(points: &[Point<f64>]) -> Point<f64> {
    if points.is_empty() {
        return lat_lon(0.0, 0.0);
    }
    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for point in points {
        let lat = point.y().to_radians();
        let lon = point.x().to_radians();
        x += lat.cos() * lon.cos();
        y += lat.cos() * lon.sin();
        z += lat.sin();
    }
    let n = points.len() as f64;
    let (x, y, z) = (x / n, y / n, z / n);

    let lat = z.atan2((x * x + y * y).sqrt());
    let lon = y.atan2(x);
    lat_lon(lat.to_degrees(), lon.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_photo(filename: &str, lat: f64, lon: f64) -> PhotoRecord {
        PhotoRecord {
            filename: filename.to_string(),
            latitude: lat,
            longitude: lon,
            altitude: 160.0,
            timestamp: "2017-07-21 20:13:07".to_string(),
        }
    }

    #[test]
    fn test_nearby_photos_share_a_cluster() {
        let photos = vec![
            create_photo("IMG_1.jpg", -12.044618583333332, -77.02700805555557),
            create_photo("IMG_2.jpg", -12.044545166666667, -77.0269165),
            create_photo("IMG_3.jpg", -13.5, -71.9),
        ];
        let clusters = cluster_photos(&photos, DEFAULT_RADIUS_M);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id, 1);
        assert_eq!(clusters[0].photos.len(), 2);
        assert_eq!(clusters[1].id, 2);
        assert_eq!(clusters[1].photos[0].filename, "IMG_3.jpg");
    }

    #[test]
    fn test_chained_photos_share_a_cluster() {
        // ~80 m apart each, first and last ~160 m apart
        let photos = vec![
            create_photo("a.jpg", 0.0, 0.0),
            create_photo("b.jpg", 0.0, 0.00072),
            create_photo("c.jpg", 0.0, 0.00144),
        ];
        let clusters = cluster_photos(&photos, DEFAULT_RADIUS_M);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].photos.len(), 3);
    }

    #[test]
    fn test_duplicate_filenames_are_dropped() {
        let photos = vec![
            create_photo("IMG_1.jpg", 10.0, 10.0),
            create_photo("IMG_1.jpg", 10.0, 10.0),
            create_photo("IMG_2.jpg", 10.0, 10.0),
        ];
        let clusters = cluster_photos(&photos, DEFAULT_RADIUS_M);
        assert_eq!(clusters.len(), 1);
        let names: Vec<&str> = clusters[0]
            .photos
            .iter()
            .map(|p| p.filename.as_str())
            .collect();
        assert_eq!(names, vec!["IMG_1.jpg", "IMG_2.jpg"]);
    }

    #[test]
    fn test_no_photos() {
        assert!(cluster_photos(&[], DEFAULT_RADIUS_M).is_empty());
    }

    #[test]
    fn test_spherical_center() {
        let center = spherical_center(&[lat_lon(10.0, 20.0)]);
        assert!((center.y() - 10.0).abs() < 1e-9);
        assert!((center.x() - 20.0).abs() < 1e-9);

        // Across the antimeridian the center stays near 180, not 0
        let center = spherical_center(&[lat_lon(0.0, 179.0), lat_lon(0.0, -179.0)]);
        assert!((center.x().abs() - 180.0).abs() < 1e-6);
        assert!(center.y().abs() < 1e-9);
    }
}
