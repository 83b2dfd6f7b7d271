//! Data directory shared by the pipeline (writer) and the viewer (reader)
//!
//! Layout:
//! - `coordinates.csv`: track points, one per line, no header
//! - `images.csv`: every processed photo, usable or not, no header
//! - `image_clusters.json`: photo clusters
//! - `images/`: PNG thumbnails

use crate::model::{Cluster, ImagePoint, MapData, TrackPoint};
use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const COORDINATES_FILE: &str = "coordinates.csv";
const IMAGES_FILE: &str = "images.csv";
const CLUSTERS_FILE: &str = "image_clusters.json";
const IMAGES_DIR: &str = "images";

/// Access to the files of a data directory
#[derive(Clone, Debug)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the thumbnails
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Create the data directory and the thumbnails directory if missing
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.images_dir())?;
        Ok(())
    }

    /// All track points in file order (empty if the file does not exist yet)
    pub fn load_track_points(&self) -> Result<Vec<TrackPoint>> {
        Ok(read_csv(&self.root.join(COORDINATES_FILE))?.unwrap_or_default())
    }

    pub fn append_track_point(&self, point: &TrackPoint) -> Result<()> {
        append_csv(&self.root.join(COORDINATES_FILE), point)
    }

    /// All processed photos, or `None` if no photo was ever processed
    pub fn load_images(&self) -> Result<Option<Vec<ImagePoint>>> {
        read_csv(&self.root.join(IMAGES_FILE))
    }

    pub fn append_image(&self, image: &ImagePoint) -> Result<()> {
        append_csv(&self.root.join(IMAGES_FILE), image)
    }

    /// Photo clusters, or `None` if clustering never ran
    pub fn load_clusters(&self) -> Result<Option<Vec<Cluster>>> {
        let path = self.root.join(CLUSTERS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    /// Replace the clusters file
    pub fn save_clusters(&self, clusters: &[Cluster]) -> Result<()> {
        let writer = BufWriter::new(File::create(self.root.join(CLUSTERS_FILE))?);
        serde_json::to_writer_pretty(writer, clusters)?;
        Ok(())
    }

    /// Everything the viewer shows
    ///
    /// With `with_images` false the images layer is left out even if the file exists.
    pub fn load_map_data(&self, base_url: &str, with_images: bool) -> Result<MapData> {
        let data = MapData {
            track_points: self.load_track_points()?,
            clusters: self.load_clusters()?,
            images: if with_images { self.load_images()? } else { None },
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        tracing::info!(
            "Loaded {} track points, {} clusters, {} images from {}",
            data.track_points.len(),
            data.clusters.as_ref().map_or(0, Vec::len),
            data.images.as_ref().map_or(0, Vec::len),
            self.root.display()
        );
        Ok(data)
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        tracing::debug!("{} does not exist", path.display());
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(Some(records))
}

fn append_csv<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhotoRecord;
    use tempfile::tempdir;

    fn create_photo(filename: &str) -> PhotoRecord {
        PhotoRecord {
            filename: filename.to_string(),
            latitude: -12.044618583333332,
            longitude: -77.02700805555557,
            altitude: 160.0,
            timestamp: "2017-07-21 20:13:07".to_string(),
        }
    }

    #[test]
    fn test_missing_files() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());
        assert!(store.load_track_points().unwrap().is_empty());
        assert!(store.load_images().unwrap().is_none());
        assert!(store.load_clusters().unwrap().is_none());
    }

    #[test]
    fn test_append_and_load_track_points() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let first = TrackPoint::new("-12.04", "-77.02", "160", "2017-07-21 20:13:07");
        let second = TrackPoint::new("-12.05", "-77.03", "170", "2017-07-21 21:13:07");
        store.append_track_point(&first).unwrap();
        store.append_track_point(&second).unwrap();

        let contents = fs::read_to_string(dir.path().join(COORDINATES_FILE)).unwrap();
        assert_eq!(
            contents,
            "-12.04,-77.02,160,2017-07-21 20:13:07\n-12.05,-77.03,170,2017-07-21 21:13:07\n"
        );
        assert_eq!(store.load_track_points().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_images_usable_flag() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());
        store
            .append_image(&ImagePoint::from_photo(create_photo("IMG_1.jpg")))
            .unwrap();
        store.append_image(&ImagePoint::unusable("IMG_2.jpg")).unwrap();

        let contents = fs::read_to_string(dir.path().join(IMAGES_FILE)).unwrap();
        assert!(contents.starts_with("1,IMG_1.jpg,"));
        assert!(contents.contains("\n0,IMG_2.jpg,"));

        let images = store.load_images().unwrap().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].usable);
        assert!(!images[1].usable);
        assert_eq!(images[0].altitude, 160.0);
    }

    #[test]
    fn test_clusters_roundtrip_file() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let clusters = vec![Cluster {
            id: 1,
            center: [-12.04, -77.02],
            photos: vec![create_photo("IMG_1.jpg")],
        }];
        store.save_clusters(&clusters).unwrap();
        assert_eq!(store.load_clusters().unwrap(), Some(clusters));
    }

    #[test]
    fn test_load_map_data() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());
        store.ensure_dirs().unwrap();
        assert!(store.images_dir().is_dir());

        store
            .append_track_point(&TrackPoint::new("1.0", "2.0", "3", "2017-07-21 20:13:07"))
            .unwrap();
        store
            .append_image(&ImagePoint::from_photo(create_photo("IMG_1.jpg")))
            .unwrap();

        let data = store.load_map_data("https://example.org/", true).unwrap();
        assert_eq!(data.base_url, "https://example.org");
        assert_eq!(data.track_points.len(), 1);
        assert!(data.clusters.is_none());
        assert_eq!(data.images.map(|i| i.len()), Some(1));

        let data = store.load_map_data("https://example.org", false).unwrap();
        assert!(data.images.is_none());
    }

    #[test]
    fn test_malformed_csv_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IMAGES_FILE), "7,IMG_1.jpg,1,2,3,x\n").unwrap();
        let store = DataStore::new(dir.path());
        assert!(matches!(
            store.load_images(),
            Err(crate::MapError::Csv(_))
        ));
    }
}
