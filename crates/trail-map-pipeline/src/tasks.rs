//! The pipeline steps, each working on a [`DataStore`]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use trail_map_lib::cluster::cluster_photos;
use trail_map_lib::exif_gps::read_gps_info;
use trail_map_lib::thumbnail::{THUMBNAIL_WIDTH, make_thumbnail};
use trail_map_lib::{Cluster, DataStore, ImagePoint, Result, TrackPoint, iridium};

/// Outcome of a photo processing pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhotoReport {
    /// New photos recorded in `images.csv`
    pub processed: usize,
    /// Of those, photos with a GPS position
    pub usable: usize,
    /// Photos already recorded by an earlier pass
    pub skipped: usize,
    /// Photos that could not be read
    pub failed: usize,
}

/// Parse an Iridium message and append its position to the track
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn ingest_message(store: &DataStore, message: &str) -> Result<TrackPoint> {
    let point = iridium::parse_message(message)?;
    store.ensure_dirs()?;
    store.append_track_point(&point)?;
    tracing::info!(
        "Track point {}, {} at {}",
        point.latitude,
        point.longitude,
        point.timestamp
    );
    Ok(point)
}

/// Record every new `.jpg` of `dir` in `images.csv` and write its thumbnail
///
/// Only the lowercase `.jpg` extension is picked up. Photos already in `images.csv` are skipped. Photos without GPS data are
/// recorded as not usable. Unless `keep_originals` is set, each processed
/// photo is removed afterwards.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn process_photos(store: &DataStore, dir: &Path, keep_originals: bool) -> Result<PhotoReport> {
    store.ensure_dirs()?;
    let known: HashSet<String> = store
        .load_images()?
        .unwrap_or_default()
        .into_iter()
        .map(|image| image.filename)
        .collect();

    let mut report = PhotoReport::default();
    for path in list_jpegs(dir)? {
        let filename = file_name(&path);
        if known.contains(&filename) {
            tracing::debug!("{} already processed", filename);
            report.skipped += 1;
            continue;
        }

        match process_photo(store, &path, &filename) {
            Ok(usable) => {
                report.processed += 1;
                report.usable += usize::from(usable);
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                report.failed += 1;
                continue;
            }
        }

        if !keep_originals {
            fs::remove_file(&path)?;
        }
    }

    tracing::info!(
        "Photos in {}: {} new ({} with GPS), {} already known, {} failed",
        dir.display(),
        report.processed,
        report.usable,
        report.skipped,
        report.failed
    );
    Ok(report)
}

/// The row is appended only once the thumbnail is written. Returns whether the photo has a position
fn process_photo(store: &DataStore, path: &Path, filename: &str) -> Result<bool> {
    let image = match read_gps_info(path)? {
        Some(photo) => ImagePoint::from_photo(photo),
        None => {
            tracing::info!("{} has no GPS position", filename);
            ImagePoint::unusable(filename)
        }
    };
    make_thumbnail(path, &store.images_dir(), THUMBNAIL_WIDTH)?;
    store.append_image(&image)?;
    Ok(image.usable)
}

/// Cluster the usable images and save the clusters
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn recluster(store: &DataStore, radius_m: f64) -> Result<Vec<Cluster>> {
    let photos: Vec<_> = store
        .load_images()?
        .unwrap_or_default()
        .iter()
        .filter(|image| image.usable)
        .map(ImagePoint::to_photo)
        .collect();

    let clusters = cluster_photos(&photos, radius_m);
    store.save_clusters(&clusters)?;
    Ok(clusters)
}

/// `.jpg` files of `dir` (lowercase extension only), sorted by name
fn list_jpegs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "jpg")
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
