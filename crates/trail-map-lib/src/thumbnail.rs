//! PNG thumbnails of the photos, served to the popups

use crate::popup::thumbnail_name;
use crate::Result;
use image::ImageFormat;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Width of the thumbnails shown in the popups
pub const THUMBNAIL_WIDTH: u32 = 500;

/// Resize `src` to `width` pixels wide (aspect ratio kept) and save it as PNG in `dest_dir`
///
/// The thumbnail is named after the photo with [`thumbnail_name`], which is the
/// name the popups link to. It is PNG whatever that name ends with. Returns
/// the thumbnail path.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn make_thumbnail(src: &Path, dest_dir: &Path, width: u32) -> Result<PathBuf> {
    let photo = image::open(src)?;
    let height = ((photo.height() as f64) * (width as f64) / (photo.width().max(1) as f64)) as u32;
    let thumbnail = photo.resize_exact(width, height.max(1), FilterType::Lanczos3);

    let filename = src
        .file_name()
        .map(|name| thumbnail_name(&name.to_string_lossy()))
        .unwrap_or_else(|| "thumbnail.png".to_string());
    let dest = dest_dir.join(filename);
    thumbnail.save_with_format(&dest, ImageFormat::Png)?;

    tracing::debug!(
        "Thumbnail {} -> {} ({}x{})",
        src.display(),
        dest.display(),
        width,
        height
    );
    Ok(dest)
}
