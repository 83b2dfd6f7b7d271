use crate::entrypoints::cli::parse_args;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Trail Map - Interactive map of a trip: device track points, photo clusters and image points
pub struct Settings {
    /// Directory with coordinates.csv, images.csv, image_clusters.json and the images/ thumbnails
    #[clap(short, long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Base URL the thumbnails are served from (`<base-url>/images/<name>.png`), defaults to the data directory
    #[clap(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Show a marker for every usable image (in addition to the clusters)
    #[clap(long, default_value = "false")]
    pub images: bool,

    /// Do not show the photo clusters
    #[clap(long, default_value = "false")]
    pub no_clusters: bool,

    /// Initial zoom level (defaults to 7)
    #[clap(short, long)]
    pub zoom: Option<f64>,

    /// Map tiles provider (OpenStreetMap or OpenTopoMap)
    #[clap(long, value_name = "NAME")]
    pub tiles: Option<String>,

    /// Reload the data directory every N seconds (0 = never)
    #[clap(long, value_name = "SECS", default_value = "0")]
    pub refresh_secs: u64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse the settings from the command line (native) or the GET parameters (web)
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from(["trail-map-viewer"]) // Default args on web if parsing fails
                }
            }
        }
    }

    /// Base URL of the thumbnails, without trailing `/`
    ///
    /// Without `--base-url` this is a `file://` URL of the data directory on
    /// native and the page's own directory on web.
    pub fn thumbnails_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        if cfg!(target_arch = "wasm32") {
            return ".".to_string();
        }
        let dir = std::path::absolute(&self.data_dir).unwrap_or_else(|_| self.data_dir.clone());
        file_url(&dir)
    }
}

/// `file://` URL of an absolute path
fn file_url(path: &std::path::Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let path = path.trim_end_matches('/');
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("trail-map-viewer").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]);
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert!(settings.base_url.is_none());
        assert!(!settings.images);
        assert!(!settings.no_clusters);
        assert!(settings.zoom.is_none());
        assert_eq!(settings.refresh_secs, 0);
    }

    #[test]
    fn test_flags() {
        let settings = parse(&[
            "--data-dir",
            "/srv/trip",
            "--images",
            "--no-clusters",
            "--zoom",
            "9",
            "--tiles",
            "OpenTopoMap",
        ]);
        assert_eq!(settings.data_dir, PathBuf::from("/srv/trip"));
        assert!(settings.images);
        assert!(settings.no_clusters);
        assert_eq!(settings.zoom, Some(9.0));
        assert_eq!(settings.tiles.as_deref(), Some("OpenTopoMap"));
    }

    #[test]
    fn test_base_url() {
        let settings = parse(&["--base-url", "https://example.org/trip/"]);
        assert_eq!(settings.thumbnails_base_url(), "https://example.org/trip");

        let settings = parse(&["--data-dir", "/srv/trip/"]);
        assert_eq!(settings.thumbnails_base_url(), "file:///srv/trip");
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(std::path::Path::new("/a/b")), "file:///a/b");
        assert_eq!(file_url(std::path::Path::new("C:\\trip")), "file:///C:/trip");
    }
}
