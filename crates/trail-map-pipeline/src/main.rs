//! Trail Map Pipeline - prepares the data directory shown by the viewer
//!
//! - `ingest`: append the position of an Iridium text message to the track
//! - `process-photos`: record new photos (GPS info) and write their thumbnails
//! - `cluster`: group the usable photos into clusters
//! - `run`: process photos and re-cluster, periodically

mod tasks;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use trail_map_lib::DataStore;
use trail_map_lib::cluster::DEFAULT_RADIUS_M;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Trail Map Pipeline - Ingests Iridium messages and prepares photos for the viewer
struct Cli {
    /// Data directory (coordinates.csv, images.csv, image_clusters.json, images/)
    #[clap(short, long, value_name = "DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an Iridium text message and append its position to coordinates.csv
    Ingest {
        /// The message text
        message: String,
    },

    /// Record the new .jpg photos of a directory and write their thumbnails
    ProcessPhotos {
        /// Directory with the full-size photos
        dir: PathBuf,

        /// Keep the full-size photos after processing
        #[clap(long, default_value = "false")]
        keep_originals: bool,
    },

    /// Group the usable photos into clusters (image_clusters.json)
    Cluster {
        /// Cluster radius in meters
        #[clap(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,
    },

    /// Process photos and re-cluster, repeated every interval
    Run {
        /// Directory with the full-size photos
        dir: PathBuf,

        /// Seconds between two passes
        #[clap(long, default_value = "3600")]
        interval_secs: u64,

        /// Cluster radius in meters
        #[clap(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,

        /// Keep the full-size photos after processing
        #[clap(long, default_value = "false")]
        keep_originals: bool,

        /// Stop after the first pass
        #[clap(long, default_value = "false")]
        once: bool,
    },
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var(
                "RUST_LOG",
                if cfg!(debug_assertions) {
                    "debug"
                } else {
                    "info"
                },
            );
        }
    }

    // Logs go to stderr, stdout is for command results
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();
}

/// One photo pass followed by a re-clustering
fn photo_pass(store: &DataStore, dir: &Path, radius: f64, keep_originals: bool) -> bool {
    if let Err(e) = tasks::process_photos(store, dir, keep_originals) {
        tracing::error!("Photo processing failed: {}", e);
        return false;
    }
    match tasks::recluster(store, radius) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Clustering failed: {}", e);
            false
        }
    }
}

async fn run_periodically(
    store: DataStore,
    dir: PathBuf,
    interval: Duration,
    radius: f64,
    keep_originals: bool,
) {
    tracing::info!(
        "Processing {} every {} s, press Ctrl+C to stop",
        dir.display(),
        interval.as_secs()
    );
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let store = store.clone();
                let dir = dir.clone();
                let pass = tokio::task::spawn_blocking(move || {
                    photo_pass(&store, &dir, radius, keep_originals)
                });
                if let Err(e) = pass.await {
                    tracing::error!("Photo pass panicked: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping");
                break;
            }
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    setup_logging();

    let store = DataStore::new(&cli.data_dir);
    let ok = match cli.command {
        Command::Ingest { message } => match tasks::ingest_message(&store, &message) {
            Ok(_) => {
                println!("OK");
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                println!("FAIL");
                false
            }
        },
        Command::ProcessPhotos {
            dir,
            keep_originals,
        } => match tasks::process_photos(&store, &dir, keep_originals) {
            Ok(report) => {
                println!(
                    "{} new photos ({} with GPS), {} already known, {} failed",
                    report.processed, report.usable, report.skipped, report.failed
                );
                true
            }
            Err(e) => {
                tracing::error!("Photo processing failed: {}", e);
                false
            }
        },
        Command::Cluster { radius } => match tasks::recluster(&store, radius) {
            Ok(clusters) => {
                println!("{} clusters", clusters.len());
                true
            }
            Err(e) => {
                tracing::error!("Clustering failed: {}", e);
                false
            }
        },
        Command::Run {
            dir,
            interval_secs,
            radius,
            keep_originals,
            once,
        } => {
            if once {
                photo_pass(&store, &dir, radius, keep_originals)
            } else {
                let interval = Duration::from_secs(interval_secs.max(1));
                run_periodically(store, dir, interval, radius, keep_originals).await;
                true
            }
        }
    };

    if !ok {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["trail-map-pipeline", "cluster"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert!(matches!(cli.command, Command::Cluster { radius } if radius == 100.0));
    }

    #[test]
    fn test_cli_run() {
        let cli = Cli::try_parse_from([
            "trail-map-pipeline",
            "run",
            "inbox",
            "--interval-secs",
            "60",
            "--data-dir",
            "/srv/trip",
            "--keep-originals",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/srv/trip"));
        match cli.command {
            Command::Run {
                dir,
                interval_secs,
                keep_originals,
                once,
                ..
            } => {
                assert_eq!(dir, PathBuf::from("inbox"));
                assert_eq!(interval_secs, 60);
                assert!(keep_originals);
                assert!(!once);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_ingest_requires_message() {
        assert!(Cli::try_parse_from(["trail-map-pipeline", "ingest"]).is_err());
    }
}
