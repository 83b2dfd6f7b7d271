//! Logging setup for native and web builds
//!
//! With the `profiling` feature, `profiling` scopes become `tracing` spans and
//! show up in the same output.

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER_DEBUG: &str =
    "debug,eframe::native=warn,egui::context=warn,hyper_util=info,reqwest::connect=info,walkers=info";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER_RELEASE: &str = "info,eframe=warn,egui::context=warn";

/// Initialize the `fmt` subscriber, filtered by `RUST_LOG`
///
/// Must run before anything logs.
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var(
                "RUST_LOG",
                if cfg!(debug_assertions) {
                    DEFAULT_FILTER_DEBUG
                } else {
                    DEFAULT_FILTER_RELEASE
                },
            );
        }
    }

    let fmt_layer = fmt::layer().with_filter(EnvFilter::from_default_env());
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();

    tracing::debug!(
        "Logging initialized (RUST_LOG={})",
        std::env::var("RUST_LOG").unwrap_or_default()
    );
}

/// Initialize the browser console subscriber and panic hook
///
/// The level comes from the `envLOG_LEVEL` GET parameter.
#[cfg(target_arch = "wasm32")]
pub fn setup_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_wasm::WASMLayerConfigBuilder;

    super::cli::parse_env();

    let max_level = super::cli::get_env::<String>("LOG_LEVEL")
        .and_then(|level| parse_level(&level))
        .unwrap_or(if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        });

    let mut builder = WASMLayerConfigBuilder::new();
    builder.set_max_level(max_level);
    let _ = tracing_subscriber::registry()
        .with(tracing_wasm::WASMLayer::new(builder.build()))
        .try_init();

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

/// Case-insensitive `tracing` level name
#[allow(dead_code)]
pub fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("Warn"), Some(tracing::Level::WARN));
        assert_eq!(parse_level("verbose"), None);
    }
}
