//! Telemetry and Observability
//!
//! Handles setting up `tracing-subscriber` for structured logging.
//! Supports config-driven log levels, environment variable overrides,
//! an optional log file, and format switching between pretty (debug) and
//! JSON (release).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the tracing subscriber with the given log level from config.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter > default "info"
///
/// In debug builds: pretty-printed terminal output.
/// In release builds: JSON structured output with spans.
///
/// When `file` is set, plain records are appended to it as well. A file
/// that cannot be opened is reported on stderr and skipped. Setting
/// `console` to false silences terminal output entirely.
pub fn init_telemetry_with_level(log_level: &str, file: Option<&Path>, console: bool) {
    let default_filter = format!("{},symposium_engine={}", log_level, log_level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let file_layer = file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(handle) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(handle))
                    .boxed(),
            ),
            Err(e) => {
                eprintln!("Could not open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    #[cfg(debug_assertions)]
    let console_layer = console.then(|| {
        fmt::layer()
            .pretty()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    });

    #[cfg(not(debug_assertions))]
    let console_layer = console.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();
}
