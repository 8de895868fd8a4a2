//! Logging infrastructure for localqa.
//!
//! Both tools write a plain transcript: every event is rendered as its bare
//! message, once to stdout and once appended to a log file. Downstream
//! readers of the log file rely on line prefixes such as `> Question`, so
//! timestamps, levels and targets are left out of both layers.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `log_file` - File that receives an appended copy of every line
/// * `log_level` - Optional filter override (e.g., "debug"); falls back to
///   `RUST_LOG`, then `info`
///
/// # Example
/// ```no_run
/// use localqa_core::logging::init_logging;
/// use std::path::Path;
///
/// init_logging(Some(Path::new("ingest.log")), None).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_file: Option<&Path>, log_level: Option<&str>) -> AppResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_ansi(false);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::Config(format!("Failed to open log file {:?}: {}", path, e))
                })?;

            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .without_time()
                    .with_target(false)
                    .with_level(false)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}
