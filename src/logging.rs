//! Tracing initialization
//!
//! The terminal belongs to the UI, so log records go to a file in the
//! platform data directory instead of stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{project_dirs, Config};

/// Default log file location
pub fn default_log_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("amourcard.log"))
        .unwrap_or_else(|| PathBuf::from("amourcard.log"))
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` when set, else `config.logging.level`.
/// Logging is optional: if the file cannot be opened nothing is installed,
/// and calling this twice keeps the first subscriber.
pub fn init(config: &Config) -> Option<PathBuf> {
    let path = config.logging.file.clone().unwrap_or_else(default_log_path);

    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return None;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .ok()?;

    Some(path)
}
