//! Tracing setup. The terminal belongs to the dashboard, so everything goes to a
//! file through a non-blocking appender.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::Result;

/// Env var that overrides the configured level, e.g. `POCKER_LOG=pocker=debug`.
pub const LOG_ENV: &str = "POCKER_LOG";

/// Install the global subscriber writing to `log_file`. Keep the returned guard
/// alive until exit or buffered lines are lost.
pub fn init(log_file: &Path, default_level: &str) -> Result<WorkerGuard> {
    let dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = log_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pocker.log".to_string());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, re-entry) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true),
        )
        .try_init();

    Ok(guard)
}
