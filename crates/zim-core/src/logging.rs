//! Log setup. The terminal belongs to the TUI, so logs go to a daily file
//! under the data directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "ZIM_LOG";

pub fn logs_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Build the filter: `ZIM_LOG` wins over `default_directive`.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
            .with_context(|| format!("Invalid {LOG_ENV} directive: {directive:?}")),
        _ => EnvFilter::try_new(default_directive)
            .with_context(|| format!("Invalid log level: {default_directive:?}")),
    }
}

/// Install the global subscriber writing to `<data_dir>/logs/zim.log.<date>`.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init(data_dir: &Path, default_directive: &str) -> Result<WorkerGuard> {
    let dir = logs_dir(data_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, "zim.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive)?)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {err}"))?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}
