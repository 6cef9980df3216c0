//! Console and rotating-file logging.
//!
//! Logs go to stdout and to daily-rotated files in the platform data
//! directory. A second file collects warnings and errors only.
//!
//! ```no_run
//! datadash::logging::init("info")?;
//! tracing::info!("ready");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Gets the log directory, creating it if needed.
///
/// - Windows: `%APPDATA%/datadash/logs`
/// - macOS: `~/Library/Application Support/datadash/logs`
/// - Linux: `~/.local/share/datadash/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("datadash").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Installs the global subscriber.
///
/// `default_level` is used when `RUST_LOG` is unset. Creates `datadash.log`
/// (everything that passes the filter) and `error.log` (warn and above), both
/// rotating daily with 10 files kept.
///
/// # Errors
///
/// Returns error if the log directory or the file appenders cannot be created.
pub fn init(default_level: &str) -> Result<()> {
    let log_dir = get_log_dir()?;

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("datadash")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create error-logs file appender")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Failed to create env filter")?;

    // stderr keeps stdout clean for command output
    let console_layer = fmt::layer()
        .with_target(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact();

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!("Logging initialized, log directory: {:?}", log_dir);

    Ok(())
}

/// Path of today's main log file.
pub fn get_current_log_path() -> Result<PathBuf> {
    let log_dir = get_log_dir()?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    Ok(log_dir.join(format!("datadash.{today}.log")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_dir() -> Result<()> {
        let log_dir = get_log_dir()?;
        assert!(log_dir.ends_with("datadash/logs") || log_dir.ends_with("datadash\\logs"));
        Ok(())
    }

    #[test]
    fn test_current_log_path_is_dated() -> Result<()> {
        let path = get_current_log_path()?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        assert!(name.starts_with("datadash."));
        assert!(name.ends_with(".log"));
        Ok(())
    }
}
