//! Logging system initialization
//!
//! Logs go to `<data dir>/logs/app.log` and never to stdout, which the UI
//! bridge reserves for responses. The previous sessions' logs are shifted
//! on startup so the last nine remain as `app.log.1` through `app.log.9`.

use crate::error::{GotoAppError, Result, StringError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Number of historical log files kept
const MAX_LOG_FILES: u8 = 9;

/// File name of the active log
pub const LOG_FILE_NAME: &str = "app.log";

/// Install the global tracing subscriber writing into `log_dir`
///
/// The level defaults to `info` and can be overridden with `RUST_LOG`.
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes pending lines.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    rotate_logs_on_startup(&log_dir.join(LOG_FILE_NAME))?;

    // Rotation is handled above, once per session
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| GotoAppError::ConfigError(Box::new(e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| GotoAppError::ConfigError(Box::new(e)))?;

    tracing::info!("GoToApp v{} started", env!("CARGO_PKG_VERSION"));
    Ok(guard)
}

/// Shift `app.log` to `app.log.1`, `app.log.1` to `app.log.2` and so on,
/// dropping the oldest
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let (Some(log_dir), Some(log_name)) = (log_path.parent(), log_path.file_name()) else {
        return Err(GotoAppError::ConfigError(StringError::new(format!(
            "invalid log path {}",
            log_path.display()
        ))));
    };
    let log_name = log_name.to_string_lossy();
    let numbered = |i: u8| log_dir.join(format!("{log_name}.{i}"));

    let oldest = numbered(MAX_LOG_FILES);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }
    for i in (1..MAX_LOG_FILES).rev() {
        let current = numbered(i);
        if current.exists() {
            std::fs::rename(&current, numbered(i + 1))?;
        }
    }
    std::fs::rename(log_path, numbered(1))?;

    Ok(())
}
