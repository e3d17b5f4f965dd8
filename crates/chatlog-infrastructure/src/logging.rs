//! Logging setup.
//!
//! Diagnostics go to a daily rolling file in the chatlog state directory so
//! they never interleave with interactive output.

use crate::paths::ChatlogPaths;
use chatlog_core::config::LoggingConfig;
use chatlog_core::error::{ChatlogError, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "chatlog.log";

/// Guard that keeps the background log writer alive.
///
/// Dropping it flushes pending records.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initializes logging into the default state directory.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = ChatlogPaths::state_dir().map_err(|e| ChatlogError::config(e.to_string()))?;
    init_in(config, &log_dir)
}

/// Initializes logging into `log_dir`.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_in(config: &LoggingConfig, log_dir: &Path) -> Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        ChatlogError::storage(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| ChatlogError::config(format!("Logging already initialized: {}", e)))?;

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Initializes logging for tests (captured by the test harness).
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
