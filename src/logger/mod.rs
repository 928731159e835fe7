//! Logger module
//!
//! Provides logging utilities for the fake server including:
//! - Subscriber setup (stdout or a log file)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

/// Target used for access log lines. It is enabled at INFO whenever
/// `logging.access_log` is on, whatever `logging.level` says.
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global tracing subscriber
///
/// Should be called once at application startup. When a log file is
/// configured the returned guard must be held until exit so buffered
/// lines are flushed.
pub fn init(config: &LoggingConfig) -> io::Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    match config.log_file.as_deref() {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(filter),
                )
                .try_init()
                .map_err(io::Error::other)?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_filter(filter))
                .try_init()
                .map_err(io::Error::other)?;
            Ok(None)
        }
    }
}

/// `logging.level` for everything, with the access target switched
/// independently by `logging.access_log`
fn build_filter(config: &LoggingConfig) -> io::Result<Targets> {
    let level: LevelFilter = config.level.parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid log level '{}': {e}", config.level),
        )
    })?;
    let access = if config.access_log {
        LevelFilter::INFO
    } else {
        LevelFilter::OFF
    };

    Ok(Targets::new()
        .with_default(level)
        .with_target(ACCESS_TARGET, access))
}

fn split_log_path(path: &str) -> io::Result<(std::path::PathBuf, std::ffi::OsString)> {
    let path = Path::new(path);
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Log file path has no file name: {}", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    Ok((dir, file_name.to_os_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Fake DownloadStation started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("  - GET http://{addr}/webapi/auth.cgi?method=login");
    tracing::info!("  - GET http://{addr}/webapi/DownloadStation/task.cgi?method=list");
    tracing::info!("Session id: {}", config.fixture.sid);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_tasks_seeded(count: usize) {
    tracing::info!("[Tasks] Seeded {count} task(s)");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("[Signal] {signal} received, shutting down");
}

pub fn log_server_stopped() {
    tracing::info!("Server stopped");
}
