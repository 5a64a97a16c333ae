//! Logger module
//!
//! Provides logging utilities for the video service including:
//! - Server lifecycle logging
//! - Upload and retrieval events
//! - Access logging with multiple formats
//! - Error and warning logging, optionally to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse::<LogLevel>().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, falling back to info");
        LogLevel::Info
    });

    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write a message; before `init` everything goes to stdout/stderr
fn write(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level <= LogLevel::Warn => eprintln!("{message}"),
        None => println!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, storage_root: &Path) {
    write(LogLevel::Info, "======================================");
    write(LogLevel::Info, "Emergency video server started");
    write(LogLevel::Info, &format!("Listening on: http://{addr}"));
    write(
        LogLevel::Info,
        &format!("Storage directory: {}", storage_root.display()),
    );
    write(LogLevel::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write(LogLevel::Info, &format!("Max connections: {max}"));
    }
    write(
        LogLevel::Info,
        &format!("Max upload size: {} bytes", config.http.max_body_size),
    );
    if let Some(ref path) = config.logging.access_log_file {
        write(LogLevel::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(LogLevel::Info, &format!("Error log: {path}"));
    }
    write(LogLevel::Info, "======================================");
}

pub fn log_shutdown(reason: &str) {
    write(
        LogLevel::Info,
        &format!("[Shutdown] {reason} received, no longer accepting connections"),
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(LogLevel::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(
        LogLevel::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_upload_saved(file_name: &str, bytes: u64) {
    write(
        LogLevel::Info,
        &format!("[Upload] Saved {file_name} ({bytes} bytes)"),
    );
}

pub fn log_upload_rejected(content_type: Option<&str>) {
    write(
        LogLevel::Warn,
        &format!(
            "[WARN] Upload rejected, declared content type: {}",
            content_type.unwrap_or("<none>")
        ),
    );
}

pub fn log_video_not_found(file_name: &str) {
    write(LogLevel::Debug, &format!("[Video] Not found: {file_name}"));
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
