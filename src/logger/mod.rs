//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod history;
pub mod writer;

pub use format::AccessLogEntry;
pub use history::{RequestHistory, RequestRecord};

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.is_debug(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn debug_enabled() -> bool {
    writer::get().is_some_and(writer::LogWriter::debug_enabled)
}

/// Print the startup banner line by line
pub fn log_banner(lines: &[String]) {
    for line in lines {
        write_info(line);
    }
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    if debug_enabled() {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_traversal_blocked(request_path: &str, peer: &SocketAddr) {
    log_warning(&format!(
        "Path traversal attempt blocked: {request_path} from {peer}"
    ));
}

pub fn log_spa_fallback(request_path: &str) {
    log_debug(&format!("Served index document for {request_path} (SPA routing)"));
}

pub fn log_shutdown_started(active: usize) {
    log_info(&format!(
        "Shutdown requested, waiting for {active} active connection(s)"
    ));
}

pub fn log_shutdown_complete() {
    log_info("Server stopped");
}
