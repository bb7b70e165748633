//! Logger module
//!
//! Provides logging utilities for the wiki server including:
//! - Server lifecycle logging
//! - Page store and rendering fault logging
//! - Access logging in combined, common or JSON format
//! - File-based logging support and a minimum level filter

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use chrono::Local;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::Config;
use crate::page::{StoreError, Title};

/// Log severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    /// Parse a configured level name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" | "trace" => Some(Self::Debug),
            _ => None,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::Warn,
            2 => Self::Info,
            _ => Self::Debug,
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = Level::parse(&config.logging.level).unwrap_or(Level::Info);
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?;
    if Level::parse(&config.logging.level).is_none() {
        log_warning(&format!(
            "Unknown log level '{}', using info",
            config.logging.level
        ));
    }
    Ok(())
}

pub fn enabled(level: Level) -> bool {
    level <= Level::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

fn stamp(level: Level, message: &str) -> String {
    format!(
        "{} [{}] {message}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level.tag()
    )
}

/// Write a leveled line: errors and warnings to the error target, the rest to info
fn write(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    let line = stamp(level, message);
    match (level, writer::get()) {
        (Level::Error | Level::Warn, Some(w)) => w.write_error(&line),
        (Level::Error | Level::Warn, None) => eprintln!("{line}"),
        (_, Some(w)) => w.write_info(&line),
        (_, None) => println!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    log_info("======================================");
    log_info("Wiki server started successfully");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Data directory: {}", config.wiki.data_dir));
    log_info(&format!("Front page: /view/{}", config.wiki.front_page));
    log_info(&format!("Max body size: {} bytes", config.http.max_body_size));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        log_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    log_info("======================================");
}

pub fn log_shutdown(active_connections: usize) {
    log_info(&format!(
        "Shutdown requested, no longer accepting connections ({active_connections} still open)"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write(Level::Error, message);
}

pub fn log_warning(message: &str) {
    write(Level::Warn, message);
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

pub fn log_debug(message: &str) {
    write(Level::Debug, message);
}

pub fn log_page_saved(title: &Title, bytes: usize) {
    log_debug(&format!("[Page] Saved {title} ({bytes} bytes)"));
}

pub fn log_page_missing(title: &Title) {
    log_debug(&format!("[Page] {title} does not exist, redirecting to edit"));
}

pub fn log_store_error(err: &StoreError) {
    log_error(&format!("[Page] Store failure: {err}"));
}

pub fn log_render_error(template: &str, err: &impl std::fmt::Display) {
    log_error(&format!("[Template] '{template}': {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(Level::parse("error"), Some(Level::Error));
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse("Info"), Some(Level::Info));
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse("verbose"), None);
    }

    #[test]
    fn test_level_order() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Info < Level::Debug);
        assert_eq!(Level::from_u8(Level::Warn as u8), Level::Warn);
    }

    #[test]
    fn test_stamp_contains_tag() {
        let line = stamp(Level::Warn, "disk almost full");
        assert!(line.ends_with("[WARN] disk almost full"));
    }
}
