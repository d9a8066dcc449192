//! Internal logging system for the uniform ring
//!
//! This module provides a small pluggable logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - Thread-safe global logger behind a RwLock
//! - File and line information for detailed ERROR logs

use colored::*;
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Logger trait for custom logging implementations
///
/// Implement this trait to route ring diagnostics into an application's
/// own logging (file, in-game console, ...).
///
/// # Example
///
/// ```no_run
/// use uniform_ring::ring::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "uniform_ring::Rotator", "uniform_ring::vulkan")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame information (acquire/release), very verbose
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            );
        }
    }
}

// ===== GLOBAL LOGGER API =====

/// Replace the global logger
///
/// # Example
///
/// ```no_run
/// use uniform_ring::ring::log::{set_logger, DefaultLogger};
///
/// set_logger(DefaultLogger);
/// ```
pub fn set_logger<L: Logger + 'static>(logger: L) {
    let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
    if let Ok(mut lock) = logger_lock.write() {
        *lock = Box::new(logger);
    }
}

/// Reset the global logger to DefaultLogger
pub fn reset_logger() {
    let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
    if let Ok(mut lock) = logger_lock.write() {
        *lock = Box::new(DefaultLogger);
    }
}

/// Internal logging entry point (for simple logs without file:line)
///
/// Used by macros like ring_info!, ring_warn!, etc.
#[doc(hidden)]
pub fn emit(severity: LogSeverity, source: &str, message: String) {
    let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
    if let Ok(lock) = logger_lock.read() {
        lock.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }
}

/// Internal logging entry point with file:line information (for ERROR logs)
#[doc(hidden)]
pub fn emit_detailed(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: &'static str,
    line: u32,
) {
    let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
    if let Ok(lock) = logger_lock.read() {
        lock.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (per-frame noise, typically filtered out)
#[macro_export]
macro_rules! ring_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit(
            $crate::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
///
/// # Example
///
/// ```no_run
/// uniform_ring::ring_debug!("uniform_ring::Rotator", "Closing with {} slots outstanding", 2);
/// ```
#[macro_export]
macro_rules! ring_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit(
            $crate::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
#[macro_export]
macro_rules! ring_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit(
            $crate::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
#[macro_export]
macro_rules! ring_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit(
            $crate::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```no_run
/// uniform_ring::ring_error!("uniform_ring::Rotator", "Failed to allocate slot {}", 1);
/// ```
#[macro_export]
macro_rules! ring_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
