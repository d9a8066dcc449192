//! Error types for the uniform ring
//!
//! This module defines the error types used by the rotator, the frame
//! semaphore and the device backends.

use std::fmt;

/// Result type for uniform ring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Uniform ring errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (Vulkan, lock poisoning, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer too small, not CPU-accessible, etc.)
    InvalidResource(String),

    /// Initialization failed (device, allocator)
    InitializationFailed(String),

    /// Invalid configuration (e.g. zero in-flight slots)
    InvalidConfig(String),

    /// The rotator was closed while (or before) waiting for a slot
    Closed,

    /// More releases than acquisitions: the counter would exceed its capacity
    PermitOverflow {
        /// Number of permits the semaphore was created with
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Closed => write!(f, "Uniform ring is closed"),
            Error::PermitOverflow { capacity } => write!(
                f,
                "Release without matching acquire: availability counter would exceed {}",
                capacity
            ),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build an `Error::BackendError` from the message
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&info, None)
///     .map_err(|e| ring_err!("uniform_ring::vulkan", "Failed to create buffer: {:?}", e))?;
/// ```
#[macro_export]
macro_rules! ring_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::emit_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::ring::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with an `Error::BackendError`
#[macro_export]
macro_rules! ring_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::ring_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
