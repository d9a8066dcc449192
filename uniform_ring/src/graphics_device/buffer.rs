/// Buffer trait and buffer descriptor

use std::any::Any;

use crate::error::Result;

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uniform/constant buffer
    Uniform,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Debug label attached to the allocation
    pub label: String,
}

impl BufferDesc {
    /// Descriptor for a CPU-writable uniform buffer of `size` bytes
    pub fn uniform(size: u64, label: impl Into<String>) -> Self {
        Self {
            size,
            usage: BufferUsage::Uniform,
            label: label.into(),
        }
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: Send + Sync + 'static {
    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Raw pointer to persistently mapped memory
    ///
    /// Returns None if the buffer is not CPU-accessible (device-local only).
    /// The pointer remains valid for the lifetime of the buffer.
    fn mapped_ptr(&self) -> Option<*mut u8>;

    /// Downcast hook so a backend can recover its own buffer type (and the
    /// native handle) when binding the buffer into a rendering command
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
