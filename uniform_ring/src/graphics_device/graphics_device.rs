/// GraphicsDevice trait - buffer factory implemented by backends

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc};

/// Graphics device trait
///
/// The allocator collaborator of the rotator: creates device-visible
/// buffers the CPU can write raw bytes into and a rendering command can
/// bind. Implemented by backend-specific devices (e.g., VulkanGraphicsDevice).
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor
    ///
    /// # Returns
    ///
    /// A shared pointer to the created buffer
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` when the device cannot satisfy the allocation,
    /// `Error::BackendError` for any other backend failure.
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;
}
