/// Buffer - Vulkan implementation of the Buffer trait

use uniform_ring::ring::{
    Result,
    Error,
    Buffer as RingBuffer,
};
use uniform_ring::ring_err;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::any::Any;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan buffer implementation
pub struct Buffer {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    buffer: vk::Buffer,
    /// GPU memory allocation
    allocation: Option<Allocation>,
    /// Buffer size
    size: u64,
}

impl Buffer {
    /// Wrap a created and bound Vulkan buffer
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
    ) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size,
        }
    }

    /// Native handle, for descriptor writes
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }
}

impl RingBuffer for Buffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.saturating_add(data.len() as u64);
        if end > self.size {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, self.size
            )));
        }

        let allocation = self.allocation
            .as_ref()
            .ok_or_else(|| ring_err!("uniform_ring::vulkan", "Buffer update failed: no GPU allocation"))?;

        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::InvalidResource("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                mapped_ptr.add(offset as usize),
                data.len(),
            );
        }

        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mapped_ptr(&self) -> Option<*mut u8> {
        self.allocation
            .as_ref()
            .and_then(|allocation| allocation.mapped_ptr())
            .map(|ptr| ptr.as_ptr() as *mut u8)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
