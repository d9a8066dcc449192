/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Buffers keep their contents in host memory so tests can read back
/// exactly what the rotator wrote. The device can be told to fail after a
/// number of successful allocations to exercise error propagation.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, Buffer, BufferDesc, BufferUsage};

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub usage: BufferUsage,
    pub name: String,
    contents: Mutex<Vec<u8>>,
    update_count: Mutex<usize>,
    reject_writes: AtomicBool,
}

impl MockBuffer {
    pub fn new(size: u64, usage: BufferUsage, name: String) -> Self {
        Self {
            size,
            usage,
            name,
            contents: Mutex::new(vec![0xCD; size as usize]),
            update_count: Mutex::new(0),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Make every following update() fail with a backend error
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Copy of the current buffer bytes
    pub fn contents(&self) -> Vec<u8> {
        self.contents.lock().unwrap().clone()
    }

    /// Number of successful update() calls
    pub fn update_count(&self) -> usize {
        *self.update_count.lock().unwrap()
    }
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(Error::BackendError(format!("buffer '{}' rejected write", self.name)));
        }
        let end = offset as usize + data.len();
        if end > self.size as usize {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at offset {} overflows buffer '{}' ({} bytes)",
                data.len(), offset, self.name, self.size
            )));
        }
        self.contents.lock().unwrap()[offset as usize..end].copy_from_slice(data);
        *self.update_count.lock().unwrap() += 1;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mapped_ptr(&self) -> Option<*mut u8> {
        None
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that tracks created buffers without GPU
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    /// Every buffer handed out, in creation order
    pub created_buffers: Arc<Mutex<Vec<Arc<MockBuffer>>>>,
    /// Fail with OutOfMemory once this many buffers exist
    pub fail_after: Option<usize>,
}

impl MockGraphicsDevice {
    /// Create a new mock device
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock device whose allocations fail after `count` successes
    pub fn failing_after(count: usize) -> Self {
        Self {
            fail_after: Some(count),
            ..Self::default()
        }
    }

    /// Buffer created at position `index`
    pub fn buffer(&self, index: usize) -> Arc<MockBuffer> {
        Arc::clone(&self.created_buffers.lock().unwrap()[index])
    }

    /// Names of created buffers
    pub fn get_created_buffers(&self) -> Vec<String> {
        self.created_buffers
            .lock()
            .unwrap()
            .iter()
            .map(|buffer| buffer.name.clone())
            .collect()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        let mut created = self.created_buffers.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if created.len() >= limit {
                return Err(Error::OutOfMemory);
            }
        }
        let buffer = Arc::new(MockBuffer::new(desc.size, desc.usage, desc.label));
        created.push(Arc::clone(&buffer));
        Ok(buffer)
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
