/// FrameBufferRotator - round-robin pool of per-frame uniform slots
///
/// Holds N device-visible buffers ("slots"). Each `acquire` waits for a free
/// permit, writes the frame's matrices and flags into the slot under the
/// cursor, advances the cursor modulo N and hands the slot out as a
/// `UniformSlot` guard. Dropping the guard (typically from the GPU
/// completion handler, on any thread) returns the permit.
///
/// Invariant: `available + outstanding == in_flight_count`. Releases are not
/// correlated to slot identity; the FIFO completion order of the GPU queue
/// is what makes the recycled slot the one the GPU finished with.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::frame_semaphore::FrameSemaphore;
use crate::graphics_device::{GraphicsDevice, Buffer, BufferDesc};
use crate::slot_layout::{RawMatrix, SlotFlags, SlotLayout, SLOT_SIZE};
use crate::{ring_debug, ring_error, ring_info, ring_trace};

const LOG_SOURCE: &str = "uniform_ring::Rotator";

// ===== CONFIGURATION =====

/// Rotator configuration
#[derive(Debug, Clone)]
pub struct RotatorConfig {
    /// Number of slots, i.e. frames the CPU may run ahead of the GPU
    pub in_flight_count: usize,
    /// Debug label for the slot buffers (suffixed with " #index")
    pub label: String,
}

impl RotatorConfig {
    /// Default configuration with a different slot count
    pub fn with_in_flight_count(in_flight_count: usize) -> Self {
        Self {
            in_flight_count,
            ..Self::default()
        }
    }
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            in_flight_count: 3,
            label: "Uniform buffer".to_string(),
        }
    }
}

// ===== SHARED STATE =====

/// State shared by the rotator and every outstanding guard
struct RotatorShared {
    slots: Vec<Arc<dyn Buffer>>,
    cursor: AtomicUsize,
    semaphore: FrameSemaphore,
}

impl RotatorShared {
    /// Advance the cursor and return the slot index it pointed at
    fn next_index(&self) -> usize {
        let count = self.slots.len();
        self.cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cursor| Some((cursor + 1) % count))
            .unwrap_or_else(|cursor| cursor)
    }

    fn return_permit(&self, index: usize) {
        match self.semaphore.release() {
            Ok(()) => ring_trace!(LOG_SOURCE, "Released slot {}", index),
            Err(e) => ring_error!(LOG_SOURCE, "Failed to release slot {}: {}", index, e),
        }
    }
}

// ===== ROTATOR =====

/// Round-robin uniform buffer pool
///
/// # Example
///
/// ```ignore
/// let rotator = FrameBufferRotator::new(&mut device, RotatorConfig::default())?;
///
/// // Render loop
/// let slot = rotator.acquire(&projection, &model_view, lighting, fog)?;
/// command_list.bind_uniform_buffer(slot.buffer());
/// queue.on_completed(move || drop(slot));
/// ```
pub struct FrameBufferRotator {
    shared: Arc<RotatorShared>,
}

impl FrameBufferRotator {
    /// Allocate `config.in_flight_count` slots of `SLOT_SIZE` bytes
    ///
    /// # Errors
    ///
    /// - `Error::InvalidConfig` if `in_flight_count` is zero
    /// - any error from `GraphicsDevice::create_buffer`, unchanged
    pub fn new<D>(device: &mut D, config: RotatorConfig) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
    {
        if config.in_flight_count == 0 {
            ring_error!(LOG_SOURCE, "Rotator needs at least one in-flight slot");
            return Err(Error::InvalidConfig(
                "in_flight_count must be at least 1".to_string(),
            ));
        }

        let mut slots = Vec::with_capacity(config.in_flight_count);
        for index in 0..config.in_flight_count {
            let desc = BufferDesc::uniform(SLOT_SIZE as u64, format!("{} #{}", config.label, index));
            let buffer = device.create_buffer(desc).map_err(|e| {
                ring_error!(LOG_SOURCE, "Failed to allocate slot {} of {}: {}",
                    index, config.in_flight_count, e);
                e
            })?;
            slots.push(buffer);
        }

        ring_info!(LOG_SOURCE, "Created uniform ring '{}': {} slots x {} bytes",
            config.label, config.in_flight_count, SLOT_SIZE);

        Ok(Self {
            shared: Arc::new(RotatorShared {
                slots,
                cursor: AtomicUsize::new(0),
                semaphore: FrameSemaphore::new(config.in_flight_count),
            }),
        })
    }

    /// Wait for a free slot and fill it with this frame's uniforms
    ///
    /// Blocks while every slot is outstanding. The projection matrix lands
    /// at offset 0, the model-view matrix at `MATRIX_SIZE` and the flags at
    /// `2 * MATRIX_SIZE`.
    ///
    /// # Errors
    ///
    /// - `Error::Closed` if the rotator is closed before a slot frees up
    /// - the buffer's write error; the permit is returned first
    pub fn acquire<P, M>(
        &self,
        projection: &P,
        model_view: &M,
        flag0: bool,
        flag1: bool,
    ) -> Result<UniformSlot>
    where
        P: RawMatrix + ?Sized,
        M: RawMatrix + ?Sized,
    {
        self.acquire_with(projection, model_view, SlotFlags::new(flag0, flag1))
    }

    /// Same as `acquire`, with the flags passed as a value
    pub fn acquire_with<P, M>(&self, projection: &P, model_view: &M, flags: SlotFlags) -> Result<UniformSlot>
    where
        P: RawMatrix + ?Sized,
        M: RawMatrix + ?Sized,
    {
        let semaphore = &self.shared.semaphore;
        if !semaphore.try_acquire()? {
            ring_trace!(LOG_SOURCE, "All {} slots in flight, waiting for release",
                self.in_flight_count());
            semaphore.acquire()?;
        }
        self.checkout(&SlotLayout::new(projection, model_view, flags))
    }

    /// Non-blocking acquire: `Ok(None)` when every slot is outstanding
    pub fn try_acquire<P, M>(&self, projection: &P, model_view: &M, flags: SlotFlags) -> Result<Option<UniformSlot>>
    where
        P: RawMatrix + ?Sized,
        M: RawMatrix + ?Sized,
    {
        if !self.shared.semaphore.try_acquire()? {
            return Ok(None);
        }
        self.checkout(&SlotLayout::new(projection, model_view, flags)).map(Some)
    }

    /// Acquire waiting at most `timeout`: `Ok(None)` when it elapses
    pub fn acquire_timeout<P, M>(
        &self,
        projection: &P,
        model_view: &M,
        flags: SlotFlags,
        timeout: Duration,
    ) -> Result<Option<UniformSlot>>
    where
        P: RawMatrix + ?Sized,
        M: RawMatrix + ?Sized,
    {
        if !self.shared.semaphore.acquire_timeout(timeout)? {
            ring_debug!(LOG_SOURCE, "No slot freed within {:?}", timeout);
            return Ok(None);
        }
        self.checkout(&SlotLayout::new(projection, model_view, flags)).map(Some)
    }

    /// Write `layout` into the slot under the cursor (permit already held)
    fn checkout(&self, layout: &SlotLayout) -> Result<UniformSlot> {
        let index = self.shared.next_index();
        let buffer = Arc::clone(&self.shared.slots[index]);

        if let Err(e) = buffer.update(0, layout.as_bytes()) {
            ring_error!(LOG_SOURCE, "Failed to write slot {}: {}", index, e);
            self.shared.return_permit(index);
            return Err(e);
        }

        ring_trace!(LOG_SOURCE, "Acquired slot {}", index);
        Ok(UniformSlot {
            index,
            buffer,
            shared: Arc::clone(&self.shared),
            released: false,
        })
    }

    /// Return one permit taken by a detached slot
    ///
    /// Only needed after `UniformSlot::detach`; guards release themselves.
    ///
    /// # Errors
    ///
    /// `Error::PermitOverflow` if no permit is outstanding.
    pub fn release(&self) -> Result<()> {
        self.shared.semaphore.release().map_err(|e| {
            ring_error!(LOG_SOURCE, "Release without matching acquire: {}", e);
            e
        })
    }

    /// Close the rotator and wake every thread blocked in `acquire`
    ///
    /// Woken and later acquirers fail with `Error::Closed`. Outstanding
    /// guards stay valid and return their permit exactly once when dropped;
    /// the counter is never pushed past the slot count.
    pub fn close(&self) {
        match self.shared.semaphore.close() {
            Ok(outstanding) => ring_debug!(LOG_SOURCE, "Closed uniform ring with {} of {} slots outstanding",
                outstanding, self.in_flight_count()),
            Err(e) => ring_error!(LOG_SOURCE, "Failed to close uniform ring: {}", e),
        }
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.shared.semaphore.is_closed()
    }

    /// Number of slots in the pool
    pub fn in_flight_count(&self) -> usize {
        self.shared.slots.len()
    }

    /// Size of one slot in bytes
    pub fn slot_size(&self) -> usize {
        SLOT_SIZE
    }

    /// Slots that can be acquired without blocking
    pub fn available(&self) -> usize {
        self.shared.semaphore.available()
    }

    /// Slots acquired and not yet released
    pub fn outstanding(&self) -> usize {
        self.in_flight_count() - self.available()
    }

    /// Index of the next slot to be handed out
    pub fn cursor(&self) -> usize {
        self.shared.cursor.load(Ordering::Acquire)
    }

    /// Buffer of slot `index`
    pub fn slot(&self, index: usize) -> Option<&Arc<dyn Buffer>> {
        self.shared.slots.get(index)
    }
}

impl fmt::Debug for FrameBufferRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBufferRotator")
            .field("in_flight_count", &self.in_flight_count())
            .field("available", &self.available())
            .field("cursor", &self.cursor())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for FrameBufferRotator {
    fn drop(&mut self) {
        if !self.is_closed() {
            self.close();
        }
    }
}

// ===== GUARD =====

/// One checked-out slot
///
/// Returns its permit exactly once, on `release()` or on drop. The guard is
/// `Send`, so it can be moved into a command-buffer completion callback.
///
/// Guards must be dropped in the order they were acquired. The permit a
/// guard returns is not tied to its index: the next `acquire` takes the slot
/// under the cursor, so dropping a newer guard while an older one is alive
/// hands the older guard's slot out a second time.
pub struct UniformSlot {
    index: usize,
    buffer: Arc<dyn Buffer>,
    shared: Arc<RotatorShared>,
    released: bool,
}

impl UniformSlot {
    /// Position of this slot in the pool
    pub fn index(&self) -> usize {
        self.index
    }

    /// Buffer to bind to the pipeline
    pub fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    /// Return the slot to the pool now
    pub fn release(mut self) {
        self.released = true;
        self.shared.return_permit(self.index);
    }

    /// Give up the guard but keep the permit checked out
    ///
    /// The caller takes over the pairing and must call
    /// `FrameBufferRotator::release` exactly once.
    pub fn detach(mut self) -> Arc<dyn Buffer> {
        self.released = true;
        Arc::clone(&self.buffer)
    }
}

impl fmt::Debug for UniformSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformSlot")
            .field("index", &self.index)
            .field("size", &self.buffer.size())
            .finish()
    }
}

impl Drop for UniformSlot {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.shared.return_permit(self.index);
        }
    }
}

#[cfg(test)]
#[path = "frame_buffer_rotator_tests.rs"]
mod tests;
