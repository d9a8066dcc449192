/*!
# Uniform Ring

Frame-in-flight uniform buffer rotation for GPU rendering pipelines.

The CPU writes the next frame's transform data into one of N device-visible
slots while the GPU may still be reading the slots of previous frames. Reuse
of a slot is gated by a counting semaphore so that at most N slots are ever
checked out.

## Architecture

- **GraphicsDevice**: Factory trait for creating GPU buffers (backend supplied)
- **Buffer**: Device-visible buffer resource trait
- **SlotLayout**: Byte layout of one slot (projection, model-view, flags)
- **FrameSemaphore**: Counting semaphore bounding outstanding slots
- **FrameBufferRotator**: Round-robin slot pool handing out `UniformSlot` guards

Backend implementations (Vulkan, ...) provide concrete types that implement
the device traits.
*/

// Internal modules
mod error;
pub mod log;
pub mod graphics_device;
pub mod slot_layout;
pub mod frame_semaphore;
pub mod frame_buffer_rotator;

// Main ring namespace module
pub mod ring {
    // Error types
    pub use crate::error::{Error, Result};

    // Rotator and its guard
    pub use crate::frame_buffer_rotator::{FrameBufferRotator, RotatorConfig, UniformSlot};
    pub use crate::frame_semaphore::FrameSemaphore;

    // Device traits
    pub use crate::graphics_device::{GraphicsDevice, Buffer, BufferDesc, BufferUsage};

    // Slot layout
    pub use crate::slot_layout::{
        SlotLayout, SlotFlags, RawMatrix,
        FLOAT_SIZE, FLOATS_PER_MATRIX, MATRIX_SIZE, NUMBER_OF_MATRICES,
        FLAGS_REGION_SIZE, SLOT_SIZE,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }
}

// Re-export math library at crate root
pub use glam;
