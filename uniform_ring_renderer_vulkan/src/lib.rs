/*!
# Uniform Ring - Vulkan Backend

Vulkan implementation of the uniform ring device traits.

This crate provides a headless Vulkan device that implements
`uniform_ring::ring::GraphicsDevice` using the Ash library for Vulkan
bindings and gpu-allocator for memory management. Slot buffers are
host-visible, host-coherent and persistently mapped, so the rotator's
writes reach the GPU without explicit flushes.
*/

// Vulkan implementation modules
mod vulkan;
mod vulkan_buffer;
mod vulkan_context;

// Main ring namespace module
pub mod ring {
    pub use crate::vulkan::{VulkanGraphicsDevice, Config};
    pub use crate::vulkan_buffer::Buffer as VulkanBuffer;
}
