/// GpuContext - Shared Vulkan objects for the device and its buffers
///
/// Contains everything a buffer needs to outlive the device handle that
/// created it:
/// - Entry and instance (destroyed last)
/// - Logical device for Vulkan API calls
/// - Allocator for memory management

use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

/// Shared GPU context for all Vulkan resources.
///
/// Shared (via `Arc`) by the device and every buffer. Vulkan objects are
/// destroyed when the last owner goes away, so a slot still held by a
/// `UniformSlot` keeps the device alive.
pub struct GpuContext {
    /// Vulkan entry (must outlive the instance)
    _entry: ash::Entry,

    /// Vulkan instance
    instance: ash::Instance,

    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (requires mutex for thread safety)
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,
}

impl GpuContext {
    /// Create a new GPU context
    ///
    /// # Arguments
    ///
    /// * `entry` - Loaded Vulkan entry points
    /// * `instance` - Vulkan instance
    /// * `device` - Vulkan logical device
    /// * `allocator` - GPU memory allocator
    pub fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        device: ash::Device,
        allocator: Allocator,
    ) -> Self {
        Self {
            _entry: entry,
            instance,
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // Free VkDeviceMemory pages BEFORE destroying the device
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
