/// VulkanGraphicsDevice - Vulkan implementation of GraphicsDevice trait

use uniform_ring::ring::{GraphicsDevice, Result, Error};
use uniform_ring::ring::{Buffer as RingBuffer, BufferDesc, BufferUsage};
use uniform_ring::{ring_debug, ring_error, ring_info, ring_err};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::ffi::CString;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;

const LOG_SOURCE: &str = "uniform_ring::vulkan";

/// Vulkan device configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation layers (needs the `vulkan-validation` feature)
    pub enable_validation: bool,
    /// Application name reported to the driver
    pub app_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Uniform Ring Application".to_string(),
        }
    }
}

/// Headless Vulkan device
///
/// Creates an instance, picks the first GPU exposing a graphics queue and
/// creates a logical device plus a gpu-allocator `Allocator`. No surface or
/// swapchain: the device only allocates buffers for the rotator.
pub struct VulkanGraphicsDevice {
    /// Shared GPU context (owns device and instance destruction)
    gpu_context: Arc<GpuContext>,
    /// Name of the selected GPU
    device_name: String,
    /// Queue family used to create the device
    queue_family: u32,
}

impl VulkanGraphicsDevice {
    /// Create a new headless Vulkan device
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` if the Vulkan library, a GPU or the
    /// allocator is unavailable.
    pub fn new(config: Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| {
                    ring_error!(LOG_SOURCE, "Failed to load Vulkan library: {:?}", e);
                    Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
                })?;

            let app_name = CString::new(config.app_name.clone())
                .map_err(|_| Error::InitializationFailed("Application name contains a NUL byte".to_string()))?;

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"UniformRing")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            let layer_names = if cfg!(feature = "vulkan-validation") && config.enable_validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| {
                    ring_error!(LOG_SOURCE, "Failed to create Vulkan instance: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
                })?;

            // Pick the first physical device with a graphics queue
            let physical_devices = match instance.enumerate_physical_devices() {
                Ok(devices) => devices,
                Err(e) => {
                    instance.destroy_instance(None);
                    ring_error!(LOG_SOURCE, "Failed to enumerate physical devices: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e)));
                }
            };

            let selected = physical_devices.into_iter().find_map(|physical_device| {
                instance
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|family| (physical_device, family as u32))
            });

            let Some((physical_device, queue_family)) = selected else {
                instance.destroy_instance(None);
                ring_error!(LOG_SOURCE, "No Vulkan-capable GPU found");
                return Err(Error::InitializationFailed("No Vulkan-capable GPU found".to_string()));
            };

            let properties = instance.get_physical_device_properties(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string());

            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&queue_priorities)];

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos);

            let device = match instance.create_device(physical_device, &device_create_info, None) {
                Ok(device) => device,
                Err(e) => {
                    instance.destroy_instance(None);
                    ring_error!(LOG_SOURCE, "Failed to create logical device: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to create device: {:?}", e)));
                }
            };

            let allocator = match Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            }) {
                Ok(allocator) => allocator,
                Err(e) => {
                    device.destroy_device(None);
                    instance.destroy_instance(None);
                    ring_error!(LOG_SOURCE, "Failed to create GPU allocator: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to create allocator: {:?}", e)));
                }
            };

            ring_info!(LOG_SOURCE, "Using GPU '{}' (queue family {})", device_name, queue_family);

            Ok(Self {
                gpu_context: Arc::new(GpuContext::new(entry, instance, device, allocator)),
                device_name,
                queue_family,
            })
        }
    }

    /// Name of the selected GPU
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Queue family index the device was created with
    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn RingBuffer>> {
        let device = &self.gpu_context.device;
        unsafe {
            let usage = match desc.usage {
                BufferUsage::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
            };

            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = device.create_buffer(&buffer_create_info, None)
                .map_err(|e| ring_err!(LOG_SOURCE, "Failed to create buffer '{}' of size {} bytes: {:?}", desc.label, desc.size, e))?;

            let requirements = device.get_buffer_memory_requirements(buffer);

            let allocation = {
                let mut allocator = match self.gpu_context.allocator.lock() {
                    Ok(allocator) => allocator,
                    Err(_) => {
                        device.destroy_buffer(buffer, None);
                        return Err(Error::BackendError("Allocator lock poisoned".to_string()));
                    }
                };
                allocator.allocate(&AllocationCreateDesc {
                    name: &desc.label,
                    requirements,
                    location: MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
            };

            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(_) => {
                    device.destroy_buffer(buffer, None);
                    ring_error!(LOG_SOURCE, "Out of GPU memory for buffer '{}' (required: {} bytes)",
                        desc.label, requirements.size);
                    return Err(Error::OutOfMemory);
                }
            };

            let bound = device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset());
            // Wrap first so the allocation and buffer are released on failure
            let buffer = Buffer::new(Arc::clone(&self.gpu_context), buffer, allocation, desc.size);
            bound.map_err(|e| ring_err!(LOG_SOURCE, "Failed to bind buffer memory: {:?}", e))?;

            ring_debug!(LOG_SOURCE, "Created buffer '{}' ({} bytes)", desc.label, desc.size);
            Ok(Arc::new(buffer))
        }
    }
}
