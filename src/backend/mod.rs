// Backend module - thin Vulkan abstraction over ash
//
// One module per lifecycle stage: device setup, swapchain, buffer/memory,
// descriptors, pipeline, shaders, synchronization.

pub mod buffer;
pub mod descriptor;
pub mod device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;

pub use device::VulkanDevice;
pub use swapchain::Swapchain;
