// Synchronization primitives
//
// Each sample uses exactly two: a fence that gates CPU-side reuse of the
// command buffer, and a semaphore that orders image acquisition against
// color-attachment output on the GPU.

use anyhow::Result;
use ash::vk;
use std::sync::Arc;
use super::VulkanDevice;

/// Fence wait timeout in nanoseconds (100 ms per attempt).
pub const FENCE_TIMEOUT: u64 = 100_000_000;

/// The sample frame's two synchronization primitives.
pub struct FrameSync {
    pub image_acquired: vk::Semaphore,
    pub draw_fence: vk::Fence,
}

impl FrameSync {
    /// Create the semaphore and an unsignaled fence; the fence is first
    /// waited on after the first submit signals it.
    pub fn new(device: &Arc<VulkanDevice>) -> Result<Self> {
        let semaphore_info = vk::SemaphoreCreateInfo::default();
        let fence_info = vk::FenceCreateInfo::default();

        unsafe {
            Ok(Self {
                image_acquired: device.device.create_semaphore(&semaphore_info, None)?,
                draw_fence: device.device.create_fence(&fence_info, None)?,
            })
        }
    }

    pub fn destroy(&self, device: &ash::Device) {
        unsafe {
            device.destroy_semaphore(self.image_acquired, None);
            device.destroy_fence(self.draw_fence, None);
        }
    }
}

/// Wait for the draw fence, retrying while the driver reports TIMEOUT.
///
/// Any other non-success status is an error.
pub fn wait_for_draw_fence(device: &VulkanDevice, fence: vk::Fence) -> Result<()> {
    loop {
        let result =
            unsafe { device.device.wait_for_fences(&[fence], true, FENCE_TIMEOUT) };

        match result {
            Ok(()) => return Ok(()),
            Err(vk::Result::TIMEOUT) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
