// Descriptor layout, pool, and set management
//
// The samples bind a single uniform buffer (the MVP matrix) at binding 0 of
// set 0, visible to the vertex stage.

use anyhow::{Context, Result};
use ash::vk;
use super::VulkanDevice;

/// Create the descriptor set layout: one uniform buffer at binding 0.
pub fn create_descriptor_set_layout(device: &VulkanDevice) -> Result<vk::DescriptorSetLayout> {
    let bindings = [vk::DescriptorSetLayoutBinding::default()
        .binding(0)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .descriptor_count(1)
        .stage_flags(vk::ShaderStageFlags::VERTEX)];

    let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

    unsafe {
        device
            .device
            .create_descriptor_set_layout(&layout_info, None)
            .context("Failed to create descriptor set layout")
    }
}

/// Create the pipeline layout from the given set layouts.
pub fn create_pipeline_layout(
    device: &VulkanDevice,
    set_layouts: &[vk::DescriptorSetLayout],
) -> Result<vk::PipelineLayout> {
    let layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(set_layouts);

    unsafe {
        device
            .device
            .create_pipeline_layout(&layout_info, None)
            .context("Failed to create pipeline layout")
    }
}

/// Create a descriptor pool sized for `max_sets` uniform-buffer sets.
pub fn create_descriptor_pool(
    device: &VulkanDevice,
    max_sets: u32,
) -> Result<vk::DescriptorPool> {
    let pool_sizes = [vk::DescriptorPoolSize::default()
        .ty(vk::DescriptorType::UNIFORM_BUFFER)
        .descriptor_count(max_sets)];

    let pool_info = vk::DescriptorPoolCreateInfo::default()
        .max_sets(max_sets)
        .pool_sizes(&pool_sizes);

    unsafe {
        device
            .device
            .create_descriptor_pool(&pool_info, None)
            .context("Failed to create descriptor pool")
    }
}

/// Allocate a single descriptor set from the pool.
pub fn allocate_descriptor_set(
    device: &VulkanDevice,
    pool: vk::DescriptorPool,
    layout: vk::DescriptorSetLayout,
) -> Result<vk::DescriptorSet> {
    let layouts = [layout];
    let alloc_info = vk::DescriptorSetAllocateInfo::default()
        .descriptor_pool(pool)
        .set_layouts(&layouts);

    let sets = unsafe {
        device
            .device
            .allocate_descriptor_sets(&alloc_info)
            .context("Failed to allocate descriptor set")?
    };

    Ok(sets[0])
}

/// Point binding 0 of `set` at the uniform buffer.
pub fn write_uniform_buffer(
    device: &VulkanDevice,
    set: vk::DescriptorSet,
    buffer: vk::Buffer,
    range: vk::DeviceSize,
) {
    let buffer_info = [vk::DescriptorBufferInfo::default()
        .buffer(buffer)
        .offset(0)
        .range(range)];

    let writes = [vk::WriteDescriptorSet::default()
        .dst_set(set)
        .dst_binding(0)
        .dst_array_element(0)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .buffer_info(&buffer_info)];

    unsafe {
        device.device.update_descriptor_sets(&writes, &[]);
    }
}
