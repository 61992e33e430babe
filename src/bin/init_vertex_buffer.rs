// Vertex buffer sample: headless, offscreen.
//
// Walks the driver lifecycle once without a window: device setup, command
// pool/buffer, vertex + uniform buffer creation with mapped uploads, an
// offscreen color target standing in for the swapchain, descriptor set,
// pipeline, one recorded submit gated by the fence timeout loop, then
// reverse-order teardown.

use anyhow::{Context, Result};
use ash::vk;
use vk_samples::backend::{buffer, descriptor, pipeline, shader, sync};
use vk_samples::{cube, Config, VulkanDevice};

const EXTENT: vk::Extent2D = vk::Extent2D {
    width: 512,
    height: 512,
};
const COLOR_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

fn main() -> Result<()> {
    vk_samples::init_logging();
    let config = Config::load();
    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let enable_validation = cfg!(debug_assertions) && config.debug.validation_layers;
    let device = VulkanDevice::new_headless("Vertex Buffer Sample", enable_validation)?;

    // Command pool and one primary command buffer
    let pool_info = vk::CommandPoolCreateInfo::default()
        .queue_family_index(device.graphics_queue_family);
    let command_pool = unsafe { device.device.create_command_pool(&pool_info, None)? };

    let alloc_info = vk::CommandBufferAllocateInfo::default()
        .command_pool(command_pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(1);
    let cmd = unsafe { device.device.allocate_command_buffers(&alloc_info)? }[0];

    // Offscreen color target in place of a swapchain image
    let render_pass = pipeline::create_render_pass(
        &device,
        COLOR_FORMAT,
        false,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    )?;
    let (color_image, color_memory, color_view) =
        buffer::create_color_target(&device, EXTENT, COLOR_FORMAT)?;
    let framebuffers =
        pipeline::create_framebuffers(&device, &[color_view], None, render_pass, EXTENT)?;

    // Vertex and uniform buffers via mapped host-visible uploads
    let (vertex_buffer, vertex_memory) = buffer::create_buffer_with_data(
        &device,
        vk::BufferUsageFlags::VERTEX_BUFFER,
        &cube::TRIANGLE,
    )?;

    let mvp = glam::Mat4::IDENTITY;
    let (uniform_buffer, uniform_memory) = buffer::create_buffer_with_data(
        &device,
        vk::BufferUsageFlags::UNIFORM_BUFFER,
        std::slice::from_ref(&mvp),
    )?;

    // Descriptor set layout, pipeline layout, pool, and the one set
    let set_layout = descriptor::create_descriptor_set_layout(&device)?;
    let pipeline_layout = descriptor::create_pipeline_layout(&device, &[set_layout])?;
    let descriptor_pool = descriptor::create_descriptor_pool(&device, 1)?;
    let descriptor_set =
        descriptor::allocate_descriptor_set(&device, descriptor_pool, set_layout)?;
    descriptor::write_uniform_buffer(
        &device,
        descriptor_set,
        uniform_buffer,
        std::mem::size_of::<glam::Mat4>() as vk::DeviceSize,
    );

    // Shaders and pipeline
    let vert_shader = shader::load_shader_module(&device, "shaders/cube.vert.spv")?;
    let frag_shader = shader::load_shader_module(&device, "shaders/cube.frag.spv")?;
    let pipeline_cache = pipeline::create_pipeline_cache(&device)?;

    let vertex_bindings = [cube::Vertex::binding_description()];
    let vertex_attributes = cube::Vertex::attribute_descriptions();
    let graphics_pipeline = pipeline::create_graphics_pipeline(
        &device,
        pipeline_cache,
        render_pass,
        pipeline_layout,
        vert_shader,
        frag_shader,
        &vertex_bindings,
        &vertex_attributes,
        false,
    )?;

    // Record the render pass inline: bind, set dynamic state, draw
    unsafe {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        device.device.begin_command_buffer(cmd, &begin_info)?;

        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: config.graphics.clear_color,
            },
        }];

        let rp_begin = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass)
            .framebuffer(framebuffers[0])
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: EXTENT,
            })
            .clear_values(&clear_values);

        device
            .device
            .cmd_begin_render_pass(cmd, &rp_begin, vk::SubpassContents::INLINE);

        device.device.cmd_bind_pipeline(
            cmd,
            vk::PipelineBindPoint::GRAPHICS,
            graphics_pipeline,
        );
        device.device.cmd_bind_descriptor_sets(
            cmd,
            vk::PipelineBindPoint::GRAPHICS,
            pipeline_layout,
            0,
            &[descriptor_set],
            &[],
        );
        device
            .device
            .cmd_bind_vertex_buffers(cmd, 0, &[vertex_buffer], &[0]);

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: EXTENT.width as f32,
            height: EXTENT.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        device.device.cmd_set_viewport(cmd, 0, &[viewport]);

        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: EXTENT,
        };
        device.device.cmd_set_scissor(cmd, 0, &[scissor]);

        device
            .device
            .cmd_draw(cmd, cube::TRIANGLE.len() as u32, 1, 0, 0);
        device.device.cmd_end_render_pass(cmd);
        device.device.end_command_buffer(cmd)?;
    }

    // Submit and wait, retrying while the fence reports TIMEOUT
    let fence_info = vk::FenceCreateInfo::default();
    let draw_fence = unsafe { device.device.create_fence(&fence_info, None)? };

    let command_buffers = [cmd];
    let submit_info = vk::SubmitInfo::default()
        .command_buffers(&command_buffers);

    unsafe {
        device
            .device
            .queue_submit(device.graphics_queue, &[submit_info], draw_fence)
            .context("Failed to submit command buffer")?;
    }

    sync::wait_for_draw_fence(&device, draw_fence)?;
    log::info!("Drew {} vertices offscreen", cube::TRIANGLE.len());

    // Teardown in reverse creation order
    device.wait_idle()?;
    unsafe {
        let d = &device.device;
        d.destroy_fence(draw_fence, None);
        d.destroy_pipeline(graphics_pipeline, None);
        d.destroy_pipeline_cache(pipeline_cache, None);
        d.destroy_shader_module(frag_shader, None);
        d.destroy_shader_module(vert_shader, None);
        d.destroy_descriptor_pool(descriptor_pool, None);
        d.destroy_pipeline_layout(pipeline_layout, None);
        d.destroy_descriptor_set_layout(set_layout, None);
        d.destroy_buffer(uniform_buffer, None);
        d.free_memory(uniform_memory, None);
        d.destroy_buffer(vertex_buffer, None);
        d.free_memory(vertex_memory, None);
        for framebuffer in framebuffers {
            d.destroy_framebuffer(framebuffer, None);
        }
        d.destroy_image_view(color_view, None);
        d.destroy_image(color_image, None);
        d.free_memory(color_memory, None);
        d.destroy_render_pass(render_pass, None);
        d.destroy_command_pool(command_pool, None);
    }

    Ok(())
}
