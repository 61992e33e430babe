// Draw Cube sample: windowed present loop.
//
// The progression's final step: swapchain plus depth buffer, a secondary
// command buffer re-recorded every frame and executed from a primary, and a
// bounded present loop synchronized by the image-acquired semaphore and the
// draw fence (waited with a timeout retry before each present).

use anyhow::{Context, Result};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;
use std::time::Instant;
use vk_samples::backend::{buffer, descriptor, pipeline, shader, sync};
use vk_samples::{cube, Config, Swapchain, VulkanDevice};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

fn main() -> Result<()> {
    vk_samples::init_logging();

    let config = Config::load();
    log::info!("Starting {}", config.window.title);
    log::info!(
        "Window: {}x{}, {} frames",
        config.window.width,
        config.window.height,
        config.graphics.frames
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

/// All Vulkan resources for the sample, torn down in reverse order in Drop.
struct Renderer {
    device: Arc<VulkanDevice>,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    // Dropped before the surface is destroyed
    swapchain: Option<Swapchain>,
    extent: vk::Extent2D,

    depth_image: vk::Image,
    depth_memory: vk::DeviceMemory,
    depth_view: vk::ImageView,

    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,

    vertex_buffer: vk::Buffer,
    vertex_memory: vk::DeviceMemory,
    uniform_buffer: vk::Buffer,
    uniform_memory: vk::DeviceMemory,

    set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    descriptor_pool: vk::DescriptorPool,
    descriptor_set: vk::DescriptorSet,

    vert_shader: vk::ShaderModule,
    frag_shader: vk::ShaderModule,
    pipeline_cache: vk::PipelineCache,
    pipeline: vk::Pipeline,

    command_pool: vk::CommandPool,
    primary_cmd: vk::CommandBuffer,
    secondary_cmd: vk::CommandBuffer,

    sync: sync::FrameSync,
    clear_color: [f32; 4],
}

impl Renderer {
    fn new(window: &Window, config: &Config) -> Result<Self> {
        let enable_validation = cfg!(debug_assertions) && config.debug.validation_layers;

        let display_handle = window
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();
        let window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();

        let device =
            VulkanDevice::new_windowed(&config.window.title, display_handle, enable_validation)?;

        // Surface
        let surface_loader =
            ash::khr::surface::Instance::new(device.entry(), &device.instance);
        let surface = unsafe {
            ash_window::create_surface(
                device.entry(),
                &device.instance,
                display_handle,
                window_handle,
                None,
            )
            .context("Failed to create surface")?
        };

        let surface_support = unsafe {
            surface_loader.get_physical_device_surface_support(
                device.physical_device,
                device.graphics_queue_family,
                surface,
            )?
        };
        if !surface_support {
            anyhow::bail!("GPU doesn't support presenting to this surface");
        }

        // Swapchain and depth buffer
        let size = window.inner_size();
        let swapchain = Swapchain::new(
            device.clone(),
            surface,
            &surface_loader,
            size.width,
            size.height,
            config.present_mode(),
        )?;
        let extent = swapchain.extent;

        let (depth_image, depth_memory, depth_view) =
            buffer::create_depth_buffer(&device, extent)?;

        // Render pass and framebuffers (color + shared depth)
        let render_pass = pipeline::create_render_pass(
            &device,
            swapchain.format,
            true,
            vk::ImageLayout::PRESENT_SRC_KHR,
        )?;
        let framebuffers = pipeline::create_framebuffers(
            &device,
            &swapchain.image_views,
            Some(depth_view),
            render_pass,
            extent,
        )?;

        // Cube vertices and the MVP uniform
        let (vertex_buffer, vertex_memory) = buffer::create_buffer_with_data(
            &device,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            &cube::CUBE_SOLID_FACE_COLORS,
        )?;

        let aspect = extent.width as f32 / extent.height as f32;
        let mvp = cube::cube_mvp(aspect);
        let (uniform_buffer, uniform_memory) = buffer::create_buffer_with_data(
            &device,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            std::slice::from_ref(&mvp),
        )?;

        // Descriptors
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
            true,
        )?;

        // Command pool with a primary and a secondary buffer, both
        // re-recorded each frame
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(device.graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let command_pool = unsafe { device.device.create_command_pool(&pool_info, None)? };

        let primary_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let primary_cmd = unsafe { device.device.allocate_command_buffers(&primary_info)? }[0];

        let secondary_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::SECONDARY)
            .command_buffer_count(1);
        let secondary_cmd =
            unsafe { device.device.allocate_command_buffers(&secondary_info)? }[0];

        let frame_sync = sync::FrameSync::new(&device)?;

        log::info!("Vulkan initialized successfully!");

        Ok(Self {
            device,
            surface_loader,
            surface,
            swapchain: Some(swapchain),
            extent,
            depth_image,
            depth_memory,
            depth_view,
            render_pass,
            framebuffers,
            vertex_buffer,
            vertex_memory,
            uniform_buffer,
            uniform_memory,
            set_layout,
            pipeline_layout,
            descriptor_pool,
            descriptor_set,
            vert_shader,
            frag_shader,
            pipeline_cache,
            pipeline: graphics_pipeline,
            command_pool,
            primary_cmd,
            secondary_cmd,
            sync: frame_sync,
            clear_color: config.graphics.clear_color,
        })
    }

    /// Render one frame: acquire, record, submit, fence-wait, present.
    fn render_frame(&mut self) -> Result<()> {
        let swapchain = self.swapchain.as_ref().context("Swapchain not initialized")?;

        // Acquire the next swapchain image; the semaphore orders the submit
        // below against the presentation engine
        let (image_index, _suboptimal) =
            swapchain.acquire_next_image(u64::MAX, self.sync.image_acquired)?;
        let framebuffer = self.framebuffers[image_index as usize];

        let device = &self.device.device;

        unsafe {
            // Record the draw into the secondary command buffer
            let inherit_info = vk::CommandBufferInheritanceInfo::default()
                .render_pass(self.render_pass)
                .subpass(0)
                .framebuffer(framebuffer);

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE)
                .inheritance_info(&inherit_info);
            device.begin_command_buffer(self.secondary_cmd, &begin_info)?;

            device.cmd_bind_pipeline(
                self.secondary_cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline,
            );
            device.cmd_bind_descriptor_sets(
                self.secondary_cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline_layout,
                0,
                &[self.descriptor_set],
                &[],
            );
            device.cmd_bind_vertex_buffers(self.secondary_cmd, 0, &[self.vertex_buffer], &[0]);

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: self.extent.width as f32,
                height: self.extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            device.cmd_set_viewport(self.secondary_cmd, 0, &[viewport]);

            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: self.extent,
            };
            device.cmd_set_scissor(self.secondary_cmd, 0, &[scissor]);

            device.cmd_draw(
                self.secondary_cmd,
                cube::CUBE_SOLID_FACE_COLORS.len() as u32,
                1,
                0,
                0,
            );
            device.end_command_buffer(self.secondary_cmd)?;

            // Record the primary: begin the render pass, execute the secondary
            let clear_values = [
                vk::ClearValue {
                    color: vk::ClearColorValue {
                        float32: self.clear_color,
                    },
                },
                vk::ClearValue {
                    depth_stencil: vk::ClearDepthStencilValue {
                        depth: 1.0,
                        stencil: 0,
                    },
                },
            ];

            let rp_begin = vk::RenderPassBeginInfo::default()
                .render_pass(self.render_pass)
                .framebuffer(framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: self.extent,
                })
                .clear_values(&clear_values);

            let primary_begin = vk::CommandBufferBeginInfo::default();
            device.begin_command_buffer(self.primary_cmd, &primary_begin)?;
            device.cmd_begin_render_pass(
                self.primary_cmd,
                &rp_begin,
                vk::SubpassContents::SECONDARY_COMMAND_BUFFERS,
            );
            device.cmd_execute_commands(self.primary_cmd, &[self.secondary_cmd]);
            device.cmd_end_render_pass(self.primary_cmd);
            device.end_command_buffer(self.primary_cmd)?;

            // Submit, waiting on the acquire semaphore at color output
            let wait_semaphores = [self.sync.image_acquired];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let command_buffers = [self.primary_cmd];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers);

            self.device
                .device
                .queue_submit(self.device.graphics_queue, &[submit_info], self.sync.draw_fence)
                .context("Failed to submit command buffer")?;
        }

        // The command buffer must be finished before it is re-recorded and
        // before the image is presented
        sync::wait_for_draw_fence(&self.device, self.sync.draw_fence)?;
        unsafe {
            self.device.device.reset_fences(&[self.sync.draw_fence])?;
        }

        swapchain.present(self.device.graphics_queue, image_index, &[])?;

        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        log::info!("Cleaning up Vulkan resources...");

        let _ = self.device.wait_idle();

        unsafe {
            let d = &self.device.device;

            self.sync.destroy(d);
            d.destroy_command_pool(self.command_pool, None);
            d.destroy_pipeline(self.pipeline, None);
            d.destroy_pipeline_cache(self.pipeline_cache, None);
            d.destroy_shader_module(self.frag_shader, None);
            d.destroy_shader_module(self.vert_shader, None);
            d.destroy_descriptor_pool(self.descriptor_pool, None);
            d.destroy_pipeline_layout(self.pipeline_layout, None);
            d.destroy_descriptor_set_layout(self.set_layout, None);
            d.destroy_buffer(self.uniform_buffer, None);
            d.free_memory(self.uniform_memory, None);
            d.destroy_buffer(self.vertex_buffer, None);
            d.free_memory(self.vertex_memory, None);
            for &framebuffer in &self.framebuffers {
                d.destroy_framebuffer(framebuffer, None);
            }
            d.destroy_render_pass(self.render_pass, None);
            d.destroy_image_view(self.depth_view, None);
            d.destroy_image(self.depth_image, None);
            d.free_memory(self.depth_memory, None);

            // Swapchain before the surface it was created for
            self.swapchain = None;
            self.surface_loader.destroy_surface(self.surface, None);
        }

        log::info!("Cleanup complete");
    }
}

/// Application state: window, renderer, and the bounded frame counter.
struct App {
    config: Config,
    // Declared before the window so the surface is destroyed first
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,

    frames_rendered: u32,

    // FPS tracking
    frame_count: u32,
    last_fps_update: Instant,
    last_frame_time: Instant,
}

impl App {
    fn new(config: Config) -> Self {
        let now = Instant::now();
        Self {
            config,
            renderer: None,
            window: None,
            frames_rendered: 0,
            frame_count: 0,
            last_fps_update: now,
            last_frame_time: now,
        }
    }

    fn update_fps(&mut self) {
        if !self.config.debug.show_fps {
            return;
        }

        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.frame_count += 1;

        // Update the title once per second
        if now.duration_since(self.last_fps_update).as_secs_f32() >= 1.0 {
            let elapsed = now.duration_since(self.last_fps_update).as_secs_f32();
            let fps = self.frame_count as f32 / elapsed;

            if let Some(ref window) = self.window {
                window.set_title(&format!(
                    "{} - {:.0} FPS ({:.2}ms)",
                    self.config.window.title,
                    fps,
                    frame_time * 1000.0,
                ));
            }

            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Fixed-size window; the samples don't recreate the swapchain
        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {:?}", e);
                event_loop.exit();
                return;
            }
        };

        match Renderer::new(&window, &self.config) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                log::error!("Failed to initialize Vulkan: {:?}", e);
                event_loop.exit();
                return;
            }
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                let Some(ref mut renderer) = self.renderer else {
                    return;
                };

                match renderer.render_frame() {
                    Ok(()) => {
                        self.frames_rendered += 1;
                        self.update_fps();

                        if self.frames_rendered >= self.config.graphics.frames {
                            log::info!("Rendered {} frames, exiting", self.frames_rendered);
                            event_loop.exit();
                        }
                    }
                    Err(e) => {
                        log::error!("Render error: {:?}", e);
                        event_loop.exit();
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed() {
                    if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                        log::info!("ESC pressed, exiting...");
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
