// Shared setup layer for the Vulkan API samples.
//
// Each sample binary is a linear program: instance/device setup, command
// pool and buffers, resource creation, pipeline creation, a submit/present
// loop, and reverse-order teardown. The modules here hold the pieces every
// sample repeats so the binaries read as the lifecycle itself.

pub mod backend;
pub mod config;
pub mod cube;

pub use backend::{Swapchain, VulkanDevice};
pub use config::Config;

/// Initialize logging for a sample binary.
pub fn init_logging() {
    use env_logger::Builder;
    use log::LevelFilter;

    let mut builder = Builder::from_default_env();
    builder.filter_level(LevelFilter::Info);
    builder.init();
}
