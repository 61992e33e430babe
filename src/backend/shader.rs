// Shader module loading
//
// Shaders are compiled from GLSL to SPIR-V by build.rs (glslc) and loaded
// from disk at startup.

use anyhow::{Context, Result};
use ash::vk;
use std::path::Path;
use super::VulkanDevice;

/// Read a SPIR-V file and create a shader module from it.
pub fn load_shader_module<P: AsRef<Path>>(
    device: &VulkanDevice,
    path: P,
) -> Result<vk::ShaderModule> {
    let path = path.as_ref();

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read shader {:?} (run glslc?)", path))?;

    let words = ash::util::read_spv(&mut std::io::Cursor::new(&bytes))
        .with_context(|| format!("Invalid SPIR-V in {:?}", path))?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&words);

    unsafe {
        device
            .device
            .create_shader_module(&create_info, None)
            .context("Failed to create shader module")
    }
}
