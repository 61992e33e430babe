// Cube geometry, vertex layout, and camera math shared by the samples.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Interleaved vertex: vec4 position + vec4 color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 4],
    pub color: [f32; 4],
}

const fn vertex(pos: [f32; 4], color: [f32; 4]) -> Vertex {
    Vertex { pos, color }
}

impl Vertex {
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription::default()
            .binding(0)
            .stride(std::mem::size_of::<Self>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)
    }

    pub fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            // Position (location 0)
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32B32A32_SFLOAT)
                .offset(0),
            // Color (location 1)
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32B32A32_SFLOAT)
                .offset(16),
        ]
    }
}

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

/// Solid-face-colored cube: 12 triangles, 36 vertices, one color per face.
pub const CUBE_SOLID_FACE_COLORS: [Vertex; 36] = [
    // red face
    vertex([-1.0, -1.0, 1.0, 1.0], RED),
    vertex([-1.0, 1.0, 1.0, 1.0], RED),
    vertex([1.0, -1.0, 1.0, 1.0], RED),
    vertex([1.0, -1.0, 1.0, 1.0], RED),
    vertex([-1.0, 1.0, 1.0, 1.0], RED),
    vertex([1.0, 1.0, 1.0, 1.0], RED),
    // green face
    vertex([-1.0, -1.0, -1.0, 1.0], GREEN),
    vertex([1.0, -1.0, -1.0, 1.0], GREEN),
    vertex([-1.0, 1.0, -1.0, 1.0], GREEN),
    vertex([-1.0, 1.0, -1.0, 1.0], GREEN),
    vertex([1.0, -1.0, -1.0, 1.0], GREEN),
    vertex([1.0, 1.0, -1.0, 1.0], GREEN),
    // blue face
    vertex([-1.0, 1.0, 1.0, 1.0], BLUE),
    vertex([-1.0, -1.0, 1.0, 1.0], BLUE),
    vertex([-1.0, 1.0, -1.0, 1.0], BLUE),
    vertex([-1.0, 1.0, -1.0, 1.0], BLUE),
    vertex([-1.0, -1.0, 1.0, 1.0], BLUE),
    vertex([-1.0, -1.0, -1.0, 1.0], BLUE),
    // yellow face
    vertex([1.0, 1.0, 1.0, 1.0], YELLOW),
    vertex([1.0, 1.0, -1.0, 1.0], YELLOW),
    vertex([1.0, -1.0, 1.0, 1.0], YELLOW),
    vertex([1.0, -1.0, 1.0, 1.0], YELLOW),
    vertex([1.0, 1.0, -1.0, 1.0], YELLOW),
    vertex([1.0, -1.0, -1.0, 1.0], YELLOW),
    // magenta face
    vertex([1.0, 1.0, 1.0, 1.0], MAGENTA),
    vertex([-1.0, 1.0, 1.0, 1.0], MAGENTA),
    vertex([1.0, 1.0, -1.0, 1.0], MAGENTA),
    vertex([1.0, 1.0, -1.0, 1.0], MAGENTA),
    vertex([-1.0, 1.0, 1.0, 1.0], MAGENTA),
    vertex([-1.0, 1.0, -1.0, 1.0], MAGENTA),
    // cyan face
    vertex([1.0, -1.0, 1.0, 1.0], CYAN),
    vertex([1.0, -1.0, -1.0, 1.0], CYAN),
    vertex([-1.0, -1.0, 1.0, 1.0], CYAN),
    vertex([-1.0, -1.0, 1.0, 1.0], CYAN),
    vertex([1.0, -1.0, -1.0, 1.0], CYAN),
    vertex([-1.0, -1.0, -1.0, 1.0], CYAN),
];

/// Single triangle for the vertex-buffer sample.
pub const TRIANGLE: [Vertex; 3] = [
    vertex([-0.5, -0.5, 0.0, 1.0], RED),
    vertex([0.5, -0.5, 0.0, 1.0], GREEN),
    vertex([0.5, 0.5, 0.0, 1.0], BLUE),
];

/// The progression's camera: 45 degree FOV, eye at (-5, 3, -10) looking at
/// the origin with an inverted up vector, times the Vulkan clip-space
/// correction (Y flip, depth remapped to [0, 1]).
pub fn cube_mvp(aspect: f32) -> Mat4 {
    let projection = Mat4::perspective_rh_gl(45f32.to_radians(), aspect, 0.1, 100.0);
    let view = Mat4::look_at_rh(
        Vec3::new(-5.0, 3.0, -10.0),
        Vec3::ZERO,
        Vec3::new(0.0, -1.0, 0.0),
    );
    let model = Mat4::IDENTITY;

    let clip = Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.5, 0.0),
        Vec4::new(0.0, 0.0, 0.5, 1.0),
    );

    clip * projection * view * model
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_shader_interface() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);

        let binding = Vertex::binding_description();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 32);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);

        let attrs = Vertex::attribute_descriptions();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].location, 0);
        assert_eq!(attrs[0].offset, std::mem::offset_of!(Vertex, pos) as u32);
        assert_eq!(attrs[1].location, 1);
        assert_eq!(attrs[1].offset, std::mem::offset_of!(Vertex, color) as u32);
        assert_eq!(attrs[1].format, vk::Format::R32G32B32A32_SFLOAT);
    }

    #[test]
    fn cube_has_twelve_solid_colored_triangles() {
        assert_eq!(CUBE_SOLID_FACE_COLORS.len(), 36);

        // Each face is two triangles sharing one color
        for face in CUBE_SOLID_FACE_COLORS.chunks(6) {
            let color = face[0].color;
            assert!(face.iter().all(|v| v.color == color));
        }

        // All corners sit on the unit cube
        for v in &CUBE_SOLID_FACE_COLORS {
            assert!(v.pos[..3].iter().all(|c| c.abs() == 1.0));
            assert_eq!(v.pos[3], 1.0);
        }
    }

    #[test]
    fn cube_center_projects_inside_clip_volume() {
        let mvp = cube_mvp(1.0);
        let center = mvp * Vec4::new(0.0, 0.0, 0.0, 1.0);

        assert!(center.w > 0.0);
        let ndc = center / center.w;
        assert!(ndc.x.abs() < 1.0);
        assert!(ndc.y.abs() < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn vertices_upload_as_plain_bytes() {
        let bytes: &[u8] = bytemuck::cast_slice(&TRIANGLE);
        assert_eq!(bytes.len(), 3 * 32);
    }
}
