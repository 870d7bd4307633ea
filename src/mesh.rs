//! Cube geometry and its GPU upload.
//!
//! Every cube in the field shares one mesh: a unit cube centred on the origin
//! with four vertices per face so each face carries its own flat normal.
//!
//! # Vertex Layout
//!
//! [`Vertex`] uses the following GPU layout (24 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//!
//! Instance data (the model matrix) follows at locations 2 through 5, see
//! [`CubePass`](crate::CubePass).

use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;

/// A vertex with position and surface normal, interleaved.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Model-space position.
    pub position: [f32; 3],
    /// Unit face normal.
    pub normal: [f32; 3],
}

impl Vertex {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Unit cube, one quad per face, counter-clockwise seen from outside.
#[rustfmt::skip]
pub const CUBE_VERTICES: [Vertex; 24] = [
    // Front face (Z+)
    Vertex::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0]),
    Vertex::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0]),
    Vertex::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0]),
    Vertex::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0]),
    // Back face (Z-)
    Vertex::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0]),
    Vertex::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0]),
    Vertex::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0]),
    Vertex::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0]),
    // Top face (Y+)
    Vertex::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0]),
    Vertex::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0]),
    Vertex::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0]),
    Vertex::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0]),
    // Bottom face (Y-)
    Vertex::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0]),
    Vertex::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0]),
    Vertex::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0]),
    Vertex::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0]),
    // Right face (X+)
    Vertex::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0]),
    Vertex::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0]),
    Vertex::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0]),
    Vertex::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0]),
    // Left face (X-)
    Vertex::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0]),
    Vertex::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0]),
    Vertex::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0]),
    Vertex::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0]),
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
    0,  1,  2,  2,  3,  0,  // front
    4,  5,  6,  6,  7,  4,  // back
    8,  9,  10, 10, 11, 8,  // top
    12, 13, 14, 14, 15, 12, // bottom
    16, 17, 18, 18, 19, 16, // right
    20, 21, 22, 22, 23, 20, // left
];

/// The shared cube, resident on the GPU.
pub struct CubeMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl CubeMesh {
    pub fn new(gpu: &GpuContext) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Index Buffer"),
                contents: bytemuck::cast_slice(&CUBE_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: CUBE_INDICES.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn vertex_stride_is_24_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(Vertex::LAYOUT.array_stride, 24);
    }

    #[test]
    fn face_normals_point_outwards() {
        for vertex in CUBE_VERTICES {
            let position = Vec3::from(vertex.position);
            let normal = Vec3::from(vertex.normal);
            assert!((normal.length() - 1.0).abs() < 1e-6);
            // Every vertex lies on the face plane half a unit out along its normal.
            assert!((position.dot(normal) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        for triangle in CUBE_INDICES.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(CUBE_VERTICES[triangle[i] as usize].position));
            let normal = Vec3::from(CUBE_VERTICES[triangle[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(normal) > 0.0);
        }
    }
}
