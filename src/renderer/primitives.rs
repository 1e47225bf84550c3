//! Vertex and uniform layouts for the skyline shaders.
//!
//! This module provides the [`Vertex`] struct and the geometry generators that
//! turn a [`BoxGeometry`] into triangle and line lists, plus the two uniform
//! blocks consumed by `skyline.wgsl`:
//!
//! - [`FrameUniforms`]: camera and lights, written once per frame
//! - [`DrawUniforms`]: model matrix and material colours, one slot per draw

use crate::math::Vec3;
use crate::scene::BoxGeometry;
use wgpu::util::DeviceExt;

/// Vertex data for box faces and edges.
///
/// Each vertex contains:
/// - `position`: position in the mesh's local space.
/// - `normal`: outward face normal (zero for edge lines).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Returns the vertex buffer layout for use in a wgpu pipeline.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }

    /// Generates the 36 vertices (12 triangles) of a box, counter-clockwise
    /// when seen from outside.
    pub fn box_triangles(geometry: &BoxGeometry) -> Vec<Vertex> {
        let c = geometry.corners();
        // Corner indices of each face, counter-clockwise from outside
        let faces: [([usize; 4], Vec3); 6] = [
            ([3, 2, 6, 7], Vec3::new(0.0, 0.0, 1.0)),
            ([1, 0, 4, 5], Vec3::new(0.0, 0.0, -1.0)),
            ([2, 1, 5, 6], Vec3::new(1.0, 0.0, 0.0)),
            ([0, 3, 7, 4], Vec3::new(-1.0, 0.0, 0.0)),
            ([7, 6, 5, 4], Vec3::new(0.0, 1.0, 0.0)),
            ([0, 1, 2, 3], Vec3::new(0.0, -1.0, 0.0)),
        ];

        let mut vertices = Vec::with_capacity(36);
        for (quad, normal) in faces {
            vertices.extend(create_quad(
                [c[quad[0]], c[quad[1]], c[quad[2]], c[quad[3]]],
                normal,
            ));
        }
        vertices
    }

    /// Generates the 24 vertices (12 segments) of the box's edges.
    pub fn box_edges(geometry: &BoxGeometry) -> Vec<Vertex> {
        let c = geometry.corners();
        BoxGeometry::EDGES
            .iter()
            .flat_map(|&(a, b)| [c[a], c[b]])
            .map(|position| Vertex {
                position: position.into(),
                normal: [0.0; 3],
            })
            .collect()
    }
}

/// Creates a quad as two triangles sharing the `corners[0]`-`corners[2]` diagonal.
///
/// # Returns
/// An array of 6 [`Vertex`] forming two triangles.
fn create_quad(corners: [Vec3; 4], normal: Vec3) -> [Vertex; 6] {
    let normal: [f32; 3] = normal.into();
    let vertex = |p: Vec3| Vertex {
        position: p.into(),
        normal,
    };
    [
        vertex(corners[0]),
        vertex(corners[1]),
        vertex(corners[2]),
        vertex(corners[0]),
        vertex(corners[2]),
        vertex(corners[3]),
    ]
}

/// Camera and lighting data shared by every draw in a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Projection * view.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world position (w unused).
    pub camera_position: [f32; 4],
    /// Ambient colour premultiplied by intensity.
    pub ambient: [f32; 4],
    /// Unit vector towards the directional light (w unused).
    pub light_direction: [f32; 4],
    /// Directional colour premultiplied by intensity.
    pub light_color: [f32; 4],
    /// x: overlay opacity, yzw unused.
    pub overlay: [f32; 4],
}

impl FrameUniforms {
    /// Returns the raw bytes of the uniform struct for uploading to the GPU.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Creates a GPU buffer containing the uniform data.
    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: self.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }
}

/// Per-draw data, addressed through a dynamic offset.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    /// Base colour, alpha = material opacity.
    pub color: [f32; 4],
    /// Emissive colour; w = 1 for lit surfaces, 0 for unlit lines.
    pub emissive: [f32; 4],
}

impl DrawUniforms {
    /// Distance between consecutive draw slots, rounded up to the device's
    /// dynamic offset alignment.
    pub fn stride(alignment: u32) -> wgpu::BufferAddress {
        let size = std::mem::size_of::<DrawUniforms>() as wgpu::BufferAddress;
        let alignment = alignment.max(1) as wgpu::BufferAddress;
        size.div_ceil(alignment) * alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_triangles_face_outward() {
        let geometry = BoxGeometry::new(2.0, 4.0, 6.0);
        let vertices = Vertex::box_triangles(&geometry);
        assert_eq!(vertices.len(), 36);

        for triangle in vertices.chunks(3) {
            let a = Vec3::from(triangle[0].position);
            let b = Vec3::from(triangle[1].position);
            let c = Vec3::from(triangle[2].position);
            let winding = (b - a).cross(&(c - a));
            let normal = Vec3::from(triangle[0].normal);
            assert!(
                winding.dot(&normal) > 0.0,
                "triangle {triangle:?} winds against its normal"
            );
        }
    }

    #[test]
    fn test_box_edges_are_twelve_segments() {
        let geometry = BoxGeometry::new(50.0, 600.0, 50.0);
        let edges = Vertex::box_edges(&geometry);
        assert_eq!(edges.len(), 24);
        for segment in edges.chunks(2) {
            let length = (Vec3::from(segment[1].position) - Vec3::from(segment[0].position)).length();
            assert!(length == 50.0 || length == 600.0);
        }
    }

    #[test]
    fn test_draw_stride_respects_alignment() {
        assert_eq!(DrawUniforms::stride(256), 256);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 96);
        assert_eq!(DrawUniforms::stride(32), 96);
    }
}
