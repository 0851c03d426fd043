use wgpu::util::DeviceExt;

use crate::scene::ShaderId;

/// GPU vertex type used by all lesson geometry.
///
/// The layout interleaves position and vertex color as contiguous
/// `vec3<f32>` fields so that `bytemuck` can safely reinterpret the slice as
/// bytes. The matching WGSL attribute locations are declared in
/// `shaders/scene.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Linear RGB vertex color.
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Returns the `VertexBufferLayout` matching this struct's memory layout.
    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Static geometry: one immutable vertex buffer plus draw parameters.
///
/// Meshes are created once at startup and shared by every object instance
/// using that geometry; objects refer to them through `MeshId` arena indices.
/// There is no re-upload path.
pub struct Mesh {
    /// The shader program this mesh renders with (arena id).
    pub shader: ShaderId,

    pub(crate) vertex_buffer: Option<wgpu::Buffer>,
    pub(crate) topology: wgpu::PrimitiveTopology,
    pub(crate) vertex_count: u32,
}

impl Mesh {
    /// Uploads `vertices` once as immutable static geometry.
    pub fn new(
        device: &wgpu::Device,
        shader: ShaderId,
        vertices: &[Vertex],
        topology: wgpu::PrimitiveTopology,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orrery mesh vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            shader,
            vertex_buffer: Some(vertex_buffer),
            topology,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// A mesh with no buffer or no vertices renders nothing.
    pub fn is_drawable(&self) -> bool {
        self.vertex_buffer.is_some() && self.vertex_count > 0
    }

    /// Issues one non-indexed draw of the whole buffer.
    ///
    /// No-op when the mesh is not drawable. The caller is responsible for
    /// binding the shader program (pipeline + uniforms) first.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        let Some(buffer) = self.vertex_buffer.as_ref() else {
            return;
        };
        if self.vertex_count == 0 {
            return;
        }

        rpass.set_vertex_buffer(0, buffer.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_interleaved() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn empty_mesh_is_not_drawable() {
        let mesh = Mesh {
            shader: ShaderId(0),
            vertex_buffer: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
            vertex_count: 0,
        };
        assert!(!mesh.is_drawable());

        // A missing buffer with a nonzero count is equally undrawable.
        let mesh = Mesh {
            shader: ShaderId(0),
            vertex_buffer: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
            vertex_count: 3,
        };
        assert!(!mesh.is_drawable());
    }
}
