use bytemuck::{Pod, Zeroable};
use driftfall_scene::{Mesh, MeshData};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    pub(crate) const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
        ],
    };
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct MeshUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl MeshUniforms {
    pub(crate) fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }
}

fn interleave(data: &MeshData) -> Vec<Vertex> {
    data.positions
        .iter()
        .zip(&data.normals)
        .map(|(&position, &normal)| Vertex { position, normal })
        .collect()
}

/// One scene mesh resident on the GPU.
pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    pub(crate) fn upload(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        mesh: &Mesh,
    ) -> Self {
        let data = mesh.geometry.tessellate();
        let vertices = interleave(&data);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_vertex_buffer", mesh.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_index_buffer", mesh.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_uniform_buffer", mesh.name)),
            contents: bytemuck::bytes_of(&MeshUniforms::new(
                mesh.object.matrix(),
                mesh.material.color.to_rgba(1.0),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}_bind_group", mesh.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        tracing::debug!(
            mesh = mesh.name,
            vertices = data.vertex_count(),
            triangles = data.triangle_count(),
            "mesh uploaded"
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    /// Push this frame's transform and color.
    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, mesh: &Mesh) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&MeshUniforms::new(
                mesh.object.matrix(),
                mesh.material.color.to_rgba(1.0),
            )),
        );
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfall_scene::Geometry;

    #[test]
    fn interleave_pairs_positions_with_normals() {
        let data = Geometry::Plane {
            width: 2.0,
            height: 2.0,
        }
        .tessellate();
        let vertices = interleave(&data);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(vertices[3].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn uniform_layout_is_std140_friendly() {
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}
