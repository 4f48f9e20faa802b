use std::mem;
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::asset::Mesh;
use crate::renderer::uniforms::DrawUniform;

pub(crate) struct GpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl GpuMesh {
    pub(crate) fn new(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let label = mesh.name.as_deref().unwrap_or("Mesh");
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}Vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}Indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }
}

/// Every draw's [`DrawUniform`] for one submission, addressed by dynamic
/// offset.
pub(crate) struct DrawUniformBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) capacity: u32,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
    stride: u64,
    scratch: Vec<u8>,
}

impl DrawUniformBuffer {
    pub(crate) fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("DrawUniformLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(mem::size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = (mem::size_of::<DrawUniform>() as u64).next_multiple_of(alignment);
        let (buffer, bind_group) = Self::allocate(device, &bind_layout, capacity, stride);

        Self {
            buffer,
            capacity,
            bind_group,
            bind_layout,
            stride,
            scratch: Vec::with_capacity(capacity as usize * stride as usize),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u32,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("DrawUniformBuffer"),
            size: capacity.max(1) as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("DrawUniformBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Appends a uniform and returns its dynamic offset.
    pub(crate) fn push(&mut self, uniform: &DrawUniform) -> u32 {
        let offset = self.scratch.len();
        self.scratch.extend_from_slice(bytemuck::bytes_of(uniform));
        self.scratch.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    /// Uploads everything pushed since the last upload, growing the buffer if
    /// needed.
    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let required = (self.scratch.len() as u64 / self.stride) as u32;
        if required > self.capacity {
            let new_capacity = required.max(self.capacity * 2).max(1);
            log::info!(
                "Growing draw uniform buffer: {} -> {}",
                self.capacity,
                new_capacity
            );
            let (buffer, bind_group) =
                Self::allocate(device, &self.bind_layout, new_capacity, self.stride);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = new_capacity;
        }

        if !self.scratch.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.scratch);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.scratch.clear();
    }
}
