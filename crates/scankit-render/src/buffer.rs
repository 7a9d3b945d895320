//! GPU buffers for the shared layouts.

use std::marker::PhantomData;

use scankit_core::{GpuField, GpuLayout};
use wgpu::util::DeviceExt;

use crate::bindings::{uniform_layout_entry, VertexBufferIndex};
use crate::vertex::VertexFormat;

/// Creates a uniform buffer holding one block.
///
/// The buffer can also be copied out, so its contents can be read back.
pub fn create_uniform_buffer<T: GpuLayout>(device: &wgpu::Device, data: &T, label: Option<&str>) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: data.as_bytes(),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
    })
}

/// Overwrites a uniform buffer with a freshly built block.
pub fn update_uniform_buffer<T: GpuLayout>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &T) {
    queue.write_buffer(buffer, 0, data.as_bytes());
}

/// Creates an interleaved vertex buffer.
pub fn create_vertex_buffer<V: VertexFormat>(device: &wgpu::Device, data: &[V], label: Option<&str>) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a tightly packed buffer for one attribute of a split vertex layout.
pub fn create_attribute_buffer<T: GpuField>(device: &wgpu::Device, data: &[T], label: Option<&str>) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// A uniform block with its buffer, bind group layout, and bind group.
///
/// The block is bound at [`VertexBufferIndex::Uniforms`].
pub struct UniformBinding<T: GpuLayout> {
    pub buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    _block: PhantomData<T>,
}

impl<T: GpuLayout> UniformBinding<T> {
    /// Uploads `data` and creates the binding.
    pub fn new(device: &wgpu::Device, data: &T, visibility: wgpu::ShaderStages, label: &str) -> Self {
        let buffer = create_uniform_buffer(device, data, Some(label));
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[uniform_layout_entry::<T>(visibility)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: VertexBufferIndex::Uniforms.index(),
                resource: buffer.as_entire_binding(),
            }],
        });
        log::debug!("created uniform binding '{label}' for {} ({} bytes)", T::LAYOUT.name, T::LAYOUT.size);
        Self {
            buffer,
            bind_group_layout,
            bind_group,
            _block: PhantomData,
        }
    }

    /// Uploads a new block.
    pub fn update(&self, queue: &wgpu::Queue, data: &T) {
        update_uniform_buffer(queue, &self.buffer, data);
    }
}
