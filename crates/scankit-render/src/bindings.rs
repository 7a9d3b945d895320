//! Attribute and buffer index conventions shared by host draw setup and shaders.
//!
//! Vertex attributes occupy the low slots; the uniform block binding starts
//! right after them. The mesh techniques bind one vertex buffer per attribute,
//! so an attribute index is also a vertex buffer slot and must never collide
//! with the uniform binding.

use scankit_core::GpuLayout;
use static_assertions::{const_assert, const_assert_eq};

/// Vertex attribute slots.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttr {
    /// Vertex position.
    Position = 0,
    /// The second attribute: normal, color, or texture coordinate depending
    /// on the vertex format.
    Addition = 1,
}

impl VertexAttr {
    /// All attributes in slot order.
    pub const ALL: [Self; 2] = [Self::Position, Self::Addition];

    /// The slot index (`@location` in WGSL).
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Maps a vertex struct field index to its attribute.
    pub const fn from_field_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Position),
            1 => Some(Self::Addition),
            _ => None,
        }
    }
}

/// Buffer bindings that follow the vertex attribute slots.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexBufferIndex {
    /// The per-draw uniform block.
    Uniforms = 2,
}

impl VertexBufferIndex {
    /// The binding index (`@binding` in WGSL).
    pub const fn index(self) -> u32 {
        self as u32
    }
}

const_assert_eq!(VertexAttr::Position as u32, 0);
const_assert_eq!(VertexAttr::Addition as u32, VertexAttr::Position as u32 + 1);
const_assert_eq!(VertexBufferIndex::Uniforms as u32, VertexAttr::Addition as u32 + 1);
const_assert!(VertexBufferIndex::Uniforms as u32 > VertexAttr::Position as u32);
const_assert!(VertexBufferIndex::Uniforms as u32 > VertexAttr::Addition as u32);

/// Bind group layout entry for a uniform block at the uniform binding index.
pub fn uniform_layout_entry<T: GpuLayout>(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: VertexBufferIndex::Uniforms.index(),
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as wgpu::BufferAddress),
        },
        count: None,
    }
}
