//! Vertex formats.
//!
//! Field order is the attribute index convention: field 0 binds to
//! [`VertexAttr::Position`](crate::bindings::VertexAttr::Position), field 1 to
//! [`VertexAttr::Addition`](crate::bindings::VertexAttr::Addition). The wgpu
//! attribute tables below are computed from the struct layouts, so they cannot
//! drift from the host types.

use scankit_core::{gpu_struct, FieldKind, FieldLayout, GpuLayout, StructLayout};
use static_assertions::const_assert_eq;

gpu_struct! {
    /// Position and normal, for lit meshes.
    pub struct NormalVertex {
        pub position: [f32; 3],
        pub normal: [f32; 3],
    }
}

gpu_struct! {
    /// Position and per-vertex color.
    pub struct ColorVertex {
        pub position: [f32; 3],
        pub color: [f32; 3],
    }
}

gpu_struct! {
    /// Position and texture coordinate, for textured meshes.
    pub struct TexVertex {
        pub position: [f32; 3],
        pub tex_coord: [f32; 2],
    }
}

gpu_struct! {
    /// Full-screen quad vertex used by the texture techniques.
    pub struct QuadVertex {
        pub position: [f32; 3],
        pub tex_coord: [f32; 2],
    }
}

const_assert_eq!(std::mem::size_of::<NormalVertex>(), 24);
const_assert_eq!(std::mem::size_of::<ColorVertex>(), 24);
const_assert_eq!(std::mem::size_of::<TexVertex>(), 20);
const_assert_eq!(std::mem::size_of::<QuadVertex>(), 20);

/// Vertex shader output for the textured techniques.
///
/// Exists only on the shader side, so the offsets and size here are the WGSL
/// ones: clip position at 0, texture coordinate at 16, 32 bytes in total.
pub const TEX_VERTEX_OUT: StructLayout = StructLayout {
    name: "TexVertexOut",
    size: 32,
    align: 16,
    fields: &[
        FieldLayout {
            name: "position",
            kind: FieldKind::Vec4,
            offset: 0,
        },
        FieldLayout {
            name: "tex_coord",
            kind: FieldKind::Vec2,
            offset: 16,
        },
    ],
};

const fn attribute_format(kind: FieldKind) -> wgpu::VertexFormat {
    match kind {
        FieldKind::F32 => wgpu::VertexFormat::Float32,
        FieldKind::U32 => wgpu::VertexFormat::Uint32,
        FieldKind::Vec2 => wgpu::VertexFormat::Float32x2,
        FieldKind::Vec3 => wgpu::VertexFormat::Float32x3,
        FieldKind::Vec4 => wgpu::VertexFormat::Float32x4,
        _ => panic!("field type cannot be a vertex attribute"),
    }
}

/// Builds the attribute table for a vertex struct.
///
/// With `split` each attribute reads from its own tightly packed buffer
/// (offset 0); otherwise offsets are the interleaved struct offsets.
pub const fn vertex_attributes<const N: usize>(
    layout: &StructLayout,
    split: bool,
) -> [wgpu::VertexAttribute; N] {
    assert!(layout.fields.len() == N, "attribute count must match field count");
    let mut attributes = [wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 0,
        shader_location: 0,
    }; N];
    let mut i = 0;
    while i < N {
        let field = &layout.fields[i];
        attributes[i] = wgpu::VertexAttribute {
            format: attribute_format(field.kind),
            offset: if split { 0 } else { field.offset as wgpu::BufferAddress },
            shader_location: i as u32,
        };
        i += 1;
    }
    attributes
}

/// A vertex struct that can be bound as a vertex buffer.
pub trait VertexFormat: GpuLayout {
    /// Attributes of the interleaved layout.
    const ATTRIBUTES: &'static [wgpu::VertexAttribute];
    /// Attributes when each one has its own buffer.
    const SPLIT_ATTRIBUTES: &'static [wgpu::VertexAttribute];

    /// Layout of one interleaved buffer holding whole structs.
    fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }

    /// One buffer layout per attribute; the buffer slot equals the attribute index.
    fn split_buffer_layouts() -> Vec<wgpu::VertexBufferLayout<'static>> {
        Self::SPLIT_ATTRIBUTES
            .iter()
            .map(|attribute| wgpu::VertexBufferLayout {
                array_stride: attribute.format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(attribute),
            })
            .collect()
    }
}

macro_rules! impl_vertex_format {
    ($($ty:ty),* $(,)?) => {
        $(impl VertexFormat for $ty {
            const ATTRIBUTES: &'static [wgpu::VertexAttribute] =
                &vertex_attributes::<2>(&<$ty as GpuLayout>::LAYOUT, false);
            const SPLIT_ATTRIBUTES: &'static [wgpu::VertexAttribute] =
                &vertex_attributes::<2>(&<$ty as GpuLayout>::LAYOUT, true);
        })*
    };
}

impl_vertex_format!(NormalVertex, ColorVertex, TexVertex, QuadVertex);

impl QuadVertex {
    pub const fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, tex_coord }
    }
}

/// The two triangles of a full-screen quad at depth `z`.
///
/// Corners are a (top-left), b (top-right), c (bottom-left), d (bottom-right);
/// the triangles are a-b-d and a-d-c. Texture coordinates start at the
/// top-left corner.
pub fn quad_vertices(z: f32) -> [QuadVertex; 6] {
    let a = QuadVertex::new([-1.0, 1.0, z], [0.0, 0.0]);
    let b = QuadVertex::new([1.0, 1.0, z], [1.0, 0.0]);
    let c = QuadVertex::new([-1.0, -1.0, z], [0.0, 1.0]);
    let d = QuadVertex::new([1.0, -1.0, z], [1.0, 1.0]);
    [a, b, d, a, d, c]
}
