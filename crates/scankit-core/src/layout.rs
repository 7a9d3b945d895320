//! Layout schema shared by host and shader declarations.
//!
//! A struct declared with [`gpu_struct!`](crate::gpu_struct) gets a `#[repr(C)]`
//! Pod host type and a [`StructLayout`] descriptor built from the same field
//! list. The descriptor is what the WGSL generator and the layout checks
//! consume, so host and shader declarations can never diverge in field order
//! or field type.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::error::{LayoutError, Result};

/// Boolean flag stored as one `u32` word.
///
/// WGSL `bool` is not host-shareable, so flags cross the boundary as a `u32`
/// holding 0 or 1. The word size is the same on both sides, so toggling a flag
/// never moves the fields that follow it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct GpuBool(u32);

impl GpuBool {
    /// The `false` word (0).
    pub const FALSE: Self = Self(0);
    /// The `true` word (1).
    pub const TRUE: Self = Self(1);

    /// Creates a flag from a host boolean.
    pub const fn new(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// Returns the flag as a host boolean. Any non-zero word is `true`.
    pub const fn get(self) -> bool {
        self.0 != 0
    }

    /// Returns the raw word as the shader sees it.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl From<bool> for GpuBool {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl From<GpuBool> for bool {
    fn from(value: GpuBool) -> Self {
        value.get()
    }
}

/// The type of a field, as understood by both targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// `f32`
    F32,
    /// `u32`
    U32,
    /// [`GpuBool`], a `u32` on the shader side.
    Bool,
    /// `[f32; 2]`, `vec2<f32>` on the shader side.
    Vec2,
    /// `[f32; 3]`, `vec3<f32>` on the shader side.
    Vec3,
    /// `[f32; 4]`, `vec4<f32>` on the shader side.
    Vec4,
    /// Column-major `[[f32; 4]; 4]`, `mat4x4<f32>` on the shader side.
    Mat4,
    /// A nested struct declared with `gpu_struct!`.
    Struct(&'static StructLayout),
    /// Explicit padding of the given number of `u32` words.
    Pad(usize),
}

impl FieldKind {
    /// Size of the field in host memory.
    pub const fn host_size(self) -> usize {
        match self {
            Self::F32 | Self::U32 | Self::Bool => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
            Self::Struct(layout) => layout.size,
            Self::Pad(words) => words * 4,
        }
    }

    /// Returns true for padding words.
    pub const fn is_padding(self) -> bool {
        matches!(self, Self::Pad(_))
    }

    /// The WGSL spelling of the type. Padding is spelled per word (`u32`).
    pub fn wgsl_type(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::U32 | Self::Bool | Self::Pad(_) => "u32",
            Self::Vec2 => "vec2<f32>",
            Self::Vec3 => "vec3<f32>",
            Self::Vec4 => "vec4<f32>",
            Self::Mat4 => "mat4x4<f32>",
            Self::Struct(layout) => layout.name,
        }
    }

    fn decode(self, bytes: &[u8]) -> Option<GpuValue> {
        let value = match self {
            Self::F32 => GpuValue::F32(bytemuck::pod_read_unaligned(bytes)),
            Self::U32 | Self::Bool => GpuValue::U32(bytemuck::pod_read_unaligned(bytes)),
            Self::Vec2 => GpuValue::Vec2(bytemuck::pod_read_unaligned(bytes)),
            Self::Vec3 => GpuValue::Vec3(bytemuck::pod_read_unaligned(bytes)),
            Self::Vec4 => GpuValue::Vec4(bytemuck::pod_read_unaligned(bytes)),
            Self::Mat4 => GpuValue::Mat4(bytemuck::pod_read_unaligned(bytes)),
            Self::Struct(layout) => GpuValue::Struct(layout.decode_fields(bytes)),
            Self::Pad(_) => return None,
        };
        Some(value)
    }
}

/// A decoded field value.
///
/// Flags decode as [`GpuValue::U32`], which is how the shader reads them.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuValue {
    F32(f32),
    U32(u32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
    Struct(Vec<(String, GpuValue)>),
}

/// One field of a [`StructLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    /// Field name, identical on host and shader.
    pub name: &'static str,
    /// Field type.
    pub kind: FieldKind,
    /// Byte offset from the start of the struct.
    pub offset: usize,
}

/// Size, alignment, and ordered fields of a struct shared across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StructLayout {
    /// Type name, used verbatim as the WGSL struct name.
    pub name: &'static str,
    /// Total size in bytes, including trailing padding.
    pub size: usize,
    /// Host alignment in bytes.
    pub align: usize,
    /// Fields in declaration order.
    pub fields: &'static [FieldLayout],
}

impl StructLayout {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterates over the fields that carry data, skipping padding.
    pub fn data_fields(&self) -> impl Iterator<Item = &FieldLayout> {
        self.fields.iter().filter(|f| !f.kind.is_padding())
    }

    /// Decodes `bytes` through the host view of this layout.
    pub fn read(&self, bytes: &[u8]) -> Result<Vec<(String, GpuValue)>> {
        if bytes.len() != self.size {
            return Err(LayoutError::BufferSize {
                expected: self.size,
                actual: bytes.len(),
            });
        }
        Ok(self.decode_fields(bytes))
    }

    fn decode_fields(&self, bytes: &[u8]) -> Vec<(String, GpuValue)> {
        self.data_fields()
            .filter_map(|field| {
                let end = field.offset + field.kind.host_size();
                let value = field.kind.decode(&bytes[field.offset..end])?;
                Some((field.name.to_string(), value))
            })
            .collect()
    }
}

/// A type that can appear as a field of a shared struct.
pub trait GpuField: Pod {
    /// How the field is spelled on both sides.
    const KIND: FieldKind;
}

macro_rules! impl_gpu_field {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(impl GpuField for $ty {
            const KIND: FieldKind = $kind;
        })*
    };
}

impl_gpu_field! {
    f32 => FieldKind::F32,
    u32 => FieldKind::U32,
    GpuBool => FieldKind::Bool,
    [f32; 2] => FieldKind::Vec2,
    [f32; 3] => FieldKind::Vec3,
    [f32; 4] => FieldKind::Vec4,
    [[f32; 4]; 4] => FieldKind::Mat4,
    [u32; 1] => FieldKind::Pad(1),
    [u32; 2] => FieldKind::Pad(2),
    [u32; 3] => FieldKind::Pad(3),
}

/// A struct whose layout is part of the host/shader contract.
///
/// Implemented by [`gpu_struct!`](crate::gpu_struct); do not implement by hand.
pub trait GpuLayout: Pod {
    /// The layout descriptor generated from the declaration.
    const LAYOUT: StructLayout;

    /// The exact bytes uploaded to the GPU.
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Reads a value back from bytes. The slice need not be aligned.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != std::mem::size_of::<Self>() {
            return Err(LayoutError::BufferSize {
                expected: std::mem::size_of::<Self>(),
                actual: bytes.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Decodes this value through its host layout.
    fn values(&self) -> Vec<(String, GpuValue)> {
        Self::LAYOUT.decode_fields(self.as_bytes())
    }
}

/// Declares a struct shared between host and shader code.
///
/// Expands to a `#[repr(C)]` Pod struct plus its [`GpuLayout`] and
/// [`GpuField`] impls. Padding must be spelled out as `[u32; N]` fields so the
/// struct has no implicit padding (bytemuck rejects it otherwise).
///
/// ```
/// scankit_core::gpu_struct! {
///     /// Example block.
///     pub struct Example {
///         pub scale: f32,
///         pub _pad: [u32; 3],
///     }
/// }
///
/// use scankit_core::GpuLayout;
/// assert_eq!(Example::LAYOUT.size, 16);
/// ```
#[macro_export]
macro_rules! gpu_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, ::bytemuck::Pod, ::bytemuck::Zeroable)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::layout::GpuLayout for $name {
            const LAYOUT: $crate::layout::StructLayout = $crate::layout::StructLayout {
                name: ::core::stringify!($name),
                size: ::core::mem::size_of::<$name>(),
                align: ::core::mem::align_of::<$name>(),
                fields: &[
                    $(
                        $crate::layout::FieldLayout {
                            name: ::core::stringify!($field),
                            kind: <$ty as $crate::layout::GpuField>::KIND,
                            offset: ::core::mem::offset_of!($name, $field),
                        },
                    )*
                ],
            };
        }

        impl $crate::layout::GpuField for $name {
            const KIND: $crate::layout::FieldKind =
                $crate::layout::FieldKind::Struct(&<$name as $crate::layout::GpuLayout>::LAYOUT);
        }
    };
}
