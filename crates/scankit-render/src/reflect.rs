//! Shader-side view of the shared structs, as laid out by naga.
//!
//! The WGSL is parsed and validated with naga, and the struct offsets naga
//! computes are the ones a GPU driver will use. Reading bytes through a
//! [`ReflectedStruct`] is the shader half of the round-trip checks.

use std::fmt;

use scankit_core::{GpuValue, LayoutError, Result};

use crate::wgsl::is_padding_member;

/// Scalar component type of a shader member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Float,
    Uint,
    Sint,
    Bool,
}

impl ScalarType {
    fn wgsl(self) -> &'static str {
        match self {
            Self::Float => "f32",
            Self::Uint => "u32",
            Self::Sint => "i32",
            Self::Bool => "bool",
        }
    }
}

/// Type of a shader struct member.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderType {
    Scalar(ScalarType),
    Vector { size: u32, scalar: ScalarType },
    Matrix { columns: u32, rows: u32 },
    Struct(Box<ReflectedStruct>),
    /// Anything the shared structs never use (arrays, atomics, 16-bit types).
    Other(String),
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.wgsl()),
            Self::Vector { size, scalar } => write!(f, "vec{size}<{}>", scalar.wgsl()),
            Self::Matrix { columns, rows } => write!(f, "mat{columns}x{rows}<f32>"),
            Self::Struct(inner) => f.write_str(&inner.name),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// How a member is bound when the struct is a stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberBinding {
    Location(u32),
    /// `@builtin(position)`
    Position,
    /// Any other builtin, by debug name.
    Builtin(String),
}

/// One member of a [`ReflectedStruct`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedMember {
    pub name: String,
    pub offset: usize,
    pub ty: ShaderType,
    pub binding: Option<MemberBinding>,
}

impl ReflectedMember {
    /// Returns true for padding words emitted by the generator.
    pub fn is_padding(&self) -> bool {
        is_padding_member(&self.name)
    }
}

/// A struct as the shader sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedStruct {
    pub name: String,
    /// Span in bytes, including trailing padding.
    pub size: usize,
    pub members: Vec<ReflectedMember>,
}

impl ReflectedStruct {
    /// Looks up a member by name.
    pub fn member(&self, name: &str) -> Option<&ReflectedMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Decodes `bytes` through the shader view of this struct.
    ///
    /// Padding members are skipped. Flags come back as `U32`, since that is
    /// what the shader declares.
    pub fn read(&self, bytes: &[u8]) -> Result<Vec<(String, GpuValue)>> {
        if bytes.len() != self.size {
            return Err(LayoutError::BufferSize {
                expected: self.size,
                actual: bytes.len(),
            });
        }
        self.decode(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, GpuValue)>> {
        self.members
            .iter()
            .filter(|member| !member.is_padding())
            .map(|member| {
                let value = self.decode_member(member, bytes)?;
                Ok((member.name.clone(), value))
            })
            .collect()
    }

    fn decode_member(&self, member: &ReflectedMember, bytes: &[u8]) -> Result<GpuValue> {
        let unsupported = || LayoutError::UnsupportedType {
            structure: self.name.clone(),
            field: member.name.clone(),
        };
        let size = shader_size(&member.ty).ok_or_else(unsupported)?;
        let end = member.offset + size;
        let slice = bytes.get(member.offset..end).ok_or(LayoutError::BufferSize {
            expected: end,
            actual: bytes.len(),
        })?;

        let value = match &member.ty {
            ShaderType::Scalar(ScalarType::Float) => GpuValue::F32(bytemuck::pod_read_unaligned(slice)),
            ShaderType::Scalar(ScalarType::Uint) => GpuValue::U32(bytemuck::pod_read_unaligned(slice)),
            ShaderType::Vector {
                size: 2,
                scalar: ScalarType::Float,
            } => GpuValue::Vec2(bytemuck::pod_read_unaligned(slice)),
            ShaderType::Vector {
                size: 3,
                scalar: ScalarType::Float,
            } => GpuValue::Vec3(bytemuck::pod_read_unaligned(slice)),
            ShaderType::Vector {
                size: 4,
                scalar: ScalarType::Float,
            } => GpuValue::Vec4(bytemuck::pod_read_unaligned(slice)),
            ShaderType::Matrix { columns: 4, rows: 4 } => GpuValue::Mat4(bytemuck::pod_read_unaligned(slice)),
            ShaderType::Struct(inner) => GpuValue::Struct(inner.decode(slice)?),
            _ => return Err(unsupported()),
        };
        Ok(value)
    }
}

/// Size in buffer memory, for the types the shared structs use.
fn shader_size(ty: &ShaderType) -> Option<usize> {
    match ty {
        ShaderType::Scalar(_) => Some(4),
        ShaderType::Vector { size, .. } => Some(*size as usize * 4),
        // Columns of vec3 and vec4 both occupy 16 bytes.
        ShaderType::Matrix { columns, rows: 3 | 4 } => Some(*columns as usize * 16),
        ShaderType::Matrix { columns, rows: 2 } => Some(*columns as usize * 8),
        ShaderType::Struct(inner) => Some(inner.size),
        _ => None,
    }
}

/// All named structs of a parsed and validated WGSL module.
#[derive(Debug, Clone)]
pub struct ReflectedModule {
    structs: Vec<ReflectedStruct>,
}

impl ReflectedModule {
    /// Looks up a struct by name.
    pub fn get(&self, name: &str) -> Option<&ReflectedStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Looks up a struct by name, failing with [`LayoutError::MissingStruct`].
    pub fn require(&self, name: &str) -> Result<&ReflectedStruct> {
        self.get(name).ok_or_else(|| LayoutError::MissingStruct(name.to_string()))
    }

    /// Iterates over the structs in declaration order.
    pub fn structs(&self) -> impl Iterator<Item = &ReflectedStruct> {
        self.structs.iter()
    }
}

/// Parses and validates WGSL source, then collects its structs.
pub fn reflect_module(source: &str) -> Result<ReflectedModule> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| LayoutError::WgslParse(e.emit_to_string(source)))?;

    let mut validator =
        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all());
    validator
        .validate(&module)
        .map_err(|e| LayoutError::WgslValidation(e.emit_to_string(source)))?;

    let structs: Vec<ReflectedStruct> = module
        .types
        .iter()
        .filter_map(|(_, ty)| match &ty.inner {
            naga::TypeInner::Struct { members, span } => {
                Some(reflect_struct(&module, ty.name.as_deref(), members, *span))
            }
            _ => None,
        })
        .collect();

    log::debug!("reflected {} structs from {} bytes of WGSL", structs.len(), source.len());
    Ok(ReflectedModule { structs })
}

fn reflect_struct(
    module: &naga::Module,
    name: Option<&str>,
    members: &[naga::StructMember],
    span: u32,
) -> ReflectedStruct {
    ReflectedStruct {
        name: name.unwrap_or_default().to_string(),
        size: span as usize,
        members: members
            .iter()
            .map(|member| ReflectedMember {
                name: member.name.clone().unwrap_or_default(),
                offset: member.offset as usize,
                ty: reflect_type(module, member.ty),
                binding: member.binding.as_ref().map(reflect_binding),
            })
            .collect(),
    }
}

fn reflect_type(module: &naga::Module, handle: naga::Handle<naga::Type>) -> ShaderType {
    let ty = &module.types[handle];
    match &ty.inner {
        naga::TypeInner::Scalar(scalar) => match reflect_scalar(*scalar) {
            Some(scalar) => ShaderType::Scalar(scalar),
            None => ShaderType::Other(format!("{scalar:?}")),
        },
        naga::TypeInner::Vector { size, scalar } => match reflect_scalar(*scalar) {
            Some(kind) => ShaderType::Vector {
                size: *size as u32,
                scalar: kind,
            },
            None => ShaderType::Other(format!("{:?}", ty.inner)),
        },
        naga::TypeInner::Matrix { columns, rows, scalar } if scalar.width == 4 => ShaderType::Matrix {
            columns: *columns as u32,
            rows: *rows as u32,
        },
        naga::TypeInner::Struct { members, span } => {
            ShaderType::Struct(Box::new(reflect_struct(module, ty.name.as_deref(), members, *span)))
        }
        other => ShaderType::Other(format!("{other:?}")),
    }
}

fn reflect_scalar(scalar: naga::Scalar) -> Option<ScalarType> {
    if scalar.width != 4 && scalar.kind != naga::ScalarKind::Bool {
        return None;
    }
    match scalar.kind {
        naga::ScalarKind::Float => Some(ScalarType::Float),
        naga::ScalarKind::Uint => Some(ScalarType::Uint),
        naga::ScalarKind::Sint => Some(ScalarType::Sint),
        naga::ScalarKind::Bool => Some(ScalarType::Bool),
        _ => None,
    }
}

fn reflect_binding(binding: &naga::Binding) -> MemberBinding {
    match binding {
        naga::Binding::Location { location, .. } => MemberBinding::Location(*location),
        naga::Binding::BuiltIn(naga::BuiltIn::Position { .. }) => MemberBinding::Position,
        naga::Binding::BuiltIn(other) => MemberBinding::Builtin(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "
struct Inner {
    a: f32,
    b: u32,
}

struct Block {
    m: mat4x4<f32>,
    inner: Inner,
    v: vec3<f32>,
    s: f32,
    _pad_0: u32,
}

struct Out {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}
";

    #[test]
    fn test_reflects_uniform_offsets() {
        let module = reflect_module(SOURCE).unwrap();
        let block = module.require("Block").unwrap();
        let offsets: Vec<_> = block.members.iter().map(|m| (m.name.as_str(), m.offset)).collect();
        assert_eq!(offsets, [("m", 0), ("inner", 64), ("v", 80), ("s", 92), ("_pad_0", 96)]);
        assert_eq!(block.size, 112);
        assert_eq!(block.member("v").unwrap().ty.to_string(), "vec3<f32>");
        assert_eq!(block.member("inner").unwrap().ty.to_string(), "Inner");
    }

    #[test]
    fn test_reflects_bindings() {
        let module = reflect_module(SOURCE).unwrap();
        let out = module.require("Out").unwrap();
        assert_eq!(out.members[0].binding, Some(MemberBinding::Position));
        assert_eq!(out.members[1].binding, Some(MemberBinding::Location(0)));
        assert_eq!(out.size, 32);
    }

    #[test]
    fn test_read_skips_padding() {
        let module = reflect_module(SOURCE).unwrap();
        let inner = module.require("Inner").unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f32.to_ne_bytes());
        bytes.extend_from_slice(&9u32.to_ne_bytes());
        let values = inner.read(&bytes).unwrap();
        assert_eq!(
            values,
            [("a".to_string(), GpuValue::F32(1.5)), ("b".to_string(), GpuValue::U32(9))]
        );
        assert!(matches!(inner.read(&bytes[..4]), Err(LayoutError::BufferSize { .. })));
    }

    #[test]
    fn test_missing_struct() {
        let module = reflect_module(SOURCE).unwrap();
        assert!(matches!(module.require("Nope"), Err(LayoutError::MissingStruct(name)) if name == "Nope"));
    }

    #[test]
    fn test_parse_error() {
        let err = reflect_module("struct Broken { a: f32").unwrap_err();
        assert!(matches!(err, LayoutError::WgslParse(_)));
    }
}
