//! Host/shader layout agreement checks.
//!
//! Host offsets come from `offset_of!` on the `#[repr(C)]` types; shader
//! offsets come from naga. Buffer-resident structs must agree on size and on
//! the offset and type of every data field. Vertex inputs are not laid out in
//! memory by the shader, so they are checked through their `@location`
//! bindings and the wgpu attribute tables instead.

use scankit_core::{CodegenOptions, FieldKind, FieldLayout, LayoutError, Result, StructLayout};

use crate::catalog::{CatalogEntry, StructRole, CATALOG};
use crate::reflect::{reflect_module, MemberBinding, ReflectedModule, ReflectedStruct, ScalarType, ShaderType};
use crate::vertex::{ColorVertex, NormalVertex, QuadVertex, TexVertex, VertexFormat};
use crate::wgsl::{uniform_binding, uniform_var_name, WgslGenerator};

/// Returns true if a host field type is declared as `ty` on the shader side.
pub fn kind_matches(kind: FieldKind, ty: &ShaderType) -> bool {
    let float_vector = |n: u32| {
        matches!(ty, ShaderType::Vector { size, scalar: ScalarType::Float } if *size == n)
    };
    match kind {
        FieldKind::F32 => *ty == ShaderType::Scalar(ScalarType::Float),
        FieldKind::U32 | FieldKind::Bool | FieldKind::Pad(_) => *ty == ShaderType::Scalar(ScalarType::Uint),
        FieldKind::Vec2 => float_vector(2),
        FieldKind::Vec3 => float_vector(3),
        FieldKind::Vec4 => float_vector(4),
        FieldKind::Mat4 => matches!(ty, ShaderType::Matrix { columns: 4, rows: 4 }),
        FieldKind::Struct(layout) => matches!(ty, ShaderType::Struct(inner) if inner.name == layout.name),
    }
}

fn check_type(layout: &StructLayout, field: &FieldLayout, ty: &ShaderType) -> Result<()> {
    if kind_matches(field.kind, ty) {
        return Ok(());
    }
    Err(LayoutError::TypeMismatch {
        structure: layout.name.to_string(),
        field: field.name.to_string(),
        host: field.kind.wgsl_type().to_string(),
        shader: ty.to_string(),
    })
}

fn missing_field(layout: &StructLayout, field: &str) -> LayoutError {
    LayoutError::MissingField {
        structure: layout.name.to_string(),
        field: field.to_string(),
    }
}

/// Checks that a buffer-resident struct has the same memory layout on both sides.
///
/// Fields are compared first, so a moved field is reported as an
/// [`LayoutError::OffsetMismatch`] rather than as the size change it causes.
/// Nested structs are checked recursively.
pub fn verify_layout(layout: &StructLayout, shader: &ReflectedStruct) -> Result<()> {
    for field in layout.data_fields() {
        let member = shader.member(field.name).ok_or_else(|| missing_field(layout, field.name))?;
        if member.offset != field.offset {
            return Err(LayoutError::OffsetMismatch {
                structure: layout.name.to_string(),
                field: field.name.to_string(),
                host: field.offset,
                shader: member.offset,
            });
        }
        check_type(layout, field, &member.ty)?;
        if let (FieldKind::Struct(inner), ShaderType::Struct(reflected)) = (field.kind, &member.ty) {
            verify_layout(inner, reflected)?;
        }
    }

    if layout.size != shader.size {
        return Err(LayoutError::SizeMismatch {
            structure: layout.name.to_string(),
            host: layout.size,
            shader: shader.size,
        });
    }

    let data_members = shader.members.iter().filter(|m| !m.is_padding()).count();
    if data_members != layout.data_fields().count() {
        let extra = shader
            .members
            .iter()
            .find(|m| !m.is_padding() && layout.field(&m.name).is_none())
            .map_or_else(String::new, |m| m.name.clone());
        return Err(LayoutError::MissingField {
            structure: layout.name.to_string(),
            field: extra,
        });
    }
    Ok(())
}

/// Checks a vertex input struct: field types and `@location(i)` for field `i`.
pub fn verify_vertex_input(layout: &StructLayout, shader: &ReflectedStruct) -> Result<()> {
    for (index, field) in layout.fields.iter().enumerate() {
        let member = shader.member(field.name).ok_or_else(|| missing_field(layout, field.name))?;
        check_type(layout, field, &member.ty)?;
        let expected = MemberBinding::Location(index as u32);
        if member.binding.as_ref() != Some(&expected) {
            return Err(LayoutError::AttributeMismatch {
                structure: layout.name.to_string(),
                field: field.name.to_string(),
                detail: format!("expected {expected:?}, shader has {:?}", member.binding),
            });
        }
    }
    Ok(())
}

/// Checks a vertex format's wgpu attribute tables against its struct layout.
pub fn verify_vertex_attributes<V: VertexFormat>() -> Result<()> {
    let layout = &V::LAYOUT;
    let mismatch = |field: &str, detail: String| LayoutError::AttributeMismatch {
        structure: layout.name.to_string(),
        field: field.to_string(),
        detail,
    };

    if V::ATTRIBUTES.len() != layout.fields.len() {
        return Err(mismatch(
            "",
            format!("{} attributes for {} fields", V::ATTRIBUTES.len(), layout.fields.len()),
        ));
    }
    for (index, (attribute, field)) in V::ATTRIBUTES.iter().zip(layout.fields).enumerate() {
        if attribute.shader_location != index as u32 {
            return Err(mismatch(field.name, format!("shader location {}", attribute.shader_location)));
        }
        if attribute.offset != field.offset as wgpu::BufferAddress {
            return Err(mismatch(field.name, format!("attribute offset {}", attribute.offset)));
        }
        if attribute.format.size() != field.kind.host_size() as wgpu::BufferAddress {
            return Err(mismatch(field.name, format!("format {:?}", attribute.format)));
        }
    }
    Ok(())
}

/// Checks a shader-only stage output: memory layout plus a position builtin first.
pub fn verify_stage_output(layout: &StructLayout, shader: &ReflectedStruct) -> Result<()> {
    verify_layout(layout, shader)?;
    match shader.members.first() {
        Some(member) if member.binding == Some(MemberBinding::Position) => Ok(()),
        first => Err(LayoutError::AttributeMismatch {
            structure: layout.name.to_string(),
            field: first.map_or_else(String::new, |m| m.name.clone()),
            detail: "first member must be @builtin(position)".to_string(),
        }),
    }
}

/// Checks one catalog entry against a reflected module.
pub fn verify_entry(entry: &CatalogEntry, module: &ReflectedModule) -> Result<()> {
    let shader = module.require(entry.layout.name)?;
    match entry.role {
        StructRole::Shared | StructRole::Uniform => verify_layout(entry.layout, shader),
        StructRole::VertexInput => verify_vertex_input(entry.layout, shader),
        StructRole::StageOutput => verify_stage_output(entry.layout, shader),
    }
}

/// WGSL that declares the catalog and binds every uniform block.
///
/// Each block gets its own bind group so naga applies the uniform address
/// space layout rules to all of them.
pub fn validation_source(generator: &WgslGenerator) -> String {
    let options = CodegenOptions {
        emit_uniform_bindings: false,
        ..generator.options().clone()
    };
    let mut source = WgslGenerator::new(options).generate();
    for (group, entry) in CATALOG.iter().filter(|e| e.role == StructRole::Uniform).enumerate() {
        source.push_str(&uniform_binding(
            entry.layout,
            group as u32,
            &uniform_var_name(entry.layout.name),
        ));
    }
    source
}

/// Outcome of checking one catalog entry.
#[derive(Debug)]
pub struct LayoutCheck {
    pub entry: &'static CatalogEntry,
    pub result: Result<()>,
}

impl LayoutCheck {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Checks every catalog entry, collecting the outcome of each.
///
/// Fails outright only if the generated WGSL does not parse or validate.
pub fn check_catalog(generator: &WgslGenerator) -> Result<Vec<LayoutCheck>> {
    let source = validation_source(generator);
    let module = reflect_module(&source)?;

    let checks: Vec<LayoutCheck> = CATALOG
        .iter()
        .filter(|entry| generator.includes(entry))
        .map(|entry| {
            let mut result = verify_entry(entry, &module);
            if result.is_ok() {
                result = verify_host_attributes(entry);
            }
            match &result {
                Ok(()) => log::debug!("{}: layout ok", entry.layout.name),
                Err(err) => log::warn!("{err}"),
            }
            LayoutCheck { entry, result }
        })
        .collect();

    let failures = checks.iter().filter(|c| !c.is_ok()).count();
    log::info!("checked {} shared structs, {failures} mismatched", checks.len());
    Ok(checks)
}

fn verify_host_attributes(entry: &CatalogEntry) -> Result<()> {
    match entry.layout.name {
        "NormalVertex" => verify_vertex_attributes::<NormalVertex>(),
        "ColorVertex" => verify_vertex_attributes::<ColorVertex>(),
        "TexVertex" => verify_vertex_attributes::<TexVertex>(),
        "QuadVertex" => verify_vertex_attributes::<QuadVertex>(),
        _ => Ok(()),
    }
}

/// Checks the whole catalog with default options, failing on the first mismatch.
pub fn verify_catalog() -> Result<()> {
    for check in check_catalog(&WgslGenerator::default())? {
        check.result?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find;
    use crate::wgsl::struct_source;
    use scankit_core::{gpu_struct, GpuLayout};

    gpu_struct! {
        #[allow(dead_code)]
        struct Misaligned {
            scale: f32,
            direction: [f32; 3],
        }
    }

    const MISALIGNED_ENTRY: CatalogEntry = CatalogEntry {
        layout: &Misaligned::LAYOUT,
        role: StructRole::Uniform,
    };

    #[test]
    fn test_catalog_agrees_with_naga() {
        verify_catalog().unwrap();
    }

    #[test]
    fn test_every_entry_is_checked() {
        let checks = check_catalog(&WgslGenerator::default()).unwrap();
        assert_eq!(checks.len(), CATALOG.len());
        assert!(checks.iter().all(LayoutCheck::is_ok));
    }

    #[test]
    fn test_check_with_uniform_bindings_enabled() {
        let generator = WgslGenerator::new(CodegenOptions {
            bind_group: 3,
            emit_uniform_bindings: true,
            ..CodegenOptions::default()
        });
        let source = validation_source(&generator);
        assert_eq!(source.matches("var<uniform> depth_overlay_uniforms").count(), 1);
        assert!(check_catalog(&generator).unwrap().iter().all(LayoutCheck::is_ok));
    }

    #[test]
    fn test_vec3_after_scalar_is_reported() {
        // The host packs `direction` at 4; WGSL aligns a vec3 to 16.
        let module = reflect_module(&struct_source(&MISALIGNED_ENTRY)).unwrap();
        let err = verify_entry(&MISALIGNED_ENTRY, &module).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::OffsetMismatch {
                ref field,
                host: 4,
                shader: 16,
                ..
            } if field == "direction"
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let entry = find("GpuIntrinsics").unwrap();
        let module = reflect_module(&struct_source(entry)).unwrap();
        let mut shader = module.require("GpuIntrinsics").unwrap().clone();
        shader.size = 48;
        let err = verify_layout(entry.layout, &shader).unwrap_err();
        assert!(matches!(err, LayoutError::SizeMismatch { host: 32, shader: 48, .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let source = "struct GpuIntrinsics { cx: f32, cy: f32, fx: f32, fy: f32, width: f32, height: u32, _pad_0: u32, _pad_1: u32, }";
        let module = reflect_module(source).unwrap();
        let err = verify_entry(find("GpuIntrinsics").unwrap(), &module).unwrap_err();
        assert!(matches!(err, LayoutError::TypeMismatch { ref field, .. } if field == "width"));
    }

    #[test]
    fn test_wrong_location() {
        let source = "struct ColorVertex { @location(1) position: vec3<f32>, @location(0) color: vec3<f32>, }";
        let module = reflect_module(source).unwrap();
        let err = verify_entry(find("ColorVertex").unwrap(), &module).unwrap_err();
        assert!(matches!(err, LayoutError::AttributeMismatch { ref field, .. } if field == "position"));
    }

    #[test]
    fn test_missing_struct() {
        let module = reflect_module("struct Other { a: f32, }").unwrap();
        let err = verify_entry(find("MeshUniforms").unwrap(), &module).unwrap_err();
        assert!(matches!(err, LayoutError::MissingStruct(_)));
    }

    #[test]
    fn test_vertex_attribute_tables() {
        verify_vertex_attributes::<NormalVertex>().unwrap();
        verify_vertex_attributes::<TexVertex>().unwrap();
    }

    #[test]
    fn test_kind_matches() {
        let uint = ShaderType::Scalar(ScalarType::Uint);
        assert!(kind_matches(FieldKind::Bool, &uint));
        assert!(!kind_matches(FieldKind::F32, &uint));
        assert!(kind_matches(
            FieldKind::Vec3,
            &ShaderType::Vector {
                size: 3,
                scalar: ScalarType::Float
            }
        ));
    }
}
