//! scankit: the GPU layout table shared by the scanning toolkit's host code
//! and its WGSL shaders.
//!
//! Every struct that crosses the host/shader boundary is declared once with
//! [`gpu_struct!`]. That declaration yields the `#[repr(C)]` host type, the
//! WGSL declaration, and the layout descriptor the checks compare against
//! naga's view of the shader.
//!
//! # Quick Start
//!
//! ```
//! use scankit::*;
//!
//! // A depth overlay block for a 640x480 camera.
//! let camera = CameraIntrinsics::new(640, 480, 500.0, 500.0, 320.0, 240.0);
//! let block = DepthOverlayUniforms::new(
//!     Mat4::IDENTITY,
//!     Mat4::IDENTITY,
//!     GpuIntrinsics::from(&camera),
//!     cube_model_inv(Vec3::splat(1000.0)),
//!     100.0,
//!     5000.0,
//!     0.8,
//! );
//! assert_eq!(block.as_bytes().len(), 240);
//!
//! // The matching WGSL declarations.
//! let wgsl = WgslGenerator::default().generate();
//! assert!(wgsl.contains("struct DepthOverlayUniforms {"));
//! ```
//!
//! # Layout
//!
//! - [`GpuIntrinsics`] - pinhole intrinsics nested in the overlay and cube blocks
//! - Uniform blocks - one per technique, bound at [`VertexBufferIndex::Uniforms`]
//! - Vertex formats - [`NormalVertex`], [`ColorVertex`], [`TexVertex`], [`QuadVertex`]
//! - [`TEX_VERTEX_OUT`] - the shader-only stage output of the textured techniques

use std::path::Path;

pub use scankit_core::{
    gpu_struct, CameraIntrinsics, CodegenOptions, FieldKind, FieldLayout, GpuBool, GpuField, GpuLayout, GpuValue,
    LayoutError, Mat4, Result, StructLayout, Vec2, Vec3, Vec4,
};

pub use scankit_render::{
    check_catalog, create_attribute_buffer, create_uniform_buffer, create_vertex_buffer, cube_model_inv,
    layout_table, quad_vertices, reflect_module, texture_orientation_projection, uniform_layout_entry,
    update_uniform_buffer, verify_catalog, verify_entry, verify_layout, visualization_depth_range, CatalogEntry,
    ColorTextureUniforms, ColorVertex, CubeUniforms, DepthBandConfig, DepthBandOverlayUniforms,
    DepthOverlayUniforms, DepthTextureUniforms, GpuIntrinsics, LayoutCheck, LineUniforms, MeshPointsUniforms,
    MeshUniforms, MeshWireframeUniforms, NormalVertex, QuadVertex, ReflectedModule, ReflectedStruct, StructRole,
    TexVertex, ThickLineUniforms, UniformBinding, VertexAttr, VertexBufferIndex, VertexFormat, WgslGenerator,
    CATALOG, TEX_VERTEX_OUT,
};

/// Lower-level access to the layout modules.
pub use scankit_render as render;

/// Initializes `env_logger` once. Later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Writes the WGSL prelude for `options` to `path`.
pub fn write_wgsl(path: impl AsRef<Path>, options: CodegenOptions) -> Result<()> {
    let path = path.as_ref();
    let source = WgslGenerator::new(options).generate();
    std::fs::write(path, source)?;
    log::info!("wrote WGSL prelude to {}", path.display());
    Ok(())
}

/// Writes the layout table as JSON to `path`.
pub fn write_schema(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render::catalog::to_json()?)?;
    log::info!("wrote layout schema to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("scankit-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_write_wgsl() {
        let path = scratch("layout.wgsl");
        let options = CodegenOptions {
            emit_uniform_bindings: true,
            ..CodegenOptions::host_shareable_only()
        };
        write_wgsl(&path, options.clone()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, WgslGenerator::new(options).generate());
        assert!(written.contains("@group(0) @binding(2) var<uniform> mesh_uniforms: MeshUniforms;"));
    }

    #[test]
    fn test_write_schema() {
        let path = scratch("layout.json");
        write_schema(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, render::catalog::to_json().unwrap());
        assert!(written.contains("\"DepthBandOverlayUniforms\""));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let err = write_schema("/nonexistent/scankit/layout.json").unwrap_err();
        assert!(matches!(err, LayoutError::Io(_)));
    }
}
