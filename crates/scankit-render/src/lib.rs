//! Shared GPU layout table for scankit.
//!
//! This crate defines every struct that crosses the host/shader boundary:
//! - Camera intrinsics as the shaders see them
//! - One uniform block per rendering technique
//! - Vertex formats and their wgpu attribute tables
//! - Attribute and uniform binding index conventions
//!
//! It also generates the matching WGSL declarations and checks, through naga,
//! that host and shader agree on every size and offset.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod bindings;
pub mod buffer;
pub mod catalog;
pub mod intrinsics;
pub mod reflect;
pub mod uniforms;
pub mod verify;
pub mod vertex;
pub mod wgsl;

pub use bindings::{uniform_layout_entry, VertexAttr, VertexBufferIndex};
pub use buffer::{
    create_attribute_buffer, create_uniform_buffer, create_vertex_buffer, update_uniform_buffer, UniformBinding,
};
pub use catalog::{layout_table, CatalogEntry, StructRole, CATALOG};
pub use intrinsics::GpuIntrinsics;
pub use reflect::{reflect_module, MemberBinding, ReflectedMember, ReflectedModule, ReflectedStruct, ShaderType};
pub use uniforms::{
    cube_model_inv, texture_orientation_projection, visualization_depth_range, ColorTextureUniforms, CubeUniforms,
    DepthBandConfig, DepthBandOverlayUniforms, DepthOverlayUniforms, DepthTextureUniforms, LineUniforms,
    MeshPointsUniforms, MeshUniforms, MeshWireframeUniforms, ThickLineUniforms,
};
pub use verify::{check_catalog, verify_catalog, verify_entry, verify_layout, LayoutCheck};
pub use vertex::{quad_vertices, ColorVertex, NormalVertex, QuadVertex, TexVertex, VertexFormat, TEX_VERTEX_OUT};
pub use wgsl::WgslGenerator;
