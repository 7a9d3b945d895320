//! The shared layout table.
//!
//! One entry per struct that crosses the host/shader boundary, tagged with
//! the role that decides how the WGSL generator emits it and how the layout
//! checks compare it.

use scankit_core::{GpuLayout, Result, StructLayout};
use serde::Serialize;

use crate::intrinsics::GpuIntrinsics;
use crate::uniforms::{
    ColorTextureUniforms, CubeUniforms, DepthBandOverlayUniforms, DepthOverlayUniforms, DepthTextureUniforms,
    LineUniforms, MeshPointsUniforms, MeshUniforms, MeshWireframeUniforms, ThickLineUniforms,
};
use crate::vertex::{ColorVertex, NormalVertex, QuadVertex, TexVertex, TEX_VERTEX_OUT};

/// How a struct is used across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StructRole {
    /// Host-shareable struct nested inside other blocks.
    Shared,
    /// A per-draw uniform block bound at the uniform binding index.
    Uniform,
    /// Vertex shader input; fields carry `@location` annotations.
    VertexInput,
    /// Vertex shader output with no host counterpart.
    StageOutput,
}

/// One row of the layout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub layout: &'static StructLayout,
    pub role: StructRole,
}

impl CatalogEntry {
    const fn new(layout: &'static StructLayout, role: StructRole) -> Self {
        Self { layout, role }
    }

    /// Whether the struct lives in buffer memory, where byte offsets matter.
    pub fn is_host_shareable(&self) -> bool {
        matches!(self.role, StructRole::Shared | StructRole::Uniform)
    }

    /// Whether a Rust type exists for this struct.
    pub fn has_host_type(&self) -> bool {
        self.role != StructRole::StageOutput
    }
}

/// Every struct shared between host and shader code.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry::new(&GpuIntrinsics::LAYOUT, StructRole::Shared),
    CatalogEntry::new(&ColorTextureUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&DepthTextureUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&DepthOverlayUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&DepthBandOverlayUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&LineUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&CubeUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&MeshUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&MeshPointsUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&MeshWireframeUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&ThickLineUniforms::LAYOUT, StructRole::Uniform),
    CatalogEntry::new(&NormalVertex::LAYOUT, StructRole::VertexInput),
    CatalogEntry::new(&ColorVertex::LAYOUT, StructRole::VertexInput),
    CatalogEntry::new(&TexVertex::LAYOUT, StructRole::VertexInput),
    CatalogEntry::new(&QuadVertex::LAYOUT, StructRole::VertexInput),
    CatalogEntry::new(&TEX_VERTEX_OUT, StructRole::StageOutput),
];

/// The layout table, in declaration order.
pub fn layout_table() -> &'static [CatalogEntry] {
    CATALOG
}

/// Finds a catalog entry by struct name.
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.layout.name == name)
}

/// Iterates over the uniform blocks.
pub fn uniform_blocks() -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(|entry| entry.role == StructRole::Uniform)
}

/// The catalog as pretty-printed JSON, for consumers outside Rust.
pub fn to_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(CATALOG)?)
}
