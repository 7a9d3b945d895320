//! Configuration options for WGSL code generation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling what the WGSL prelude contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// Bind group used for uniform binding declarations.
    pub bind_group: u32,

    /// Whether to emit a `var<uniform>` declaration for each uniform block.
    pub emit_uniform_bindings: bool,

    /// Whether to emit vertex input structs with `@location` annotations.
    pub emit_vertex_inputs: bool,

    /// Whether to emit structs that exist only on the shader side.
    pub emit_shader_only: bool,

    /// Whether to emit the shader-side binding index constants.
    pub emit_binding_constants: bool,

    /// Comment placed at the top of the generated source.
    pub header: Option<String>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            bind_group: 0,
            emit_uniform_bindings: false,
            emit_vertex_inputs: true,
            emit_shader_only: true,
            emit_binding_constants: true,
            header: Some("Generated by scankit. Do not edit.".to_string()),
        }
    }
}

impl CodegenOptions {
    /// Parses options from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let options = Self::from_json(&text)?;
        log::debug!("loaded codegen options from {}", path.display());
        Ok(options)
    }

    /// Options for a bare module holding only host-shareable structs.
    #[must_use]
    pub fn host_shareable_only() -> Self {
        Self {
            emit_vertex_inputs: false,
            emit_shader_only: false,
            emit_binding_constants: false,
            header: None,
            ..Self::default()
        }
    }
}
