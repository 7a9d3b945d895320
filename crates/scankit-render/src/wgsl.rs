//! WGSL generation from the layout table.
//!
//! Shader code includes the generated prelude instead of redeclaring the
//! shared structs by hand. Padding words are emitted one `u32` member at a
//! time so the shader never picks up vector alignment the host does not have.

use scankit_core::{CodegenOptions, FieldKind, StructLayout};

use crate::bindings::{VertexAttr, VertexBufferIndex};
use crate::catalog::{CatalogEntry, StructRole, CATALOG};

/// Prefix shared by every padding field and member.
pub const PADDING_PREFIX: &str = "_pad";

/// Returns true if a shader member name denotes padding.
pub fn is_padding_member(name: &str) -> bool {
    name.starts_with(PADDING_PREFIX)
}

/// Emits the WGSL prelude for the shared structs.
#[derive(Debug, Clone, Default)]
pub struct WgslGenerator {
    options: CodegenOptions,
}

impl WgslGenerator {
    /// Creates a generator with the given options.
    #[must_use]
    pub fn new(options: CodegenOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Generates the prelude for the whole catalog.
    pub fn generate(&self) -> String {
        self.generate_entries(CATALOG)
    }

    /// Generates the prelude for a subset of entries, in the order given.
    pub fn generate_entries(&self, entries: &[CatalogEntry]) -> String {
        let mut out = String::new();

        if let Some(header) = &self.options.header {
            for line in header.lines() {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }

        if self.options.emit_binding_constants {
            out.push_str(&binding_constants());
            out.push('\n');
        }

        let mut emitted = 0usize;
        for entry in entries.iter().filter(|entry| self.includes(entry)) {
            out.push_str(&struct_source(entry));
            out.push('\n');
            emitted += 1;
        }

        if self.options.emit_uniform_bindings {
            for entry in entries.iter().filter(|entry| entry.role == StructRole::Uniform) {
                out.push_str(&self.uniform_binding(entry.layout));
            }
        }

        log::debug!("generated WGSL prelude with {emitted} structs ({} bytes)", out.len());
        out
    }

    /// Binding declaration for a uniform block in the configured bind group.
    pub fn uniform_binding(&self, layout: &StructLayout) -> String {
        uniform_binding(layout, self.options.bind_group, &uniform_var_name(layout.name))
    }

    /// Whether the options emit this entry.
    pub fn includes(&self, entry: &CatalogEntry) -> bool {
        match entry.role {
            StructRole::Shared | StructRole::Uniform => true,
            StructRole::VertexInput => self.options.emit_vertex_inputs,
            StructRole::StageOutput => self.options.emit_shader_only,
        }
    }
}

/// Shader-side constants mirroring [`VertexAttr`] and [`VertexBufferIndex`].
pub fn binding_constants() -> String {
    let mut out = String::new();
    for attr in VertexAttr::ALL {
        let name = match attr {
            VertexAttr::Position => "POSITION",
            VertexAttr::Addition => "ADDITION",
        };
        out.push_str(&format!("const VERTEX_ATTR_{name}: u32 = {}u;\n", attr.index()));
    }
    out.push_str(&format!(
        "const VERTEX_BUFFER_INDEX_UNIFORMS: u32 = {}u;\n",
        VertexBufferIndex::Uniforms.index()
    ));
    out
}

/// WGSL declaration of one struct.
pub fn struct_source(entry: &CatalogEntry) -> String {
    let layout = entry.layout;
    let mut out = format!("struct {} {{\n", layout.name);
    let mut location = 0u32;

    for (index, field) in layout.fields.iter().enumerate() {
        if let FieldKind::Pad(words) = field.kind {
            for word in 0..words {
                out.push_str(&format!("    {}_{word}: u32,\n", field.name));
            }
            continue;
        }

        let attribute = match entry.role {
            StructRole::VertexInput => format!("@location({index}) "),
            StructRole::StageOutput if index == 0 => "@builtin(position) ".to_string(),
            StructRole::StageOutput => {
                let attribute = format!("@location({location}) ");
                location += 1;
                attribute
            }
            StructRole::Shared | StructRole::Uniform => String::new(),
        };
        out.push_str(&format!("    {attribute}{}: {},\n", field.name, field.kind.wgsl_type()));
    }

    out.push_str("}\n");
    out
}

/// `@group(g) @binding(2) var<uniform> name: T;`
pub fn uniform_binding(layout: &StructLayout, group: u32, var_name: &str) -> String {
    format!(
        "@group({group}) @binding({}) var<uniform> {var_name}: {};\n",
        VertexBufferIndex::Uniforms.index(),
        layout.name
    )
}

/// Snake-case variable name for a struct, e.g. `depth_overlay_uniforms`.
pub fn uniform_var_name(struct_name: &str) -> String {
    let mut name = String::with_capacity(struct_name.len() + 4);
    for (i, c) in struct_name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}
