//! Error types for scankit.

use thiserror::Error;

/// The main error type for scankit layout operations.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The generated or supplied WGSL failed to parse.
    #[error("WGSL parse error: {0}")]
    WgslParse(String),

    /// The WGSL module parsed but failed naga validation.
    #[error("WGSL validation error: {0}")]
    WgslValidation(String),

    /// A struct expected in the shader module was not declared.
    #[error("struct '{0}' not found in shader module")]
    MissingStruct(String),

    /// A host field has no member of the same name on the shader side.
    #[error("field '{field}' of '{structure}' not found on the shader side")]
    MissingField { structure: String, field: String },

    /// Host and shader disagree on the size of a struct.
    #[error("size mismatch for '{structure}': host {host} bytes, shader {shader} bytes")]
    SizeMismatch {
        structure: String,
        host: usize,
        shader: usize,
    },

    /// Host and shader disagree on the byte offset of a field.
    #[error("offset mismatch for '{structure}.{field}': host {host}, shader {shader}")]
    OffsetMismatch {
        structure: String,
        field: String,
        host: usize,
        shader: usize,
    },

    /// Host and shader disagree on the type of a field.
    #[error("type mismatch for '{structure}.{field}': host {host}, shader {shader}")]
    TypeMismatch {
        structure: String,
        field: String,
        host: String,
        shader: String,
    },

    /// A vertex attribute does not agree with its struct field.
    #[error("vertex attribute mismatch for '{structure}.{field}': {detail}")]
    AttributeMismatch {
        structure: String,
        field: String,
        detail: String,
    },

    /// A byte slice has the wrong length for the layout it is read as.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// A shader member has a type that cannot be decoded.
    #[error("unsupported shader type for '{structure}.{field}'")]
    UnsupportedType { structure: String, field: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for scankit layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
