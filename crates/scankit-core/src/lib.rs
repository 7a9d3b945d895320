//! Core abstractions for scankit.
//!
//! This crate provides the schema used to keep host and shader layouts in
//! agreement:
//! - [`gpu_struct!`] declares a struct once for both targets
//! - [`GpuLayout`] / [`StructLayout`] describe the resulting memory layout
//! - [`GpuBool`] is the fixed-size flag type shared by both sides
//! - [`CameraIntrinsics`] and [`CodegenOptions`] are host-side inputs

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Image sizes fit f32 exactly for any realistic sensor
#![allow(clippy::cast_precision_loss)]

pub mod camera;
pub mod error;
pub mod layout;
pub mod options;

pub use camera::CameraIntrinsics;
pub use error::{LayoutError, Result};
pub use layout::{FieldKind, FieldLayout, GpuBool, GpuField, GpuLayout, GpuValue, StructLayout};
pub use options::CodegenOptions;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
