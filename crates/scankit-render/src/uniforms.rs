//! Per-draw uniform blocks, one per rendering technique.
//!
//! Every block is created fresh for a draw call and uploaded as-is. Matrices
//! are column-major (`glam::Mat4::to_cols_array_2d`), colors are RGBA, and
//! flags are [`GpuBool`] words. Padding is explicit and mirrored in the
//! generated WGSL, so each block's size is a multiple of 16 as WGSL uniform
//! rules require.

use std::mem::{offset_of, size_of};

use glam::{Mat4, Vec3, Vec4};
use scankit_core::{gpu_struct, GpuBool};
use serde::{Deserialize, Serialize};
use static_assertions::{assert_impl_all, const_assert_eq};

use crate::intrinsics::GpuIntrinsics;

gpu_struct! {
    /// Uniforms for drawing a color camera texture on a full-screen quad.
    pub struct ColorTextureUniforms {
        pub projection: [[f32; 4]; 4],
    }
}

gpu_struct! {
    /// Uniforms for drawing a depth frame as a colorized texture.
    pub struct DepthTextureUniforms {
        pub projection: [[f32; 4]; 4],
        /// Depth mapped to the start of the color ramp.
        pub depth_min: f32,
        /// Depth mapped to the end of the color ramp.
        pub depth_max: f32,
        /// Blend alpha.
        pub alpha: f32,
        pub _pad: [u32; 1],
    }
}

gpu_struct! {
    /// Uniforms for overlaying a depth frame on the scan volume.
    ///
    /// Depth bounds are in millimetres, see [`visualization_depth_range`].
    pub struct DepthOverlayUniforms {
        pub projection: [[f32; 4]; 4],
        /// Camera pose in volume coordinates.
        pub camera_pose: [[f32; 4]; 4],
        pub camera_intrinsics: GpuIntrinsics,
        /// Inverse of the volume model matrix.
        pub cube_model_inv: [[f32; 4]; 4],
        pub depth_min: f32,
        pub depth_max: f32,
        pub alpha: f32,
        pub _pad: [u32; 1],
    }
}

gpu_struct! {
    /// Uniforms for highlighting depth inside and outside a valid range.
    pub struct DepthBandOverlayUniforms {
        pub projection: [[f32; 4]; 4],
        pub camera_pose: [[f32; 4]; 4],
        pub camera_intrinsics: GpuIntrinsics,
        pub cube_model_inv: [[f32; 4]; 4],
        pub alpha: f32,
        pub valid_range_min_mm: f32,
        pub valid_range_max_mm: f32,
        pub _pad0: [u32; 1],
        pub valid_range_color: [f32; 4],
        pub out_of_range_color: [f32; 4],
        /// Width of the blend between the two colors, in millimetres.
        pub feather: f32,
        pub _pad1: [u32; 3],
    }
}

gpu_struct! {
    /// Uniforms for world-space lines.
    pub struct LineUniforms {
        pub model: [[f32; 4]; 4],
        pub view: [[f32; 4]; 4],
        pub projection: [[f32; 4]; 4],
    }
}

gpu_struct! {
    /// Uniforms for the scan volume cube.
    pub struct CubeUniforms {
        pub model: [[f32; 4]; 4],
        pub view: [[f32; 4]; 4],
        pub projection: [[f32; 4]; 4],
        pub camera_intrinsics: GpuIntrinsics,
        /// Hide cube faces occluded by the depth frame.
        pub use_occlusion: GpuBool,
        pub _pad: [u32; 3],
    }
}

gpu_struct! {
    /// Uniforms for solid, colored and textured meshes.
    pub struct MeshUniforms {
        pub model_view_matrix: [[f32; 4]; 4],
        pub projection_matrix: [[f32; 4]; 4],
        pub color: [f32; 4],
    }
}

gpu_struct! {
    /// Uniforms for drawing mesh vertices as points.
    pub struct MeshPointsUniforms {
        pub model_view_matrix: [[f32; 4]; 4],
        pub projection_matrix: [[f32; 4]; 4],
        /// Point size in pixels.
        pub point_size: f32,
        pub _pad: [u32; 3],
    }
}

gpu_struct! {
    /// Uniforms for mesh wireframes.
    pub struct MeshWireframeUniforms {
        pub model_view_matrix: [[f32; 4]; 4],
        pub projection_matrix: [[f32; 4]; 4],
        pub color: [f32; 4],
        /// Draw edges hidden behind the surface.
        pub use_xray: GpuBool,
        pub _pad: [u32; 3],
    }
}

gpu_struct! {
    /// Uniforms for screen-space thick lines.
    pub struct ThickLineUniforms {
        pub model_view_matrix: [[f32; 4]; 4],
        pub projection_matrix: [[f32; 4]; 4],
        pub color: [f32; 4],
        /// Line width in pixels.
        pub width: f32,
        pub _pad: [u32; 3],
    }
}

const_assert_eq!(size_of::<ColorTextureUniforms>(), 64);
const_assert_eq!(size_of::<DepthTextureUniforms>(), 80);
const_assert_eq!(size_of::<DepthOverlayUniforms>(), 240);
const_assert_eq!(size_of::<DepthBandOverlayUniforms>(), 288);
const_assert_eq!(size_of::<LineUniforms>(), 192);
const_assert_eq!(size_of::<CubeUniforms>(), 240);
const_assert_eq!(size_of::<MeshUniforms>(), 144);
const_assert_eq!(size_of::<MeshPointsUniforms>(), 144);
const_assert_eq!(size_of::<MeshWireframeUniforms>(), 160);
const_assert_eq!(size_of::<ThickLineUniforms>(), 160);

assert_impl_all!(ColorTextureUniforms: Copy, Send, Sync);
assert_impl_all!(DepthOverlayUniforms: Copy, Send, Sync);
assert_impl_all!(DepthBandOverlayUniforms: Copy, Send, Sync);
assert_impl_all!(CubeUniforms: Copy, Send, Sync);
assert_impl_all!(MeshWireframeUniforms: Copy, Send, Sync);

// Nested intrinsics and vec4 members must start on 16-byte boundaries.
const_assert_eq!(offset_of!(DepthOverlayUniforms, camera_intrinsics), 128);
const_assert_eq!(offset_of!(DepthOverlayUniforms, cube_model_inv), 160);
const_assert_eq!(offset_of!(DepthBandOverlayUniforms, valid_range_color), 240);
const_assert_eq!(offset_of!(DepthBandOverlayUniforms, feather), 272);
const_assert_eq!(offset_of!(CubeUniforms, camera_intrinsics), 192);
const_assert_eq!(offset_of!(CubeUniforms, use_occlusion), 224);
const_assert_eq!(offset_of!(MeshWireframeUniforms, use_xray), 144);

fn cols(m: Mat4) -> [[f32; 4]; 4] {
    m.to_cols_array_2d()
}

/// Projection that applies `orientation` about the centre of a unit texture.
///
/// Moves texture coordinates to [-0.5, 0.5], applies the rotation/mirroring,
/// and moves them back to [0, 1].
pub fn texture_orientation_projection(orientation: Mat4) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0))
        * orientation
        * Mat4::from_translation(Vec3::new(-0.5, -0.5, 0.0))
}

/// Inverse of the model matrix of a scan volume of the given size.
pub fn cube_model_inv(volume_size: Vec3) -> Mat4 {
    Mat4::from_scale(volume_size).inverse()
}

/// Depth range covering a scan volume as seen from `camera_point`.
///
/// `camera_point` and `volume_size` are in metres, in volume coordinates with
/// the volume spanning `[0, volume_size]`. The volume is approximated by a
/// sphere around its centre whose radius is half its largest extent. Returns
/// `(depth_min, depth_max)` in millimetres, ready for
/// [`DepthOverlayUniforms::new`]. The near bound is 0 when the camera is
/// inside that sphere.
pub fn visualization_depth_range(camera_point: Vec3, volume_size: Vec3) -> (f32, f32) {
    let distance = camera_point.distance(volume_size / 2.0);
    let radius = volume_size.max_element() / 2.0;
    let min_m = (distance - radius).max(0.0);
    let max_m = distance + radius;
    (min_m * 1000.0, max_m * 1000.0)
}

impl ColorTextureUniforms {
    pub fn new(projection: Mat4) -> Self {
        Self {
            projection: cols(projection),
        }
    }
}

impl Default for ColorTextureUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl DepthTextureUniforms {
    pub fn new(projection: Mat4, depth_min: f32, depth_max: f32, alpha: f32) -> Self {
        Self {
            projection: cols(projection),
            depth_min,
            depth_max,
            alpha,
            _pad: [0; 1],
        }
    }
}

impl DepthOverlayUniforms {
    pub fn new(
        projection: Mat4,
        camera_pose: Mat4,
        camera_intrinsics: GpuIntrinsics,
        cube_model_inv: Mat4,
        depth_min: f32,
        depth_max: f32,
        alpha: f32,
    ) -> Self {
        Self {
            projection: cols(projection),
            camera_pose: cols(camera_pose),
            camera_intrinsics,
            cube_model_inv: cols(cube_model_inv),
            depth_min,
            depth_max,
            alpha,
            _pad: [0; 1],
        }
    }
}

/// Valid-range band configuration for [`DepthBandOverlayUniforms`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthBandConfig {
    /// Near edge of the valid range, in millimetres.
    pub valid_range_min_mm: f32,
    /// Far edge of the valid range, in millimetres.
    pub valid_range_max_mm: f32,
    /// Color inside the range.
    pub valid_range_color: Vec4,
    /// Color outside the range.
    pub out_of_range_color: Vec4,
    /// Blend width at the range edges, in millimetres.
    pub feather: f32,
}

impl Default for DepthBandConfig {
    fn default() -> Self {
        Self {
            valid_range_min_mm: 200.0,
            valid_range_max_mm: 400.0,
            valid_range_color: Vec4::new(0.0, 1.0, 0.0, 0.5), // green
            out_of_range_color: Vec4::new(1.0, 0.0, 0.0, 0.5), // red
            feather: 40.0,
        }
    }
}

impl DepthBandOverlayUniforms {
    pub fn new(
        projection: Mat4,
        camera_pose: Mat4,
        camera_intrinsics: GpuIntrinsics,
        cube_model_inv: Mat4,
        alpha: f32,
        band: &DepthBandConfig,
    ) -> Self {
        Self {
            projection: cols(projection),
            camera_pose: cols(camera_pose),
            camera_intrinsics,
            cube_model_inv: cols(cube_model_inv),
            alpha,
            valid_range_min_mm: band.valid_range_min_mm,
            valid_range_max_mm: band.valid_range_max_mm,
            _pad0: [0; 1],
            valid_range_color: band.valid_range_color.to_array(),
            out_of_range_color: band.out_of_range_color.to_array(),
            feather: band.feather,
            _pad1: [0; 3],
        }
    }
}

impl LineUniforms {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model: cols(model),
            view: cols(view),
            projection: cols(projection),
        }
    }
}

impl CubeUniforms {
    pub fn new(
        model: Mat4,
        view: Mat4,
        projection: Mat4,
        camera_intrinsics: GpuIntrinsics,
        use_occlusion: bool,
    ) -> Self {
        Self {
            model: cols(model),
            view: cols(view),
            projection: cols(projection),
            camera_intrinsics,
            use_occlusion: use_occlusion.into(),
            _pad: [0; 3],
        }
    }
}

impl MeshUniforms {
    pub fn new(model_view_matrix: Mat4, projection_matrix: Mat4, color: Vec4) -> Self {
        Self {
            model_view_matrix: cols(model_view_matrix),
            projection_matrix: cols(projection_matrix),
            color: color.to_array(),
        }
    }
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec4::ONE)
    }
}

impl MeshPointsUniforms {
    pub fn new(model_view_matrix: Mat4, projection_matrix: Mat4, point_size: f32) -> Self {
        Self {
            model_view_matrix: cols(model_view_matrix),
            projection_matrix: cols(projection_matrix),
            point_size,
            _pad: [0; 3],
        }
    }
}

impl MeshWireframeUniforms {
    pub fn new(model_view_matrix: Mat4, projection_matrix: Mat4, color: Vec4, use_xray: bool) -> Self {
        Self {
            model_view_matrix: cols(model_view_matrix),
            projection_matrix: cols(projection_matrix),
            color: color.to_array(),
            use_xray: use_xray.into(),
            _pad: [0; 3],
        }
    }
}

impl Default for MeshWireframeUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec4::ONE, true)
    }
}

impl ThickLineUniforms {
    pub fn new(model_view_matrix: Mat4, projection_matrix: Mat4, color: Vec4, width: f32) -> Self {
        Self {
            model_view_matrix: cols(model_view_matrix),
            projection_matrix: cols(projection_matrix),
            color: color.to_array(),
            width,
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scankit_core::GpuLayout;

    fn sample_intrinsics() -> GpuIntrinsics {
        GpuIntrinsics::new(320.0, 240.0, 500.0, 500.0, 640, 480)
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        let sizes = [
            ColorTextureUniforms::LAYOUT.size,
            DepthTextureUniforms::LAYOUT.size,
            DepthOverlayUniforms::LAYOUT.size,
            DepthBandOverlayUniforms::LAYOUT.size,
            LineUniforms::LAYOUT.size,
            CubeUniforms::LAYOUT.size,
            MeshUniforms::LAYOUT.size,
            MeshPointsUniforms::LAYOUT.size,
            MeshWireframeUniforms::LAYOUT.size,
            ThickLineUniforms::LAYOUT.size,
        ];
        for size in sizes {
            assert_eq!(size % 16, 0, "uniform block of {size} bytes is not 16-byte aligned");
        }
    }

    #[test]
    fn test_matrices_are_column_major() {
        let translation = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniforms = ColorTextureUniforms::new(translation);
        // The translation lives in the fourth column.
        assert_eq!(uniforms.projection[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_flag_toggle_keeps_offsets() {
        let on = CubeUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, sample_intrinsics(), true);
        let off = CubeUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, sample_intrinsics(), false);
        let (on, off) = (on.as_bytes(), off.as_bytes());
        assert_eq!(on.len(), off.len());

        let flag = offset_of!(CubeUniforms, use_occlusion);
        assert_eq!(&on[flag..flag + 4], &1u32.to_ne_bytes());
        assert_eq!(&off[flag..flag + 4], &0u32.to_ne_bytes());
        // Only the flag word differs.
        let differing: Vec<usize> = (0..on.len()).filter(|&i| on[i] != off[i]).collect();
        assert!(differing.iter().all(|&i| (flag..flag + 4).contains(&i)));
    }

    #[test]
    fn test_depth_band_defaults() {
        let band = DepthBandConfig::default();
        let uniforms = DepthBandOverlayUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            sample_intrinsics(),
            cube_model_inv(Vec3::splat(0.5)),
            0.7,
            &band,
        );
        assert_eq!(uniforms.valid_range_min_mm, 200.0);
        assert_eq!(uniforms.valid_range_max_mm, 400.0);
        assert_eq!(uniforms.valid_range_color, [0.0, 1.0, 0.0, 0.5]);
        assert_eq!(uniforms.out_of_range_color, [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(uniforms.feather, 40.0);
        assert_eq!(uniforms.cube_model_inv[0][0], 2.0);
    }

    #[test]
    fn test_depth_range_from_outside_volume() {
        let volume = Vec3::ONE;
        let (near, far) = visualization_depth_range(Vec3::new(0.5, 0.5, -1.5), volume);
        assert_eq!(near, 1500.0);
        assert_eq!(far, 2500.0);

        let uniforms = DepthOverlayUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            sample_intrinsics(),
            cube_model_inv(volume),
            near,
            far,
            0.8,
        );
        assert_eq!((uniforms.depth_min, uniforms.depth_max), (1500.0, 2500.0));
    }

    #[test]
    fn test_depth_range_clamps_inside_volume() {
        let (near, far) = visualization_depth_range(Vec3::new(0.5, 0.5, 0.2), Vec3::ONE);
        assert_eq!(near, 0.0);
        assert!((far - 800.0).abs() < 1e-3);

        // The largest extent sets the radius.
        let (near, far) = visualization_depth_range(Vec3::new(1.0, 0.5, 0.5), Vec3::new(2.0, 1.0, 1.0));
        assert_eq!(near, 0.0);
        assert_eq!(far, 1000.0);
    }

    #[test]
    fn test_depth_band_config_json() {
        let band: DepthBandConfig = serde_json::from_str(r#"{ "feather": 10.0 }"#).unwrap();
        assert_eq!(band.feather, 10.0);
        assert_eq!(band.valid_range_max_mm, 400.0);
    }

    #[test]
    fn test_texture_orientation_projection() {
        // A 180 degree rotation about z maps the texture corner (0, 0) to (1, 1).
        let rotation = Mat4::from_rotation_z(std::f32::consts::PI);
        let projection = texture_orientation_projection(rotation);
        let corner = projection.transform_point3(Vec3::ZERO);
        assert!((corner - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
        let centre = projection.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((centre - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_mesh_defaults() {
        let mesh = MeshUniforms::default();
        assert_eq!(mesh.color, [1.0; 4]);
        assert_eq!(mesh.model_view_matrix, Mat4::IDENTITY.to_cols_array_2d());

        let wireframe = MeshWireframeUniforms::default();
        assert!(wireframe.use_xray.get());
    }

    proptest! {
        #[test]
        fn prop_orientation_keeps_texture_centre(angle in -6.3f32..6.3, mirror in any::<bool>()) {
            let flip = if mirror { Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)) } else { Mat4::IDENTITY };
            let projection = texture_orientation_projection(Mat4::from_rotation_z(angle) * flip);
            let centre = projection.transform_point3(Vec3::new(0.5, 0.5, 0.0));
            prop_assert!((centre - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-5);
        }
    }
}
