//! Camera intrinsics as uploaded to the GPU.

use scankit_core::{gpu_struct, CameraIntrinsics};
use static_assertions::const_assert_eq;

gpu_struct! {
    /// Pinhole intrinsics as seen by the shaders.
    ///
    /// The two trailing words pad the struct to 32 bytes, a multiple of 16, so
    /// it can be nested in uniform blocks.
    pub struct GpuIntrinsics {
        /// Principal point x, in pixels.
        pub cx: f32,
        /// Principal point y, in pixels.
        pub cy: f32,
        /// Focal length along x, in pixels.
        pub fx: f32,
        /// Focal length along y, in pixels.
        pub fy: f32,
        /// Image width in pixels.
        pub width: u32,
        /// Image height in pixels.
        pub height: u32,
        pub _pad: [u32; 2],
    }
}

const_assert_eq!(std::mem::size_of::<GpuIntrinsics>(), 32);
const_assert_eq!(std::mem::offset_of!(GpuIntrinsics, width), 16);

impl GpuIntrinsics {
    /// Creates GPU intrinsics from raw parameters.
    pub const fn new(cx: f32, cy: f32, fx: f32, fy: f32, width: u32, height: u32) -> Self {
        Self {
            cx,
            cy,
            fx,
            fy,
            width,
            height,
            _pad: [0; 2],
        }
    }
}

impl From<&CameraIntrinsics> for GpuIntrinsics {
    /// Drops the distortion coefficients; the shaders use an ideal pinhole.
    fn from(intr: &CameraIntrinsics) -> Self {
        Self::new(intr.cx, intr.cy, intr.fx, intr.fy, intr.width, intr.height)
    }
}

impl From<CameraIntrinsics> for GpuIntrinsics {
    fn from(intr: CameraIntrinsics) -> Self {
        Self::from(&intr)
    }
}
