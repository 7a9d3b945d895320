//! Host-side camera intrinsics.

use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics as reported by the capture SDK.
///
/// Carries radial distortion coefficients which the GPU-side intrinsics drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Focal length along x, in pixels.
    pub fx: f32,
    /// Focal length along y, in pixels.
    pub fy: f32,
    /// Principal point x, in pixels.
    pub cx: f32,
    /// Principal point y, in pixels.
    pub cy: f32,
    /// First radial distortion coefficient.
    #[serde(default)]
    pub k1: f32,
    /// Second radial distortion coefficient.
    #[serde(default)]
    pub k2: f32,
}

impl CameraIntrinsics {
    /// Creates undistorted intrinsics.
    pub fn new(width: u32, height: u32, fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
            k1: 0.0,
            k2: 0.0,
        }
    }

    /// Sets the radial distortion coefficients.
    #[must_use]
    pub fn with_distortion(mut self, k1: f32, k2: f32) -> Self {
        self.k1 = k1;
        self.k2 = k2;
        self
    }

    /// Replaces the image size, keeping focal lengths and principal point.
    ///
    /// Renderers do this when the sampled texture differs from the frame the
    /// intrinsics were captured for.
    #[must_use]
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Vertical field of view in degrees.
    pub fn fov_vertical_degrees(&self) -> f32 {
        (2.0 * (self.height as f32 / (2.0 * self.fy)).atan()).to_degrees()
    }
}

impl Default for CameraIntrinsics {
    /// VGA sensor with a 500 px focal length and centred principal point.
    fn default() -> Self {
        Self::new(640, 480, 500.0, 500.0, 320.0, 240.0)
    }
}
