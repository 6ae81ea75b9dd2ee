//! Distance images of a pinhole camera.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use traj_core::traits::Validate;
use traj_core::{Result, SplineError};
use traj_math::{DMat3, DVec2, DVec3};

use crate::Pointcloud;

/// Row-major grid of distances seen by a pinhole camera.
///
/// Pixel `(x, y)` lies at `(x * scale.x + center.x, y * scale.y + center.y, 1)`
/// on the projection plane, and its scene point is that vector times the
/// distance. `scale` and `center` are the inverse of the usual focal length
/// and principal point; use [`DistanceImage::set_intrinsic`] and
/// [`DistanceImage::intrinsic`] to work with the latter. NaN marks a pixel
/// without distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceImage {
    pub time: SystemTime,
    pub width: u16,
    pub height: u16,
    pub scale: DVec2,
    pub center: DVec2,
    pub data: Vec<f32>,
}

impl DistanceImage {
    /// Image of the given size with every pixel unset.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            time: SystemTime::UNIX_EPOCH,
            width,
            height,
            scale: DVec2::ONE,
            center: DVec2::ZERO,
            data: vec![f32::NAN; width as usize * height as usize],
        }
    }

    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Unset every pixel.
    pub fn clear(&mut self) {
        self.data.fill(f32::NAN);
    }

    /// Resize the image; pixels added by growing are unset.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let count = self.pixel_count();
        self.data.resize(count, f32::NAN);
    }

    /// Camera matrix mapping scene points to homogeneous pixel coordinates:
    ///
    /// ```text
    /// | f_x  0    c_x |
    /// | 0    f_y  c_y |
    /// | 0    0    1   |
    /// ```
    pub fn intrinsic(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(1.0 / self.scale.x, 0.0, 0.0),
            DVec3::new(0.0, 1.0 / self.scale.y, 0.0),
            DVec3::new(
                -self.center.x / self.scale.x,
                -self.center.y / self.scale.y,
                1.0,
            ),
        )
    }

    /// Set focal lengths and principal point, in pixels.
    pub fn set_intrinsic(&mut self, f_x: f64, f_y: f64, c_x: f64, c_y: f64) {
        self.scale = DVec2::new(1.0 / f_x, 1.0 / f_y);
        self.center = DVec2::new(-c_x / f_x, -c_y / f_y);
    }

    /// Scene point of pixel `(x, y)`, if it is inside the image and holds a
    /// normal (non-zero, finite) distance.
    pub fn scene_point(&self, x: usize, y: usize) -> Option<DVec3> {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        let d = *self.data.get(self.width as usize * y + x)?;
        if !d.is_normal() {
            return None;
        }
        let plane = DVec2::new(x as f64, y as f64) * self.scale + self.center;
        Some(plane.extend(1.0) * d as f64)
    }

    /// Nearest pixel onto which `point` projects, if it lies in front of the
    /// camera and inside the image.
    pub fn image_point(&self, point: DVec3) -> Option<(usize, usize)> {
        if !(point.z > 0.0) {
            return None;
        }
        let pixel = ((point.truncate() / point.z - self.center) / self.scale).round();
        if !(pixel.x >= 0.0 && pixel.y >= 0.0) {
            return None;
        }
        let (x, y) = (pixel.x as usize, pixel.y as usize);
        (x < self.width as usize && y < self.height as usize).then_some((x, y))
    }

    /// Scene points of every pixel with a distance, in row-major order.
    pub fn to_pointcloud(&self) -> Pointcloud {
        let mut cloud = Pointcloud::new(self.time);
        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                if let Some(p) = self.scene_point(x, y) {
                    cloud.points.push(p);
                }
            }
        }
        cloud
    }
}

impl Default for DistanceImage {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Validate for DistanceImage {
    fn validate(&self) -> Result<()> {
        if self.data.len() != self.pixel_count() {
            return Err(SplineError::DimensionMismatch {
                expected: self.pixel_count(),
                actual: self.data.len(),
            });
        }
        if !(self.scale.x != 0.0 && self.scale.y != 0.0 && self.scale.is_finite()) {
            return Err(SplineError::InvalidConfig(format!(
                "pixel scale must be finite and non-zero, got {:?}",
                self.scale
            )));
        }
        Ok(())
    }
}
