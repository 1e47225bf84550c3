//! Math utilities and types for the skyline scene.
//!
//! This module provides matrix and vector types and operations, as well as
//! helper functions for angle conversions and camera frustum sizing. The
//! types are `bytemuck::Pod` so they can be copied straight into GPU buffers.
//!
//! # Module Organization
//!
//! - [`vec`] module contains the vector type
//! - [`mat`] module contains the matrix type
//! - Angle and frustum helpers live at root level

pub mod mat;
pub mod vec;

pub use mat::Mat4;
pub use vec::Vec3;

/// Converts degrees to radians.
///
/// This handles angle wrapping by first normalizing the input to the range [0, 360).
///
/// # Example
/// ```ignore
/// assert_eq!(deg_to_rad(180.0), std::f32::consts::PI);
/// assert_eq!(deg_to_rad(540.0), std::f32::consts::PI);
/// ```
pub fn deg_to_rad(degrees: f32) -> f32 {
    (degrees % 360.0) * (std::f32::consts::PI / 180.0)
}

/// Height of a perspective frustum slice at `distance` from the eye.
///
/// # Arguments
///
/// * `fov_y_degrees` - Vertical field of view in degrees
/// * `distance` - Distance from the camera to the slice
///
/// # Returns
///
/// `2 * tan(fov / 2) * distance`, the vertical extent visible at that depth.
pub fn frustum_height(fov_y_degrees: f32, distance: f32) -> f32 {
    2.0 * (deg_to_rad(fov_y_degrees) / 2.0).tan() * distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg_to_rad_wraps() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((deg_to_rad(540.0) - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_frustum_height_at_building_plane() {
        // 75 degree camera, buildings 400 units away
        let height = frustum_height(75.0, 400.0);
        assert!((height - 613.85).abs() < 0.05, "got {height}");
    }
}
