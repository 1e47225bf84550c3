//! Box geometry description.
//!
//! A [`BoxGeometry`] is the CPU-side description of an axis-aligned box centred
//! on its local origin. Backends turn it into GPU buffers; the edge overlay is
//! derived from the same dimensions.

use crate::math::Vec3;

/// Dimensions of an axis-aligned box centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Same footprint, different height.
    pub fn with_height(&self, height: f32) -> Self {
        Self { height, ..*self }
    }

    /// The eight corners, bottom face first, counter-clockwise seen from above.
    pub fn corners(&self) -> [Vec3; 8] {
        let (hx, hy, hz) = (self.width / 2.0, self.height / 2.0, self.depth / 2.0);
        [
            Vec3::new(-hx, -hy, -hz),
            Vec3::new(hx, -hy, -hz),
            Vec3::new(hx, -hy, hz),
            Vec3::new(-hx, -hy, hz),
            Vec3::new(-hx, hy, -hz),
            Vec3::new(hx, hy, -hz),
            Vec3::new(hx, hy, hz),
            Vec3::new(-hx, hy, hz),
        ]
    }

    /// Corner index pairs for the twelve edges of the box.
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_span_dimensions() {
        let geometry = BoxGeometry::new(50.0, 10.0, 40.0);
        let corners = geometry.corners();
        let max_y = corners.iter().map(|c| c.y()).fold(f32::MIN, f32::max);
        let min_y = corners.iter().map(|c| c.y()).fold(f32::MAX, f32::min);
        assert_eq!(max_y - min_y, 10.0);
        assert_eq!(corners[6], Vec3::new(25.0, 5.0, 20.0));
    }

    #[test]
    fn test_with_height_keeps_footprint() {
        let geometry = BoxGeometry::new(45.0, 1.0, 45.0).with_height(300.0);
        assert_eq!(geometry, BoxGeometry::new(45.0, 300.0, 45.0));
    }
}
