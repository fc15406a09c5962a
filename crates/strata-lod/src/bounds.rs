//! Axis-aligned chunk bounding volumes.

use glam::Vec3;

/// Axis-aligned box described by center and full size.
///
/// Fixed at chunk creation; distances are measured to its surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl ChunkBounds {
    /// Create bounds from a center point and full extents.
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            size: size.abs(),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Squared distance from `p` to the closest point of the box (0 inside).
    pub fn sqr_distance(&self, p: Vec3) -> f32 {
        let outside = (self.min() - p).max(p - self.max()).max(Vec3::ZERO);
        outside.length_squared()
    }

    /// Distance from `p` to the closest point of the box (0 inside).
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.sqr_distance(p).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_chunk() -> ChunkBounds {
        ChunkBounds::new(Vec3::new(5.0, 0.0, -5.0), Vec3::new(10.0, 4.0, 10.0))
    }

    #[test]
    fn test_inside_point_has_zero_distance() {
        let b = unit_chunk();
        assert_eq!(b.distance_to_point(Vec3::new(1.0, 0.0, -1.0)), 0.0);
    }

    #[test]
    fn test_distance_along_one_axis() {
        let b = unit_chunk();
        assert_eq!(b.distance_to_point(Vec3::new(13.0, 0.0, -5.0)), 3.0);
        assert_eq!(b.distance_to_point(Vec3::new(5.0, 0.0, 7.0)), 7.0);
    }

    #[test]
    fn test_distance_to_corner() {
        let b = unit_chunk();
        let d = b.distance_to_point(Vec3::new(13.0, 0.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_size_normalized() {
        let b = ChunkBounds::new(Vec3::ZERO, Vec3::new(-2.0, 2.0, 2.0));
        assert_eq!(b.min(), Vec3::splat(-1.0));
    }
}
