/// Point cloud coordinate bounds tracking
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl PointCloudBounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
        }
    }

    /// Bounds enclosing every position
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let mut bounds = Self::new();
        for position in positions {
            bounds.update(*position);
        }
        bounds
    }

    /// Update bounds with a new point
    pub fn update(&mut self, p: Vec3) {
        self.min = Vec3::from_array(self.min).min(p).to_array();
        self.max = Vec3::from_array(self.max).max(p).to_array();
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0]
    }

    pub fn centre(&self) -> Vec3 {
        (Vec3::from_array(self.min) + Vec3::from_array(self.max)) * 0.5
    }

    /// World space dimensions
    pub fn dimensions(&self) -> Vec3 {
        Vec3::from_array(self.max) - Vec3::from_array(self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_extremes() {
        let bounds = PointCloudBounds::from_positions(&[
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
        ]);
        assert_eq!(bounds.min, [-1.0, -2.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 4.0, 3.0]);
        assert_eq!(bounds.centre(), Vec3::new(0.0, 1.0, 1.5));
        assert_eq!(bounds.dimensions(), Vec3::new(2.0, 6.0, 3.0));
    }

    #[test]
    fn new_bounds_are_empty() {
        assert!(PointCloudBounds::new().is_empty());
    }
}
