/// In-memory point cloud as produced by a loader
use crate::error::{GeneratorError, GeneratorResult};
use glam::{Vec3, Vec4};

/// Linear RGBA colour with channels in `[0, 1]`.
pub type Rgba = Vec4;

/// Parallel position, normal and colour buffers. Index `i` is the same point in all three.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colours: Vec<Rgba>,
}

impl PointCloud {
    /// Builds a cloud, rejecting buffers of different lengths.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, colours: Vec<Rgba>) -> GeneratorResult<Self> {
        if positions.len() != normals.len() || positions.len() != colours.len() {
            return Err(GeneratorError::InconsistentCloud {
                positions: positions.len(),
                normals: normals.len(),
                colours: colours.len(),
            });
        }

        Ok(Self {
            positions,
            normals,
            colours,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colours(&self) -> &[Rgba] {
        &self.colours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffers() {
        let result = PointCloud::new(vec![Vec3::ZERO; 2], vec![Vec3::Z; 2], vec![Vec4::ONE; 1]);
        assert!(matches!(
            result,
            Err(GeneratorError::InconsistentCloud {
                positions: 2,
                normals: 2,
                colours: 1
            })
        ));
    }

    #[test]
    fn empty_cloud_is_valid() {
        let cloud = PointCloud::new(Vec::new(), Vec::new(), Vec::new()).unwrap();
        assert_eq!(cloud.vertex_count(), 0);
        assert!(cloud.is_empty());
    }
}
