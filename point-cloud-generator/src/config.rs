/// Runtime configuration for a point cloud generator
use crate::atlas::BakeParams;
use crate::displacement::DisplacementParams;
use crate::error::{GeneratorError, GeneratorResult};
use constants::render_settings::{DEFAULT_MAX_VERTICES, DEFAULT_POINT_SIZE, VERTICES_PER_CHUNK};
use serde::{Deserialize, Serialize};

/// Every recognised generator setting. Missing fields fall back to the shared defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Point sprite size, also the billboard radius on export.
    pub point_size: f32,
    /// Upper bound on points requested from the loader.
    pub max_vertices: usize,
    /// Vertex cap per geometry chunk.
    pub vertices_per_chunk: usize,
    pub displacement: DisplacementParams,
    pub baking: BakeParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            point_size: DEFAULT_POINT_SIZE,
            max_vertices: DEFAULT_MAX_VERTICES,
            vertices_per_chunk: VERTICES_PER_CHUNK,
            displacement: DisplacementParams::default(),
            baking: BakeParams::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> GeneratorResult<()> {
        if !self.point_size.is_finite() || self.point_size <= 0.0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "point_size must be positive, got {}",
                self.point_size
            )));
        }
        // Both point and triangle chunks are built with this cap.
        if self.vertices_per_chunk == 0 || self.vertices_per_chunk % 3 != 0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "vertices_per_chunk must be a positive multiple of 3, got {}",
                self.vertices_per_chunk
            )));
        }
        self.displacement.validate()?;
        self.baking.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vertices_per_chunk, 64998);
        assert_eq!(config.baking.quantization_levels, 32);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{ "point_size": 0.25, "displacement": { "speed": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.point_size, 0.25);
        assert_eq!(config.displacement.speed, 3.0);
        assert_eq!(config.displacement.duration, 1.0);
        assert_eq!(config.baking.cell_size, 32);
    }

    #[test]
    fn rejects_chunk_cap_not_divisible_by_three() {
        let config = GeneratorConfig {
            vertices_per_chunk: 65000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GeneratorError::InvalidConfig(_))
        ));
    }
}
