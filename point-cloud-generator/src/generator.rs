/// Host-driven point cloud generator
use crate::atlas::{ColorAtlas, ColorAtlasBaker};
use crate::chunker::{self, GeometryChunk, GeometryChunker, Topology};
use crate::config::GeneratorConfig;
use crate::displacement::{DisplacementEngine, DisplacementWindow, RandomSource};
use crate::error::{GeneratorError, GeneratorResult};
use crate::point_cloud::PointCloud;
use crate::transform::Frame;
use crate::triangles;

/// Per-tick values the host forwards to its point material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub point_size: f32,
}

/// Triangle geometry and colour atlas produced by an export.
#[derive(Debug, Clone)]
pub struct BakedExport {
    /// One triangle per source point, three vertices each.
    pub triangles: PointCloud,
    /// Triangle chunks with atlas UVs assigned.
    pub chunks: Vec<GeometryChunk>,
    pub atlas: ColorAtlas,
}

/// Owns a loaded cloud, its point chunks and the displacement window.
///
/// The host drives it explicitly: `generate` once per loaded cloud, `tick` every frame,
/// and `displace`, `reset` or `export` when the user asks. Calls must not overlap.
pub struct PointCloudGenerator {
    config: GeneratorConfig,
    points: Option<PointCloud>,
    chunks: Vec<GeometryChunk>,
    displacement: DisplacementEngine,
    window: DisplacementWindow,
}

impl PointCloudGenerator {
    pub fn new(config: GeneratorConfig) -> GeneratorResult<Self> {
        config.validate()?;
        let displacement = DisplacementEngine::new(config.displacement.clone());
        let window = DisplacementWindow::new(config.displacement.duration);

        Ok(Self {
            config,
            points: None,
            chunks: Vec::new(),
            displacement,
            window,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replaces the configuration. Existing chunks keep their layout until the next `generate`.
    pub fn set_config(&mut self, config: GeneratorConfig) -> GeneratorResult<()> {
        config.validate()?;
        self.displacement.set_params(config.displacement.clone());
        self.window.set_duration(config.displacement.duration);
        self.config = config;
        Ok(())
    }

    /// Chunks a freshly loaded cloud and takes ownership of it.
    pub fn generate(&mut self, cloud: PointCloud) -> GeneratorResult<&[GeometryChunk]> {
        let chunker = GeometryChunker::new(self.config.vertices_per_chunk, Topology::Points)?;
        let chunks = chunker.chunk(&cloud);

        log::info!(
            "Generated {} point chunks from {} vertices",
            chunks.len(),
            cloud.vertex_count()
        );

        self.chunks = chunks;
        self.points = Some(cloud);
        Ok(&self.chunks)
    }

    pub fn points(&self) -> Option<&PointCloud> {
        self.points.as_ref()
    }

    pub fn chunks(&self) -> &[GeometryChunk] {
        &self.chunks
    }

    pub fn material_params(&self) -> MaterialParams {
        MaterialParams {
            point_size: self.config.point_size,
        }
    }

    /// Opens (or restarts) the displacement window at `now` seconds.
    pub fn displace(&mut self, now: f32) {
        self.window.trigger(now);
        log::info!(
            "Displacement triggered at {:.3}s for {:.3}s",
            now,
            self.window.duration()
        );
    }

    pub fn is_displacing(&self, now: f32) -> bool {
        self.window.is_active(now)
    }

    /// Advances one frame. Returns whether the points moved.
    pub fn tick(
        &mut self,
        now: f32,
        dt: f32,
        frame: &dyn Frame,
        target: Option<&dyn Frame>,
        rng: &mut dyn RandomSource,
    ) -> GeneratorResult<bool> {
        if !self.window.is_active(now) {
            return Ok(false);
        }

        if let Err(e) = self.displacement.step(&mut self.chunks, dt, frame, target, rng) {
            log::warn!("Displacement step rejected: {}", e);
            return Err(e);
        }
        log::debug!("Displaced {} chunks by {:.4}s", self.chunks.len(), dt);
        Ok(true)
    }

    /// Moves every chunk vertex back to its loaded position.
    pub fn reset(&mut self) -> GeneratorResult<()> {
        let points = self.points.as_ref().ok_or(GeneratorError::NotGenerated)?;
        chunker::reset(&mut self.chunks, points)?;
        log::info!("Reset {} vertices", points.vertex_count());
        Ok(())
    }

    /// Expands the current (possibly displaced) points into billboards and bakes their colours.
    /// The point chunks are left as they are.
    pub fn export(&self) -> GeneratorResult<BakedExport> {
        let points = self.points.as_ref().ok_or(GeneratorError::NotGenerated)?;
        if points.is_empty() {
            log::warn!("Export requested for an empty point cloud");
            return Err(GeneratorError::DegenerateInput(
                "cannot export an empty point cloud",
            ));
        }

        let triangles = triangles::expand(points, self.config.point_size, &self.chunks)?;
        let chunker = GeometryChunker::new(self.config.vertices_per_chunk, Topology::Triangles)?;
        let mut chunks = chunker.chunk(&triangles);

        let baker = ColorAtlasBaker::new(self.config.baking.clone())?;
        let atlas = baker.bake(&mut chunks)?;

        log::info!(
            "Exported {} triangles in {} chunks",
            triangles.vertex_count() / 3,
            chunks.len()
        );

        Ok(BakedExport {
            triangles,
            chunks,
            atlas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::AffineFrame;
    use glam::{Vec3, Vec4};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cloud(count: usize) -> PointCloud {
        let positions = (0..count)
            .map(|i| Vec3::new(i as f32 * 0.1, (i % 7) as f32 * 0.3, (i % 3) as f32))
            .collect();
        let normals = (0..count)
            .map(|i| Vec3::new(1.0, (i as f32 * 0.5).sin(), 0.5).normalize())
            .collect();
        let colours = (0..count)
            .map(|i| Vec4::new((i % 4) as f32 / 4.0, 0.5, 0.5, 1.0))
            .collect();
        PointCloud::new(positions, normals, colours).unwrap()
    }

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            vertices_per_chunk: 6,
            ..Default::default()
        }
    }

    #[test]
    fn tick_is_idle_without_trigger() {
        let mut generator = PointCloudGenerator::new(small_config()).unwrap();
        generator.generate(cloud(10)).unwrap();
        let before = generator.chunks().to_vec();

        let moved = generator
            .tick(0.5, 0.1, &AffineFrame::identity(), None, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(!moved);
        assert_eq!(generator.chunks(), before.as_slice());
    }

    #[test]
    fn tick_requires_target_while_active() {
        let mut generator = PointCloudGenerator::new(small_config()).unwrap();
        generator.generate(cloud(10)).unwrap();
        generator.displace(0.0);

        let result = generator.tick(
            0.1,
            0.1,
            &AffineFrame::identity(),
            None,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(GeneratorError::MissingTarget)));
    }

    #[test]
    fn reset_before_generate_fails() {
        let mut generator = PointCloudGenerator::new(small_config()).unwrap();
        assert!(matches!(generator.reset(), Err(GeneratorError::NotGenerated)));
    }

    #[test]
    fn export_leaves_point_chunks_alone() {
        let mut generator = PointCloudGenerator::new(small_config()).unwrap();
        generator.generate(cloud(10)).unwrap();

        let export = generator.export().unwrap();
        assert_eq!(export.triangles.vertex_count(), 30);
        assert_eq!(export.atlas.triangle_count(), 10);
        assert_eq!(export.atlas.palette.len(), 4);
        assert!(export.chunks.iter().all(|c| c.topology == Topology::Triangles));
        assert!(export.chunks.iter().all(|c| c.uvs.len() == c.len()));
        assert_eq!(generator.chunks().len(), 2);
        assert!(generator.chunks().iter().all(|c| c.topology == Topology::Points));
    }

    #[test]
    fn export_of_empty_cloud_is_degenerate() {
        let mut generator = PointCloudGenerator::new(small_config()).unwrap();
        generator
            .generate(PointCloud::new(Vec::new(), Vec::new(), Vec::new()).unwrap())
            .unwrap();
        assert!(generator.chunks().is_empty());
        assert!(matches!(
            generator.export(),
            Err(GeneratorError::DegenerateInput(_))
        ));
    }

    #[test]
    fn material_params_follow_config() {
        let generator = PointCloudGenerator::new(GeneratorConfig {
            point_size: 0.4,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(generator.material_params().point_size, 0.4);
    }
}
