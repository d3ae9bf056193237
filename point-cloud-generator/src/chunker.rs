/// Partitioning of point clouds into fixed-capacity geometry buffers
use crate::error::{GeneratorError, GeneratorResult};
use crate::math::square_grid_side;
use crate::point_cloud::{PointCloud, Rgba};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Primitive assembly for a chunk's index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Points,
    Triangles,
}

/// Square raster shared by every chunk of one cloud.
/// Global vertex `v` maps to cell `(v mod resolution, v / resolution)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightmapGrid {
    pub resolution: usize,
}

impl LightmapGrid {
    /// Grid sized from the total vertex count, never from a single chunk.
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        Self {
            resolution: square_grid_side(vertex_count),
        }
    }

    /// Normalised lower-left corner of the cell owned by a global vertex index.
    pub fn uv(&self, vertex_index: usize) -> Vec2 {
        let x = (vertex_index % self.resolution) as f32;
        let y = (vertex_index / self.resolution) as f32;
        Vec2::new(x, y) / self.resolution as f32
    }
}

/// One draw-sized slice of a point cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryChunk {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colours: Vec<Rgba>,
    /// Identity index buffer `0..len`.
    pub indices: Vec<u32>,
    pub topology: Topology,
    /// Secondary UVs from the shared lightmap grid.
    pub lightmap_uvs: Vec<Vec2>,
    /// Colour atlas UVs, empty until a bake assigns them.
    pub uvs: Vec<Vec2>,
    /// Global index of this chunk's first vertex in the source cloud.
    pub first_vertex: usize,
}

impl GeometryChunk {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Global vertex range this chunk was sliced from.
    pub fn global_range(&self) -> std::ops::Range<usize> {
        self.first_vertex..self.first_vertex + self.len()
    }
}

/// Splits clouds into chunks holding at most `capacity` vertices.
#[derive(Debug, Clone, Copy)]
pub struct GeometryChunker {
    capacity: usize,
    topology: Topology,
}

impl GeometryChunker {
    pub fn new(capacity: usize, topology: Topology) -> GeneratorResult<Self> {
        if capacity == 0 {
            return Err(GeneratorError::InvalidConfig(
                "vertices per chunk must be positive".into(),
            ));
        }
        if topology == Topology::Triangles && capacity % 3 != 0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "triangle chunks need a capacity divisible by 3, got {capacity}"
            )));
        }

        Ok(Self { capacity, topology })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Number of chunks a cloud of `vertex_count` points produces.
    pub fn chunk_count(&self, vertex_count: usize) -> usize {
        vertex_count.div_ceil(self.capacity)
    }

    /// Chunks a cloud using a lightmap grid sized from its full vertex count.
    pub fn chunk(&self, cloud: &PointCloud) -> Vec<GeometryChunk> {
        let grid = LightmapGrid::for_vertex_count(cloud.vertex_count());
        self.chunk_with_grid(cloud, &grid)
    }

    /// Chunks a cloud with a caller-supplied grid shared across all chunks.
    pub fn chunk_with_grid(&self, cloud: &PointCloud, grid: &LightmapGrid) -> Vec<GeometryChunk> {
        let vertex_count = cloud.vertex_count();
        let mesh_count = self.chunk_count(vertex_count);
        let mut chunks = Vec::with_capacity(mesh_count);

        for mesh_index in 0..mesh_count {
            let start = mesh_index * self.capacity;
            // Exact multiples of the capacity keep a full final chunk.
            let count = self.capacity.min(vertex_count - start);
            let range = start..start + count;

            let lightmap_uvs = range.clone().map(|vertex| grid.uv(vertex)).collect();

            chunks.push(GeometryChunk {
                positions: cloud.positions()[range.clone()].to_vec(),
                normals: cloud.normals()[range.clone()].to_vec(),
                colours: cloud.colours()[range].to_vec(),
                indices: (0..count as u32).collect(),
                topology: self.topology,
                lightmap_uvs,
                uvs: Vec::new(),
                first_vertex: start,
            });
        }

        log::debug!(
            "Chunked {} vertices into {} {:?} chunks (capacity {}, lightmap {}x{})",
            vertex_count,
            chunks.len(),
            self.topology,
            self.capacity,
            grid.resolution,
            grid.resolution
        );

        chunks
    }
}

/// Total vertices held by a chunk set.
pub fn total_vertices(chunks: &[GeometryChunk]) -> usize {
    chunks.iter().map(GeometryChunk::len).sum()
}

/// Checks that chunks tile `0..vertex_count` contiguously in creation order.
pub fn validate_layout(chunks: &[GeometryChunk], vertex_count: usize) -> GeneratorResult<()> {
    let chunk_vertices = total_vertices(chunks);
    if chunk_vertices != vertex_count {
        return Err(GeneratorError::ChunkCountMismatch {
            chunk_vertices,
            cloud_vertices: vertex_count,
        });
    }

    let mut expected = 0;
    for (chunk_index, chunk) in chunks.iter().enumerate() {
        if chunk.first_vertex != expected {
            return Err(GeneratorError::ChunkOffsetMismatch {
                chunk: chunk_index,
                expected,
                found: chunk.first_vertex,
            });
        }
        expected += chunk.len();
    }

    Ok(())
}

/// Restores every chunk position from the cloud it was built from.
/// Nothing is written unless the chunk layout matches the cloud exactly.
pub fn reset(chunks: &mut [GeometryChunk], original: &PointCloud) -> GeneratorResult<()> {
    validate_layout(chunks, original.vertex_count())?;

    for chunk in chunks.iter_mut() {
        let range = chunk.global_range();
        chunk.positions.copy_from_slice(&original.positions()[range]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn line_cloud(count: usize) -> PointCloud {
        let positions = (0..count).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        PointCloud::new(positions, vec![Vec3::Z; count], vec![Vec4::ONE; count]).unwrap()
    }

    fn sizes(chunks: &[GeometryChunk]) -> Vec<usize> {
        chunks.iter().map(GeometryChunk::len).collect()
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(GeometryChunker::new(0, Topology::Points).is_err());
    }

    #[test]
    fn triangle_capacity_must_be_divisible_by_three() {
        assert!(GeometryChunker::new(10, Topology::Triangles).is_err());
        assert!(GeometryChunker::new(9, Topology::Triangles).is_ok());
    }

    #[test]
    fn splits_with_partial_last_chunk() {
        let chunker = GeometryChunker::new(4, Topology::Points).unwrap();
        let chunks = chunker.chunk(&line_cloud(10));
        assert_eq!(sizes(&chunks), vec![4, 4, 2]);
        assert_eq!(chunks[2].first_vertex, 8);
        assert_eq!(chunks[2].positions[1], Vec3::new(9.0, 0.0, 0.0));
    }

    #[test]
    fn exact_multiple_keeps_full_last_chunk() {
        let chunker = GeometryChunker::new(5, Topology::Points).unwrap();
        let chunks = chunker.chunk(&line_cloud(10));
        assert_eq!(sizes(&chunks), vec![5, 5]);
    }

    #[test]
    fn single_chunk_when_under_capacity() {
        let chunker = GeometryChunker::new(64, Topology::Points).unwrap();
        let chunks = chunker.chunk(&line_cloud(7));
        assert_eq!(sizes(&chunks), vec![7]);
        assert_eq!(chunks[0].indices, (0..7).collect::<Vec<u32>>());
    }

    #[test]
    fn empty_cloud_yields_no_chunks() {
        let chunker = GeometryChunker::new(64, Topology::Points).unwrap();
        assert!(chunker.chunk(&line_cloud(0)).is_empty());
    }

    #[test]
    fn indices_are_local_identity() {
        let chunker = GeometryChunker::new(3, Topology::Points).unwrap();
        for chunk in chunker.chunk(&line_cloud(8)) {
            let expected: Vec<u32> = (0..chunk.len() as u32).collect();
            assert_eq!(chunk.indices, expected);
        }
    }

    #[test]
    fn lightmap_uvs_follow_global_index() {
        // 10 points -> ceil(sqrt(10)) = 4 -> resolution 4
        let chunker = GeometryChunker::new(3, Topology::Points).unwrap();
        let chunks = chunker.chunk(&line_cloud(10));
        let uvs: Vec<Vec2> = chunks.iter().flat_map(|c| c.lightmap_uvs.clone()).collect();

        assert_eq!(uvs[0], Vec2::new(0.0, 0.0));
        assert_eq!(uvs[3], Vec2::new(0.75, 0.0));
        assert_eq!(uvs[4], Vec2::new(0.0, 0.25));
        assert_eq!(uvs[9], Vec2::new(0.25, 0.5));
    }

    #[test]
    fn lightmap_uvs_do_not_depend_on_capacity() {
        let cloud = line_cloud(37);
        let small = GeometryChunker::new(5, Topology::Points).unwrap().chunk(&cloud);
        let large = GeometryChunker::new(100, Topology::Points).unwrap().chunk(&cloud);

        let flatten = |chunks: &[GeometryChunk]| -> Vec<Vec2> {
            chunks.iter().flat_map(|c| c.lightmap_uvs.clone()).collect()
        };
        assert_eq!(flatten(&small), flatten(&large));
    }

    #[test]
    fn reset_restores_positions() {
        let cloud = line_cloud(7);
        let chunker = GeometryChunker::new(3, Topology::Points).unwrap();
        let mut chunks = chunker.chunk(&cloud);
        for chunk in &mut chunks {
            for p in &mut chunk.positions {
                *p += Vec3::ONE;
            }
        }

        reset(&mut chunks, &cloud).unwrap();
        let restored: Vec<Vec3> = chunks.iter().flat_map(|c| c.positions.clone()).collect();
        assert_eq!(restored, cloud.positions());
    }

    #[test]
    fn reset_rejects_foreign_cloud_without_writing() {
        let chunker = GeometryChunker::new(3, Topology::Points).unwrap();
        let mut chunks = chunker.chunk(&line_cloud(7));
        chunks[0].positions[0] = Vec3::splat(42.0);

        let err = reset(&mut chunks, &line_cloud(8)).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::ChunkCountMismatch {
                chunk_vertices: 7,
                cloud_vertices: 8
            }
        ));
        assert_eq!(chunks[0].positions[0], Vec3::splat(42.0));
    }

    #[test]
    fn reset_rejects_reordered_chunks() {
        let cloud = line_cloud(6);
        let chunker = GeometryChunker::new(3, Topology::Points).unwrap();
        let mut chunks = chunker.chunk(&cloud);
        chunks.swap(0, 1);

        assert!(matches!(
            reset(&mut chunks, &cloud),
            Err(GeneratorError::ChunkOffsetMismatch { chunk: 0, .. })
        ));
    }
}
