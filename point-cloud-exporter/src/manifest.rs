/// Export manifest describing generated chunks, atlas and files.
use crate::bounds::PointCloudBounds;
use point_cloud_generator::{BakedExport, GeneratorConfig, GeometryChunk, Topology};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Layout of one geometry chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkInfo {
    /// Global index of the first vertex in the source buffer.
    pub first_vertex: usize,
    pub vertex_count: usize,
    pub topology: Topology,
}

impl From<&GeometryChunk> for ChunkInfo {
    fn from(chunk: &GeometryChunk) -> Self {
        Self {
            first_vertex: chunk.first_vertex,
            vertex_count: chunk.len(),
            topology: chunk.topology,
        }
    }
}

/// Colour atlas file and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasInfo {
    /// Atlas image filename (PNG, RGBA8).
    pub file: String,
    pub width: u32,
    pub height: u32,
    /// Swatch cells per row and column.
    pub columns: usize,
    pub cell_size: u32,
    /// Quantised swatch colours in atlas order.
    pub palette: Vec<[f32; 4]>,
}

/// Files written alongside the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFiles {
    /// Triangle mesh (Wavefront OBJ) sampling the atlas.
    pub mesh: String,
    /// Material library binding the atlas to the mesh.
    pub material: String,
}

/// Everything a renderer needs to reload an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Source point cloud file.
    pub source: String,
    /// Settings the export was produced with.
    pub config: GeneratorConfig,
    /// World position (Y-up) of the points' local origin; add it to re-place the mesh.
    pub origin: [f64; 3],
    /// Bounds of the (possibly displaced) points, relative to `origin`.
    pub bounds: PointCloudBounds,
    pub point_count: usize,
    pub triangle_count: usize,
    /// Whether a displacement pass ran before export.
    pub displaced: bool,
    pub point_chunks: Vec<ChunkInfo>,
    pub triangle_chunks: Vec<ChunkInfo>,
    pub atlas: AtlasInfo,
    pub files: ExportFiles,
}

impl ExportManifest {
    pub fn new(
        source: &Path,
        config: &GeneratorConfig,
        point_chunks: &[GeometryChunk],
        origin: [f64; 3],
        export: &BakedExport,
        displaced: bool,
        atlas_file: String,
        files: ExportFiles,
    ) -> Self {
        let positions: Vec<_> = point_chunks
            .iter()
            .flat_map(|chunk| chunk.positions.iter().copied())
            .collect();

        Self {
            source: source.display().to_string(),
            config: config.clone(),
            origin,
            bounds: PointCloudBounds::from_positions(&positions),
            point_count: positions.len(),
            triangle_count: export.atlas.triangle_count(),
            displaced,
            point_chunks: point_chunks.iter().map(ChunkInfo::from).collect(),
            triangle_chunks: export.chunks.iter().map(ChunkInfo::from).collect(),
            atlas: AtlasInfo {
                file: atlas_file,
                width: export.atlas.width(),
                height: export.atlas.height(),
                columns: export.atlas.columns,
                cell_size: export.atlas.cell_size,
                palette: export.atlas.palette.iter().map(|c| c.to_array()).collect(),
            },
            files,
        }
    }

    /// Writes the manifest as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}
