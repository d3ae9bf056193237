/// Point to triangle billboard expansion
use crate::chunker::{GeometryChunk, total_vertices};
use crate::error::{GeneratorError, GeneratorResult};
use crate::point_cloud::PointCloud;
use glam::Vec3;

/// Reference axis for building each billboard's tangent frame.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Normals closer to `WORLD_UP` than this (by squared cross length) have no usable tangent.
const DEGENERATE_EPSILON: f32 = 1e-12;

/// Turns each point into one triangle of the given radius facing along its normal.
///
/// Centres come from the chunk buffers so displaced positions are kept; normals and
/// colours come from `cloud`. The result holds three vertices per point in chunk order.
pub fn expand(cloud: &PointCloud, radius: f32, chunks: &[GeometryChunk]) -> GeneratorResult<PointCloud> {
    let chunk_vertices = total_vertices(chunks);
    if chunk_vertices != cloud.vertex_count() {
        return Err(GeneratorError::ChunkCountMismatch {
            chunk_vertices,
            cloud_vertices: cloud.vertex_count(),
        });
    }

    let vertex_count = cloud.vertex_count() * 3;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut colours = Vec::with_capacity(vertex_count);

    let centres = chunks.iter().flat_map(|chunk| chunk.positions.iter());
    for (index, ((centre, normal), colour)) in centres
        .zip(cloud.normals())
        .zip(cloud.colours())
        .enumerate()
    {
        let [left, top, right] = billboard(*centre, *normal, radius)
            .ok_or(GeneratorError::DegenerateNormal { index })?;

        positions.extend([left, top, right]);
        normals.extend([*normal; 3]);
        colours.extend([*colour; 3]);
    }

    PointCloud::new(positions, normals, colours)
}

/// Triangle corners `[left, top, right]` for one point, or `None` for a degenerate normal.
pub fn billboard(centre: Vec3, normal: Vec3, radius: f32) -> Option<[Vec3; 3]> {
    let cross = WORLD_UP.cross(normal);
    if cross.length_squared() <= DEGENERATE_EPSILON {
        return None;
    }

    let tangent = cross.normalize();
    let up = tangent.cross(normal).normalize();
    let half_width = radius / 1.5;

    Some([
        centre - tangent * half_width,
        centre + up * radius,
        centre + tangent * half_width,
    ])
}
