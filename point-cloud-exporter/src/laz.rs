/// LAS/LAZ point cloud loading
use crate::bounds::PointCloudBounds;
use constants::coordinate_system::las_to_world;
use glam::{Vec3, Vec4};
use indicatif::{ProgressBar, ProgressStyle};
use las::Reader;
use point_cloud_generator::triangles::WORLD_UP;
use point_cloud_generator::{GeneratorError, PointCloud};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("Unsupported point cloud file (expected .las or .laz): {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid point cloud: {0}")]
    InvalidCloud(#[from] GeneratorError),
}

/// Tilt applied to normals that point straight along the world up axis.
const UP_AXIS_TILT: f32 = 0.01;

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
pub fn create_reader(file_path: &Path) -> Result<Reader, LoadError> {
    let is_las = file_path
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "las" || ext == "laz"
        })
        .unwrap_or(false);
    if !is_las {
        return Err(LoadError::UnsupportedFormat(file_path.to_path_buf()));
    }

    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

/// A loaded cloud in coordinates local to `origin`.
#[derive(Debug, Clone)]
pub struct LoadedCloud {
    pub cloud: PointCloud,
    /// World position (Y-up, f64) of the local origin. Adding it back re-places the points.
    pub origin: [f64; 3],
}

/// Centre of the header bounds in LAS space, zero when the header has no extent.
fn header_centre(bounds: &las::Bounds) -> [f64; 3] {
    let centre = |min: f64, max: f64| {
        let c = (min + max) * 0.5;
        if c.is_finite() { c } else { 0.0 }
    };
    [
        centre(bounds.min.x, bounds.max.x),
        centre(bounds.min.y, bounds.max.y),
        centre(bounds.min.z, bounds.max.z),
    ]
}

/// Loads at most `max_vertices` points, sampled evenly across the whole file.
/// Positions are recentred on the header bounds in f64 before narrowing to f32, then
/// converted to the Y-up world. Colours go to `[0, 1]` (white when absent) and normals
/// are estimated radially from the bounds centre.
pub fn load(file_path: &Path, max_vertices: usize) -> Result<LoadedCloud, LoadError> {
    let mut reader = create_reader(file_path)?;
    let total_points = reader.header().number_of_points() as usize;
    let [cx, cy, cz] = header_centre(&reader.header().bounds());

    let sampling_ratio = if total_points > max_vertices {
        max_vertices as f64 / total_points as f64
    } else {
        1.0
    };

    log::info!(
        "Loading {} ({} points, sampling ratio {:.3})",
        file_path.display(),
        total_points,
        sampling_ratio
    );

    let pb = ProgressBar::new(total_points as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Loading points");

    let capacity = total_points.min(max_vertices);
    let mut positions = Vec::with_capacity(capacity);
    let mut colours = Vec::with_capacity(capacity);
    let mut expected_loaded = 0.0;

    for (point_idx, point_result) in reader.points().enumerate() {
        expected_loaded += sampling_ratio;

        if point_idx % 50_000 == 0 {
            pb.set_position(point_idx as u64);
        }

        // Apply sampling to stay within the vertex budget.
        if positions.len() as f64 >= expected_loaded || positions.len() >= max_vertices {
            continue;
        }

        let point = point_result?;
        let [x, y, z] = las_to_world(point.x - cx, point.y - cy, point.z - cz);
        positions.push(Vec3::new(x as f32, y as f32, z as f32));
        colours.push(
            point
                .color
                .map(|c| {
                    Vec4::new(
                        c.red as f32 / 65535.0,
                        c.green as f32 / 65535.0,
                        c.blue as f32 / 65535.0,
                        1.0,
                    )
                })
                .unwrap_or(Vec4::ONE),
        );
    }

    pb.finish_with_message("Points loaded");

    let bounds = PointCloudBounds::from_positions(&positions);
    if bounds.is_empty() {
        log::warn!("No points loaded from {}", file_path.display());
    } else {
        log::info!(
            "Loaded {} points spanning {:.2?} m",
            positions.len(),
            bounds.dimensions()
        );
    }
    let normals = estimate_radial_normals(&positions, bounds.centre());

    Ok(LoadedCloud {
        cloud: PointCloud::new(positions, normals, colours)?,
        origin: las_to_world(cx, cy, cz),
    })
}

/// Outward normals from `centre`, kept off the world up axis so every point can be
/// expanded into a billboard.
pub fn estimate_radial_normals(positions: &[Vec3], centre: Vec3) -> Vec<Vec3> {
    positions
        .iter()
        .map(|p| {
            let normal = (*p - centre).try_normalize().unwrap_or(Vec3::Z);
            if WORLD_UP.cross(normal).length_squared() < 1e-6 {
                (normal + Vec3::Z * UP_AXIS_TILT).normalize()
            } else {
                normal
            }
        })
        .collect()
}
