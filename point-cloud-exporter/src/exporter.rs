/// Export pipeline: load, generate, optionally displace, then bake and save.
use crate::laz;
use crate::manifest::{ExportFiles, ExportManifest};
use crate::obj_writer::{write_atlas_mtl, write_triangle_obj};
use glam::Vec3;
use indicatif::{ProgressBar, ProgressStyle};
use point_cloud_generator::{AffineFrame, GeneratorConfig, PointCloudGenerator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on simulated frames for one displacement window.
const MAX_DISPLACE_FRAMES: u64 = 1 << 20;

/// How the displacement pass is simulated before export.
#[derive(Debug, Clone)]
pub struct DisplaceOptions {
    /// Simulation frames per second of displacement.
    pub fps: f32,
    /// World position of the displacement target.
    pub target: Vec3,
    /// Seed for reproducible damping; entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// Drives a `PointCloudGenerator` the way an editor would: Generate, Displace, Export.
pub struct PointCloudExporter {
    /// Source point cloud file path.
    input_path: PathBuf,
    /// Output directory for generated files.
    output_dir: PathBuf,
    /// Programmatic output name derived from input filename.
    output_name: String,
    generator: PointCloudGenerator,
    /// World position of the loaded points' local origin.
    origin: [f64; 3],
}

impl PointCloudExporter {
    /// Creates the exporter and validates the configuration.
    /// Output defaults to the input file's directory.
    pub fn new(
        input_path: &Path,
        output_dir: Option<&Path>,
        config: GeneratorConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        fs::create_dir_all(&output_dir)?;

        let stem = input_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self {
            input_path: input_path.to_path_buf(),
            output_dir,
            output_name: generate_programmatic_name(&stem),
            generator: PointCloudGenerator::new(config)?,
            origin: [0.0; 3],
        })
    }

    /// Loads the point cloud and builds point chunks. Returns the chunk count.
    pub fn generate(&mut self) -> Result<usize, Box<dyn std::error::Error>> {
        let max_vertices = self.generator.config().max_vertices;
        let loaded = laz::load(&self.input_path, max_vertices)?;
        self.origin = loaded.origin;
        let chunks = self.generator.generate(loaded.cloud)?;
        Ok(chunks.len())
    }

    pub fn generator(&self) -> &PointCloudGenerator {
        &self.generator
    }

    /// Triggers displacement at t = 0 and steps at a fixed rate until the window closes.
    pub fn displace(&mut self, options: &DisplaceOptions) -> Result<usize, Box<dyn std::error::Error>> {
        if !(options.fps.is_finite() && options.fps > 0.0) {
            return Err(format!("fps must be positive, got {}", options.fps).into());
        }

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let frame = AffineFrame::identity();
        let target = AffineFrame::from_translation(options.target);
        let dt = 1.0 / options.fps;
        let duration = self.generator.config().displacement.duration;
        let frames = (duration as f64 * options.fps as f64).ceil();
        if frames > MAX_DISPLACE_FRAMES as f64 {
            return Err(format!(
                "{} fps over {}s needs {} frames, more than the {} allowed",
                options.fps, duration, frames, MAX_DISPLACE_FRAMES
            )
            .into());
        }
        let frames = frames as u64;

        let pb = ProgressBar::new(frames);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} frames ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Displacing points");

        self.generator.displace(0.0);
        let mut stepped = 0;
        for frame_index in 0..frames {
            let now = (frame_index as f64 / options.fps as f64) as f32;
            if !self.generator.tick(now, dt, &frame, Some(&target), &mut rng)? {
                break;
            }
            stepped += 1;
            pb.inc(1);
        }

        pb.finish_with_message("Displacement settled");
        Ok(stepped)
    }

    /// Bakes the current points and writes atlas, mesh, material and manifest.
    /// Returns the manifest path.
    pub fn export(&self, displaced: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let export = self.generator.export()?;

        let atlas_file = format!(
            "{}_atlas_{}x{}.png",
            self.output_name,
            export.atlas.width(),
            export.atlas.height()
        );
        let files = ExportFiles {
            mesh: format!("{}.obj", self.output_name),
            material: format!("{}.mtl", self.output_name),
        };

        let atlas_path = self.output_dir.join(&atlas_file);
        export.atlas.image.save(&atlas_path)?;
        log::info!("Saved {} (RGBA8 colour atlas)", atlas_path.display());

        write_atlas_mtl(&self.output_dir.join(&files.material), &atlas_file)?;
        let mesh_path = self.output_dir.join(&files.mesh);
        write_triangle_obj(&mesh_path, &files.material, &export.chunks)?;
        log::info!("Saved {} ({} triangles)", mesh_path.display(), export.atlas.triangle_count());

        let manifest = ExportManifest::new(
            &self.input_path,
            self.generator.config(),
            self.generator.chunks(),
            self.origin,
            &export,
            displaced,
            atlas_file,
            files,
        );
        let manifest_path = self
            .output_dir
            .join(format!("{}_manifest.json", self.output_name));
        manifest.save(&manifest_path)?;

        Ok(manifest_path)
    }
}

/// Generates programmatic filename from a file stem.
/// Converts underscore-separated names to PascalCase format.
pub fn generate_programmatic_name(input: &str) -> String {
    input
        .split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programmatic_name_is_pascal_case() {
        assert_eq!(generate_programmatic_name("street_scan-01"), "StreetScan01");
        assert_eq!(generate_programmatic_name("simon2"), "Simon2");
        assert_eq!(generate_programmatic_name("__a__b"), "AB");
    }

    #[test]
    fn output_defaults_to_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("my_cloud.laz");
        let exporter = PointCloudExporter::new(&input, None, GeneratorConfig::default()).unwrap();
        assert_eq!(exporter.output_dir, dir.path());
        assert_eq!(exporter.output_name, "MyCloud");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            point_size: 0.0,
            ..Default::default()
        };
        assert!(PointCloudExporter::new(&dir.path().join("a.laz"), None, config).is_err());
    }

    #[test]
    fn export_before_generate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            PointCloudExporter::new(&dir.path().join("a.laz"), None, GeneratorConfig::default())
                .unwrap();
        assert!(exporter.export(false).is_err());
    }

    #[test]
    fn oversized_displacement_window_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter =
            PointCloudExporter::new(&dir.path().join("a.laz"), None, GeneratorConfig::default())
                .unwrap();
        let options = DisplaceOptions {
            fps: 1.0e9,
            target: Vec3::ZERO,
            seed: Some(1),
        };
        assert!(exporter.displace(&options).is_err());
    }

    #[test]
    fn displaces_for_whole_window_and_records_origin() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("kerb_line.las");
        let mut builder = las::Builder::from((1, 2));
        let transform = las::Transform {
            scale: 0.01,
            offset: 0.0,
        };
        builder.transforms = las::Vector {
            x: transform,
            y: transform,
            z: transform,
        };
        let mut writer = las::Writer::from_path(&input, builder.into_header().unwrap()).unwrap();
        for i in 0..6 {
            writer
                .write_point(las::Point {
                    x: 300_000.0 + i as f64,
                    y: 6_000_000.0 + (i % 2) as f64,
                    z: 20.0 + (i % 3) as f64,
                    ..Default::default()
                })
                .unwrap();
        }
        writer.close().unwrap();

        let mut exporter = PointCloudExporter::new(&input, None, GeneratorConfig::default()).unwrap();
        assert_eq!(exporter.generate().unwrap(), 1);
        assert!((exporter.origin[0] - 300_002.5).abs() < 1e-6);
        assert!((exporter.origin[2] + 6_000_000.5).abs() < 1e-6);

        let frames = exporter
            .displace(&DisplaceOptions {
                fps: 10.0,
                target: Vec3::new(0.0, 0.0, 10.0),
                seed: Some(3),
            })
            .unwrap();
        assert_eq!(frames, 10);

        let manifest_path = exporter.export(true).unwrap();
        let manifest: crate::manifest::ExportManifest =
            serde_json::from_str(&fs::read_to_string(manifest_path).unwrap()).unwrap();
        assert_eq!(manifest.origin, exporter.origin);
        assert_eq!(manifest.point_count, 6);
    }
}
