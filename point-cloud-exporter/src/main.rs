/// Point cloud to billboard mesh and colour atlas exporter
mod bounds;
mod exporter;
mod laz;
mod manifest;
mod obj_writer;

use clap::{Parser, Subcommand};
use exporter::{DisplaceOptions, PointCloudExporter};
use glam::Vec3;
use point_cloud_generator::{GeneratorConfig, GeometryChunk};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "point-cloud-exporter")]
#[command(version, about = "Chunk, displace and bake LAS/LAZ point clouds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake a point cloud into a triangle mesh with a colour atlas.
    Export {
        /// Input .las or .laz file.
        input: PathBuf,

        /// Generator settings (JSON); defaults are used for missing fields.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (defaults to the input's directory).
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Override the maximum number of points to load.
        #[arg(long)]
        max_points: Option<usize>,

        /// Run one displacement window before exporting.
        #[arg(long)]
        displace: bool,

        /// Simulation rate for the displacement window.
        #[arg(long, default_value_t = 30.0)]
        fps: f32,

        /// Displacement target position as x,y,z.
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
        target: Vec3,

        /// Seed for reproducible displacement.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the chunk layout a point cloud would produce.
    Inspect {
        /// Input .las or .laz file.
        input: PathBuf,

        /// Generator settings (JSON).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the maximum number of points to load.
        #[arg(long)]
        max_points: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export {
            input,
            config,
            output_dir,
            max_points,
            displace,
            fps,
            target,
            seed,
        } => {
            let config = load_config(config.as_deref(), max_points)?;
            let mut exporter = PointCloudExporter::new(&input, output_dir.as_deref(), config)?;
            exporter.generate()?;

            if displace {
                let frames = exporter.displace(&DisplaceOptions { fps, target, seed })?;
                log::info!("Displaced over {} frames", frames);
            }

            let manifest = exporter.export(displace)?;
            println!("Export complete: {}", manifest.display());
        }
        Commands::Inspect {
            input,
            config,
            max_points,
        } => {
            let config = load_config(config.as_deref(), max_points)?;
            let mut exporter = PointCloudExporter::new(&input, None, config)?;
            exporter.generate()?;
            print_chunks(exporter.generator().chunks());
        }
    }

    Ok(())
}

/// Reads generator settings, applying a command-line point limit on top.
fn load_config(
    path: Option<&Path>,
    max_points: Option<usize>,
) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GeneratorConfig::default(),
    };
    if let Some(max_points) = max_points {
        config.max_vertices = max_points;
    }
    config.validate()?;
    Ok(config)
}

fn print_chunks(chunks: &[GeometryChunk]) {
    let total: usize = chunks.iter().map(GeometryChunk::len).sum();
    println!("{} vertices in {} chunks", total, chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        println!(
            "  chunk {}: vertices {}..{} ({})",
            index,
            chunk.first_vertex,
            chunk.first_vertex + chunk.len(),
            chunk.len()
        );
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got '{s}'")),
    }
}
