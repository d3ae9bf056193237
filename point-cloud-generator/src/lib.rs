//! Point cloud chunking, displacement and colour-atlas baking.
//!
//! A loaded [`PointCloud`] is split into draw-sized [`GeometryChunk`]s, optionally
//! animated with a noise-driven displacement, and exported as triangle billboards whose
//! colours are baked into a swatch atlas. [`PointCloudGenerator`] ties the stages
//! together for a host loop.

pub mod atlas;
pub mod chunker;
pub mod config;
pub mod displacement;
pub mod error;
pub mod generator;
pub mod math;
#[cfg(feature = "bevy")]
pub mod mesh;
pub mod point_cloud;
pub mod transform;
pub mod triangles;

pub use atlas::{BakeParams, ColorAtlas, ColorAtlasBaker};
pub use chunker::{GeometryChunk, GeometryChunker, LightmapGrid, Topology};
pub use config::GeneratorConfig;
pub use displacement::{DisplacementEngine, DisplacementParams, DisplacementWindow, RandomSource};
pub use error::{ErrorKind, GeneratorError, GeneratorResult};
pub use generator::{BakedExport, MaterialParams, PointCloudGenerator};
pub use point_cloud::{PointCloud, Rgba};
pub use transform::{AffineFrame, Frame};
