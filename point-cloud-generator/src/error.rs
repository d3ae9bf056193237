//! Error types for point cloud generation.
//!
//! Every fallible operation returns `GeneratorResult<T>`. Failures are deterministic
//! for a given input and leave previously installed chunks untouched.

use thiserror::Error;

/// Broad classification used by hosts to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller broke an operation contract; the operation was aborted.
    Precondition,
    /// Input was valid but too small to produce output (e.g. an empty palette).
    DegenerateInput,
    /// A configuration value is outside its valid range.
    Config,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Point cloud buffers disagree: {positions} positions, {normals} normals, {colours} colours")]
    InconsistentCloud {
        positions: usize,
        normals: usize,
        colours: usize,
    },

    #[error("Chunks hold {chunk_vertices} vertices but the point cloud has {cloud_vertices}")]
    ChunkCountMismatch {
        chunk_vertices: usize,
        cloud_vertices: usize,
    },

    #[error("Chunk {chunk} starts at vertex {found}, expected {expected}")]
    ChunkOffsetMismatch {
        chunk: usize,
        expected: usize,
        found: usize,
    },

    #[error("Chunk {chunk} does not hold whole triangles")]
    IncompleteTriangles { chunk: usize },

    #[error("No target frame bound for displacement")]
    MissingTarget,

    #[error("Normal of point {index} is parallel to the world up axis")]
    DegenerateNormal { index: usize },

    #[error("No point cloud has been generated")]
    NotGenerated,

    #[error("Nothing to bake: {0}")]
    DegenerateInput(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GeneratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeneratorError::InconsistentCloud { .. }
            | GeneratorError::ChunkCountMismatch { .. }
            | GeneratorError::ChunkOffsetMismatch { .. }
            | GeneratorError::IncompleteTriangles { .. }
            | GeneratorError::MissingTarget
            | GeneratorError::DegenerateNormal { .. }
            | GeneratorError::NotGenerated => ErrorKind::Precondition,
            GeneratorError::DegenerateInput(_) => ErrorKind::DegenerateInput,
            GeneratorError::InvalidConfig(_) => ErrorKind::Config,
        }
    }
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
