//! Shared defaults for point cloud chunking, displacement and colour baking.

pub mod baking;
pub mod coordinate_system;
pub mod displacement;
pub mod render_settings;
