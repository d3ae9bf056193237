/// Buckets per colour channel when merging near-identical triangle colours
pub const DEFAULT_QUANTIZATION_LEVELS: u32 = 32;

/// Edge length in pixels of one swatch cell in the colour atlas
pub const DEFAULT_CELL_SIZE: u32 = 32;

/// Swatch disc centre in cell-normalised coordinates (v grows upward)
pub const SWATCH_ANCHOR: [f32; 2] = [0.5, 0.3];

/// Distance from the anchor where the swatch starts fading out
pub const SWATCH_FALLOFF_INNER: f32 = 0.2;

/// Distance from the anchor where the swatch is fully transparent
pub const SWATCH_FALLOFF_OUTER: f32 = 0.35;
