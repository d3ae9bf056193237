/// Fraction of the normal-noise band allowed to move (0 = nothing moves, 1 = everything)
pub const DEFAULT_SHOULD_MOVE_THRESHOLD: f32 = 0.5;

/// Seconds a displacement trigger stays active
pub const DEFAULT_DURATION: f32 = 1.0;

pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_NOISE_SCALE: f32 = 1.0;
pub const DEFAULT_NOISE_SPEED: f32 = 1.0;
pub const DEFAULT_TARGET_SPEED: f32 = 1.0;

/// Blend between no damping and a fully random per-vertex damping factor
pub const DEFAULT_NOISY_AMOUNT: f32 = 0.1;

pub const DEFAULT_NOISE_SEED: u32 = 0;
