/// Maximum vertices submitted per draw. Divisible by 3 so triangle chunks never split a face.
pub const VERTICES_PER_CHUNK: usize = 64998;

/// Default billboard radius, also used as the point sprite size.
pub const DEFAULT_POINT_SIZE: f32 = 0.1;

/// Points read from a cloud file unless the host asks for more
pub const DEFAULT_MAX_VERTICES: usize = 100_000;
