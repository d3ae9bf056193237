/// Least power of two greater than or equal to `x`. Zero clamps to 1.
pub fn nearest_power_of_two(x: usize) -> usize {
    x.max(1).next_power_of_two()
}

/// Smallest integer `r` with `r * r >= n`.
pub fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    // Float sqrt can land one off for large inputs.
    while root * root < n {
        root += 1;
    }
    while root > 0 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

/// Side of the square power-of-two grid able to hold `count` cells.
pub fn square_grid_side(count: usize) -> usize {
    nearest_power_of_two(ceil_sqrt(count))
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`. Returns 0 when `a == b`.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
