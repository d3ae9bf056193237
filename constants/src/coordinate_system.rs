/// LAS to world basis (row-major: [x_new, y_new, z_new]).
/// LAS files are Z-up; the generator works in a Y-up world.
pub const LAS_TO_WORLD: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],  // X = X
    [0.0, 0.0, 1.0],  // Y = Z
    [0.0, -1.0, 0.0], // Z = -Y
];

/// Maps a LAS coordinate into the Y-up world basis.
pub fn las_to_world(x: f64, y: f64, z: f64) -> [f64; 3] {
    let input = [x, y, z];
    let mut output = [0.0; 3];

    for (row, out) in LAS_TO_WORLD.iter().zip(output.iter_mut()) {
        *out = row.iter().zip(input.iter()).map(|(m, v)| m * v).sum();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn las_up_axis_becomes_world_up() {
        assert_eq!(las_to_world(0.0, 0.0, 2.0), [0.0, 2.0, 0.0]);
        assert_eq!(las_to_world(1.0, 3.0, 0.0), [1.0, 0.0, -3.0]);
    }
}
