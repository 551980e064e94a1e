//! Grid data generators for tests.
//!
//! Row-major grids with row 0 at the north edge, matching the layout of
//! north-up composites.

/// NDVI gradient from bare sand in the north-west (-0.1) to sparse
/// vegetation in the south-east (0.5).
pub fn create_ndvi_gradient_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(-0.1 + (x_factor * 0.3) + (y_factor * 0.3));
        }
    }
    data
}

/// A uniform float grid.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Counting grid, `0, 1, 2, ...` in row-major order.
pub fn create_sequential_grid(width: usize, height: usize) -> Vec<f32> {
    (0..width * height).map(|i| i as f32).collect()
}

/// Byte-scaled NDVI (`v / 255 * 2 - 1`) with a zero (nodata) border.
pub fn create_byte_ndvi_grid(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let edge = row == 0 || col == 0 || row + 1 == height || col + 1 == width;
            if edge {
                data.push(0);
            } else {
                data.push((128 + ((row + col) % 100)) as u8);
            }
        }
    }
    data
}

/// Inserts `value` at every `interval`-th position, simulating gaps.
pub fn with_gaps(mut data: Vec<f32>, interval: usize, value: f32) -> Vec<f32> {
    if interval == 0 {
        return data;
    }
    for i in (0..data.len()).step_by(interval) {
        data[i] = value;
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_in_ndvi_range() {
        let grid = create_ndvi_gradient_grid(10, 10);
        assert_eq!(grid.len(), 100);
        assert!(grid.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert!(grid[0] < grid[99]);
    }

    #[test]
    fn test_sequential_grid() {
        assert_eq!(create_sequential_grid(2, 2), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_byte_grid_border_is_zero() {
        let grid = create_byte_ndvi_grid(4, 4);
        assert_eq!(grid[0], 0);
        assert_eq!(grid[3], 0);
        assert_ne!(grid[5], 0);
    }

    #[test]
    fn test_with_gaps() {
        let grid = with_gaps(create_constant_grid(5, 1, 0.2), 2, f32::NAN);
        assert!(grid[0].is_nan());
        assert_eq!(grid[1], 0.2);
        assert!(grid[4].is_nan());
    }
}
