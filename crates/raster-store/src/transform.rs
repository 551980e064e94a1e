//! Affine geotransform between pixel indices and map coordinates.

use serde::{Deserialize, Serialize};

/// GDAL-style affine transform.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// `(col, row)` are measured from the top-left corner of the top-left pixel,
/// so the centre of pixel (0, 0) is at (0.5, 0.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform without rotation. `pixel_height` is negative for
    /// the usual top-down row order.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Build from GeoTIFF ModelPixelScale + ModelTiepoint values.
    pub fn from_scale_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        Some(Self::new(origin_x, origin_y, scale[0], -scale[1]))
    }

    /// Build from a row-major 4x4 GeoTIFF ModelTransformation matrix.
    pub fn from_model_transformation(t: &[f64]) -> Option<Self> {
        if t.len() < 16 {
            return None;
        }
        Some(Self {
            origin_x: t[3],
            origin_y: t[7],
            pixel_width: t[0],
            pixel_height: t[5],
            row_rotation: t[1],
            col_rotation: t[4],
        })
    }

    /// Map coordinates of a fractional pixel position.
    pub fn pixel_to_map(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Fractional pixel position of a map coordinate.
    ///
    /// Returns `None` when the transform is singular.
    pub fn map_to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (dx * self.pixel_height - dy * self.row_rotation) / det;
        let row = (dy * self.pixel_width - dx * self.col_rotation) / det;
        Some((col, row))
    }

    /// Integer pixel whose area contains the map coordinate.
    ///
    /// This is also the pixel with the nearest centre. Negative results mean
    /// the point lies before the first row or column.
    pub fn pixel_index(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let (col, row) = self.map_to_pixel(x, y)?;
        if !col.is_finite() || !row.is_finite() {
            return None;
        }
        Some((col.floor() as i64, row.floor() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenggeli() -> GeoTransform {
        GeoTransform::new(103.0, 39.0, 0.01, -0.01)
    }

    #[test]
    fn test_roundtrip_pixel_centre() {
        let gt = tenggeli();
        let (x, y) = gt.pixel_to_map(150.5, 50.5);
        let (col, row) = gt.map_to_pixel(x, y).unwrap();
        assert!((col - 150.5).abs() < 1e-9);
        assert!((row - 50.5).abs() < 1e-9);
        assert_eq!(gt.pixel_index(x, y), Some((150, 50)));
    }

    #[test]
    fn test_points_west_and_north_are_negative() {
        let gt = tenggeli();
        let (col, row) = gt.pixel_index(0.0, 0.0).unwrap();
        assert!(col < 0);
        assert!(row > 0);
        let (_, row) = gt.pixel_index(104.0, 40.0).unwrap();
        assert!(row < 0);
    }

    #[test]
    fn test_scale_tiepoint() {
        let gt =
            GeoTransform::from_scale_tiepoint(&[0.5, 0.25, 0.0], &[0.0, 0.0, 0.0, 10.0, 20.0, 0.0])
                .unwrap();
        assert_eq!(gt, GeoTransform::new(10.0, 20.0, 0.5, -0.25));
        assert!(GeoTransform::from_scale_tiepoint(&[0.5], &[0.0; 6]).is_none());
    }

    #[test]
    fn test_rotated_transform_inverts() {
        let gt = GeoTransform {
            origin_x: 100.0,
            origin_y: 40.0,
            pixel_width: 0.01,
            pixel_height: -0.01,
            row_rotation: 0.002,
            col_rotation: 0.001,
        };
        let (x, y) = gt.pixel_to_map(12.25, 7.75);
        let (col, row) = gt.map_to_pixel(x, y).unwrap();
        assert!((col - 12.25).abs() < 1e-9);
        assert!((row - 7.75).abs() < 1e-9);
    }

    #[test]
    fn test_singular_transform() {
        let gt = GeoTransform::new(0.0, 0.0, 0.0, -1.0);
        assert!(gt.map_to_pixel(1.0, 1.0).is_none());
    }
}
