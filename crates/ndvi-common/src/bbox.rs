//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// Geographic extent of the Tenggeli Desert composites (degrees, EPSG:4326).
pub const TENGGELI_REGION: BoundingBox = BoundingBox {
    min_x: 103.0,
    min_y: 37.5,
    max_x: 105.2,
    max_y: 39.0,
};

/// A geographic bounding box in degrees.
///
/// `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a "west,south,east,north" string.
    pub fn from_query_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            let v: f64 = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
            if !v.is_finite() {
                return Err(BboxParseError::InvalidNumber(part.to_string()));
            }
            *slot = v;
        }

        let bbox = Self::new(values[0], values[1], values[2], values[3]);
        if bbox.min_x >= bbox.max_x || bbox.min_y >= bbox.max_y {
            return Err(BboxParseError::Degenerate(s.to_string()));
        }
        Ok(bbox)
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Centre point as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Centre of cell (row, col) when the box is split into `rows` x `cols`
    /// equal cells. Row 0 is the northern edge. Returns (lon, lat).
    pub fn cell_center(&self, rows: usize, cols: usize, row: usize, col: usize) -> (f64, f64) {
        let cell_w = self.width() / cols as f64;
        let cell_h = self.height() / rows as f64;
        (
            self.min_x + (col as f64 + 0.5) * cell_w,
            self.max_y - (row as f64 + 0.5) * cell_h,
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),

    #[error("Bbox has no area: {0}")]
    Degenerate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_center() {
        let (lon, lat) = TENGGELI_REGION.center();
        assert!((lon - 104.1).abs() < 1e-9);
        assert!((lat - 38.25).abs() < 1e-9);
    }

    #[test]
    fn test_cell_center_corners() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bbox.cell_center(2, 2, 0, 0), (2.5, 7.5));
        assert_eq!(bbox.cell_center(2, 2, 1, 1), (7.5, 2.5));
    }
}
