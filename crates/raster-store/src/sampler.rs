//! Grid sampling over one or more months.
//!
//! Composites are loaded by a fixed-size pool of `read_concurrency` tasks;
//! frames come back in the order the periods were given.

use futures::stream::{self, StreamExt, TryStreamExt};
use ndvi_common::{BoundingBox, GeoPoint, NdviError, NdviResult, YearMonth};
use serde::Serialize;
use tracing::info;

use crate::store::RasterStore;

/// Largest grid edge, in cells.
pub const MAX_GRID_CELLS_PER_SIDE: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub ndvi_value: Option<f64>,
}

/// All cells of the grid for one month, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridFrame {
    pub year: i32,
    pub month: u32,
    pub date: String,
    pub cells: Vec<GridCell>,
}

/// A rows x cols grid of cell centres over a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub bbox: BoundingBox,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    pub fn new(bbox: BoundingBox, rows: usize, cols: usize) -> NdviResult<Self> {
        for (name, n) in [("rows", rows), ("cols", cols)] {
            if !(1..=MAX_GRID_CELLS_PER_SIDE).contains(&n) {
                return Err(NdviError::invalid(
                    name,
                    format!("Must be between 1 and {}", MAX_GRID_CELLS_PER_SIDE),
                ));
            }
        }
        Ok(Self { bbox, rows, cols })
    }

    /// Cell centres, row-major from the north-west corner.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, GeoPoint)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| {
                let (lon, lat) = self.bbox.cell_center(self.rows, self.cols, row, col);
                (row, col, GeoPoint::new(lat, lon))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RasterStore {
    /// Sample `grid` in each of `periods`.
    ///
    /// Every period must have a composite; the first missing one fails the
    /// request with `NotFound`.
    pub async fn sample_grid(
        &self,
        grid: GridSpec,
        periods: Vec<YearMonth>,
    ) -> NdviResult<Vec<GridFrame>> {
        let index = self.file_index().await?;
        let concurrency = self.config().read_concurrency.max(1);
        info!(
            cells = grid.len(),
            periods = periods.len(),
            concurrency,
            "Sampling NDVI grid"
        );

        let index = &index;
        let grid = &grid;
        stream::iter(periods)
            .map(|period| async move {
                let raster = self.open_indexed(index, period).await?;
                let cells = grid
                    .cells()
                    .map(|(row, col, point)| GridCell {
                        row,
                        col,
                        latitude: point.latitude,
                        longitude: point.longitude,
                        ndvi_value: raster.sample(point),
                    })
                    .collect();
                Ok::<_, NdviError>(GridFrame {
                    year: period.year,
                    month: period.month,
                    date: period.date_string(),
                    cells,
                })
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_common::TENGGELI_REGION;

    #[test]
    fn test_grid_limits() {
        assert!(GridSpec::new(TENGGELI_REGION, 15, 15).is_ok());
        assert!(GridSpec::new(TENGGELI_REGION, 0, 5).is_err());
        assert!(GridSpec::new(TENGGELI_REGION, 5, 16).is_err());
    }

    #[test]
    fn test_cells_row_major() {
        let grid = GridSpec::new(BoundingBox::new(0.0, 0.0, 3.0, 2.0), 2, 3).unwrap();
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!((cells[0].0, cells[0].1), (0, 0));
        assert_eq!((cells[5].0, cells[5].1), (1, 2));
        // Row 0 is the northern row.
        assert_eq!(cells[0].2, GeoPoint::new(1.5, 0.5));
        assert_eq!(cells[5].2, GeoPoint::new(0.5, 2.5));
    }
}
