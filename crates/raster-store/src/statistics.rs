//! Whole-raster summary statistics.

use ndvi_common::{NdviError, NdviResult, YearMonth};
use rayon::prelude::*;
use serde::Serialize;

use crate::geotiff::RasterComposite;
use crate::store::RasterStore;

/// Statistics over the valid (non-nodata) pixels of one composite.
///
/// `std` is the population standard deviation. A composite without valid
/// pixels reports `count == 0` and `None` everywhere else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RasterStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub count: usize,
}

#[derive(Clone, Copy)]
struct Partial {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Partial {
    const EMPTY: Partial = Partial {
        count: 0,
        sum: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn add(mut self, v: f64) -> Self {
        self.count += 1;
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self
    }

    fn merge(self, other: Partial) -> Self {
        Partial {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl RasterStatistics {
    /// Compute statistics over every valid pixel, in parallel.
    pub fn compute(raster: &RasterComposite) -> Self {
        let n = raster.pixel_count();

        let partial = (0..n)
            .into_par_iter()
            .filter_map(|i| raster.ndvi_at_index(i))
            .fold(|| Partial::EMPTY, Partial::add)
            .reduce(|| Partial::EMPTY, Partial::merge);

        if partial.count == 0 {
            return Self::default();
        }

        let mean = partial.sum / partial.count as f64;
        // Two-pass variance.
        let sq_dev: f64 = (0..n)
            .into_par_iter()
            .filter_map(|i| raster.ndvi_at_index(i))
            .map(|v| (v - mean) * (v - mean))
            .sum();
        let std = (sq_dev / partial.count as f64).sqrt();

        Self {
            min: Some(partial.min),
            max: Some(partial.max),
            mean: Some(mean),
            std: Some(std),
            count: partial.count,
        }
    }
}

impl RasterStore {
    /// Statistics for the composite of `period`.
    pub async fn statistics(&self, period: YearMonth) -> NdviResult<RasterStatistics> {
        let raster = self.open(period).await?;
        tokio::task::spawn_blocking(move || RasterStatistics::compute(&raster))
            .await
            .map_err(|e| NdviError::Internal(format!("statistics task failed: {}", e)))
    }
}
