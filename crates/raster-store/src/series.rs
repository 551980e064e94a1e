//! Time series of point values across many months.

use ndvi_common::{GeoPoint, NdviError, NdviResult};
use serde::Serialize;
use tracing::{debug, info};

use crate::resolver::NdviSample;
use crate::store::RasterStore;

/// Summary of the non-null samples of a series.
///
/// With no samples every field except `count` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub count: usize,
}

impl SeriesStatistics {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self {
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
            count: values.len(),
        }
    }
}

/// Chronological NDVI samples at one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub latitude: f64,
    pub longitude: f64,
    pub data: Vec<NdviSample>,
    pub statistics: SeriesStatistics,
}

impl RasterStore {
    /// Values at `point` for every indexed month from January of
    /// `start_year` through December of `end_year`.
    ///
    /// Months without a composite, and months whose composite has no data at
    /// the point, are left out. Any other failure aborts the whole series.
    pub async fn time_series(
        &self,
        point: GeoPoint,
        start_year: i32,
        end_year: i32,
    ) -> NdviResult<TimeSeries> {
        if start_year > end_year {
            return Err(NdviError::invalid(
                "start_year",
                "Start year must be <= end year",
            ));
        }

        let index = self.file_index().await?;
        let periods = index.periods_in_years(start_year, end_year);
        info!(
            start_year,
            end_year,
            files = periods.len(),
            "Building NDVI time series"
        );

        let mut data = Vec::with_capacity(periods.len());
        for period in periods {
            match self.open_indexed(&index, period).await {
                Ok(raster) => {
                    if let Some(value) = raster.sample(point) {
                        data.push(NdviSample::new(period, point, Some(value)));
                    }
                }
                Err(NdviError::NotFound(_)) => {
                    debug!(period = %period, "Composite missing, skipping month");
                }
                Err(e) => return Err(e),
            }
        }

        let values: Vec<f64> = data.iter().filter_map(|s| s.ndvi_value).collect();
        let statistics = SeriesStatistics::from_values(&values);
        debug!(count = statistics.count, "Time series complete");

        Ok(TimeSeries {
            latitude: point.latitude,
            longitude: point.longitude,
            data,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_statistics() {
        let stats = SeriesStatistics::from_values(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.min.is_none() && stats.max.is_none() && stats.mean.is_none());
    }

    #[test]
    fn test_statistics_bound_values() {
        let values = [0.12, 0.05, 0.3, 0.21];
        let stats = SeriesStatistics::from_values(&values);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, Some(0.05));
        assert_eq!(stats.max, Some(0.3));
        assert!((stats.mean.unwrap() - 0.17).abs() < 1e-12);
    }
}
