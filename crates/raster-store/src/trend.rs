//! Month-over-month trend at a point.
//!
//! The current value is compared with the most recent earlier composite that
//! has data at the point. The search walks back through indexed months only,
//! stops after `max_lookback` calendar months, and never crosses the first
//! composite of the dataset.

use ndvi_common::{GeoPoint, NdviError, NdviResult, YearMonth};
use serde::Serialize;
use tracing::debug;

use crate::store::RasterStore;

/// Differences at or below this magnitude count as stable.
pub const STABLE_THRESHOLD: f64 = 0.01;

pub const DEFAULT_LOOKBACK_MONTHS: u32 = 3;
pub const MAX_LOOKBACK_MONTHS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

impl TrendDirection {
    pub fn classify(delta: f64) -> Self {
        if delta.abs() <= STABLE_THRESHOLD {
            TrendDirection::Stable
        } else if delta > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

/// The earlier value a trend was measured against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousValue {
    pub year: i32,
    pub month: u32,
    pub ndvi_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub year: i32,
    pub month: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub current: Option<f64>,
    pub previous: Option<PreviousValue>,
    pub delta: Option<f64>,
    pub direction: TrendDirection,
}

impl RasterStore {
    /// Trend at `point` for `period`.
    ///
    /// Fails with `NotFound` if `period` itself has no composite.
    pub async fn trend(
        &self,
        point: GeoPoint,
        period: YearMonth,
        max_lookback: u32,
    ) -> NdviResult<TrendReport> {
        if !(1..=MAX_LOOKBACK_MONTHS).contains(&max_lookback) {
            return Err(NdviError::invalid(
                "lookback",
                format!("Lookback must be between 1 and {}", MAX_LOOKBACK_MONTHS),
            ));
        }

        let index = self.file_index().await?;
        let current = self.open_indexed(&index, period).await?.sample(point);

        let mut previous = None;
        for earlier in index.earlier_within(&period, max_lookback) {
            let raster = match self.open_indexed(&index, earlier).await {
                Ok(raster) => raster,
                Err(NdviError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            if let Some(value) = raster.sample(point) {
                previous = Some(PreviousValue {
                    year: earlier.year,
                    month: earlier.month,
                    ndvi_value: value,
                });
                break;
            }
            debug!(period = %earlier, "No data at point, looking further back");
        }

        let delta = match (current, &previous) {
            (Some(now), Some(before)) => Some(now - before.ndvi_value),
            _ => None,
        };
        let direction = delta
            .map(TrendDirection::classify)
            .unwrap_or(TrendDirection::Unknown);

        Ok(TrendReport {
            year: period.year,
            month: period.month,
            latitude: point.latitude,
            longitude: point.longitude,
            current,
            previous,
            delta,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(TrendDirection::classify(0.05), TrendDirection::Increasing);
        assert_eq!(TrendDirection::classify(-0.05), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::classify(0.01), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(-0.002), TrendDirection::Stable);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&TrendDirection::Increasing).unwrap();
        assert_eq!(json, "\"increasing\"");
    }
}
