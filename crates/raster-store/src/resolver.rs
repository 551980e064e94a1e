//! Point value lookup.

use ndvi_common::{GeoPoint, NdviResult, YearMonth};
use serde::Serialize;

use crate::store::RasterStore;

/// The NDVI value at a point for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdviSample {
    pub year: i32,
    pub month: u32,
    /// First day of the month, `YYYY-MM-DD`.
    pub date: String,
    pub ndvi_value: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl NdviSample {
    pub fn new(period: YearMonth, point: GeoPoint, ndvi_value: Option<f64>) -> Self {
        Self {
            year: period.year,
            month: period.month,
            date: period.date_string(),
            ndvi_value,
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

impl RasterStore {
    /// NDVI at `point` in the composite for `period`.
    ///
    /// `Ok(None)` means the point is outside the raster or on a nodata
    /// pixel. A period without a composite is `NdviError::NotFound`.
    pub async fn value(&self, point: GeoPoint, period: YearMonth) -> NdviResult<Option<f64>> {
        let raster = self.open(period).await?;
        Ok(raster.sample(point))
    }

    /// [`value`](Self::value) wrapped with its period and point.
    pub async fn sample(&self, point: GeoPoint, period: YearMonth) -> NdviResult<NdviSample> {
        let value = self.value(point, period).await?;
        Ok(NdviSample::new(period, point, value))
    }
}
