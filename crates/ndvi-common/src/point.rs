//! Query points.

use serde::{Deserialize, Serialize};

use crate::error::{NdviError, NdviResult};

/// A WGS84 point supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point, rejecting coordinates that cannot exist on the globe.
    ///
    /// Points outside any raster are still valid; they resolve to no data.
    pub fn checked(latitude: f64, longitude: f64) -> NdviResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(NdviError::invalid(
                "lat",
                "Latitude must be between -90 and 90",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(NdviError::invalid(
                "lon",
                "Longitude must be between -180 and 180",
            ));
        }
        Ok(Self::new(latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_bounds() {
        assert!(GeoPoint::checked(38.5, 104.5).is_ok());
        assert!(GeoPoint::checked(0.0, 0.0).is_ok());
        assert!(GeoPoint::checked(91.0, 0.0).is_err());
        assert!(GeoPoint::checked(0.0, -180.5).is_err());
        assert!(GeoPoint::checked(f64::NAN, 0.0).is_err());
    }
}
