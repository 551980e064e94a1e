//! Coordinate reference systems the raster store can index into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spherical Web Mercator radius (metres).
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection.
const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// CRS codes a composite may be georeferenced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// Web Mercator (metres)
    Epsg3857,
}

impl CrsCode {
    /// Map an EPSG code from a GeoKey directory.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(CrsCode::Epsg4326),
            3857 | 900913 => Some(CrsCode::Epsg3857),
            _ => None,
        }
    }

    /// Project a WGS84 (lon, lat) into this CRS.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            CrsCode::Epsg4326 => (lon, lat),
            CrsCode::Epsg3857 => {
                let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
                let x = EARTH_RADIUS_M * lon.to_radians();
                let y = EARTH_RADIUS_M
                    * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                        .tan()
                        .ln();
                (x, y)
            }
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg3857 => "EPSG:3857",
        };
        write!(f, "{}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_epsg() {
        assert_eq!(CrsCode::from_epsg(4326), Some(CrsCode::Epsg4326));
        assert_eq!(CrsCode::from_epsg(3857), Some(CrsCode::Epsg3857));
        assert_eq!(CrsCode::from_epsg(32648), None);
    }

    #[test]
    fn test_mercator_origin_and_edge() {
        let (x, y) = CrsCode::Epsg3857.project(0.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (x, _) = CrsCode::Epsg3857.project(180.0, 0.0);
        assert!((x - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_geographic_passthrough() {
        assert_eq!(CrsCode::Epsg4326.project(104.5, 38.5), (104.5, 38.5));
    }
}
