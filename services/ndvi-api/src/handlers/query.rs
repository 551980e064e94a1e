//! Query string parsing shared by the NDVI handlers.
//!
//! Parameters are taken as raw strings so that bad values surface as JSON
//! exception bodies instead of the extractor's plain-text rejection.

use std::collections::HashMap;
use std::str::FromStr;

use ndvi_common::{BoundingBox, GeoPoint, NdviError, NdviResult, YearMonth};

/// Default first year of range queries.
pub const DEFAULT_START_YEAR: i32 = 2020;
/// Default last year of range queries.
pub const DEFAULT_END_YEAR: i32 = 2023;

/// Raw query parameters.
#[derive(Debug, Default, Clone)]
pub struct QueryParams(HashMap<String, String>);

impl From<HashMap<String, String>> for QueryParams {
    fn from(map: HashMap<String, String>) -> Self {
        QueryParams(map)
    }
}

impl QueryParams {
    fn raw(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn optional<T: FromStr>(&self, name: &str) -> NdviResult<Option<T>> {
        match self.raw(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| NdviError::invalid(name, format!("Cannot parse '{}'", raw))),
        }
    }

    pub fn required<T: FromStr>(&self, name: &str) -> NdviResult<T> {
        self.optional(name)?
            .ok_or_else(|| NdviError::MissingParameter(name.to_string()))
    }

    /// `lat` and `lon`, range-checked.
    pub fn point(&self) -> NdviResult<GeoPoint> {
        let lat: f64 = self.required("lat")?;
        let lon: f64 = self.required("lon")?;
        GeoPoint::checked(lat, lon)
    }

    /// `year` and `month`.
    pub fn period(&self) -> NdviResult<YearMonth> {
        let year: i32 = self.required("year")?;
        let month: u32 = self.required("month")?;
        YearMonth::new(year, month)
    }

    /// `start_year` and `end_year` with defaults, limited to `max_span`
    /// years apart.
    pub fn year_range(&self, max_span: i32) -> NdviResult<(i32, i32)> {
        let start: i32 = self.optional("start_year")?.unwrap_or(DEFAULT_START_YEAR);
        let end: i32 = self.optional("end_year")?.unwrap_or(DEFAULT_END_YEAR);
        if start > end {
            return Err(NdviError::invalid(
                "start_year",
                "Start year must be <= end year",
            ));
        }
        if i64::from(end) - i64::from(start) > i64::from(max_span) {
            return Err(NdviError::invalid(
                "end_year",
                format!("Year range must not exceed {} years", max_span),
            ));
        }
        Ok((start, end))
    }

    /// `bbox=west,south,east,north`, if given.
    pub fn bbox(&self) -> NdviResult<Option<BoundingBox>> {
        match self.raw("bbox") {
            None => Ok(None),
            Some(raw) => BoundingBox::from_query_string(raw)
                .map(Some)
                .map_err(|e| NdviError::invalid("bbox", e.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    #[test]
    fn test_point() {
        let p = params(&[("lat", "38.5"), ("lon", "104.5")]).point().unwrap();
        assert_eq!(p.latitude, 38.5);
        assert_eq!(p.longitude, 104.5);
    }

    #[test]
    fn test_missing_parameter() {
        let err = params(&[("lat", "38.5")]).point().unwrap_err();
        assert!(matches!(err, NdviError::MissingParameter(ref p) if p == "lon"));
    }

    #[test]
    fn test_non_numeric() {
        let err = params(&[("lat", "north"), ("lon", "104")]).point().unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_out_of_range_latitude() {
        let err = params(&[("lat", "91"), ("lon", "104")]).point().unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_month_13_rejected() {
        let err = params(&[("year", "2020"), ("month", "13")]).period().unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_blank_is_missing() {
        let err = params(&[("year", " "), ("month", "6")]).period().unwrap_err();
        assert!(matches!(err, NdviError::MissingParameter(_)));
    }

    #[test]
    fn test_year_range_defaults() {
        assert_eq!(params(&[]).year_range(50).unwrap(), (2020, 2023));
    }

    #[test]
    fn test_year_range_limits() {
        assert!(params(&[("start_year", "2022"), ("end_year", "2020")])
            .year_range(50)
            .is_err());
        assert!(params(&[("start_year", "1900"), ("end_year", "2020")])
            .year_range(50)
            .is_err());
        assert_eq!(
            params(&[("start_year", "2019"), ("end_year", "2019")])
                .year_range(0)
                .unwrap(),
            (2019, 2019)
        );
    }

    #[test]
    fn test_year_range_extreme_years() {
        let err = params(&[("start_year", "-2000000000"), ("end_year", "2000000000")])
            .year_range(50)
            .unwrap_err();
        assert_eq!(err.http_status_code(), 400);
        let (min, max) = (i32::MIN.to_string(), i32::MAX.to_string());
        assert!(params(&[("start_year", min.as_str()), ("end_year", max.as_str())])
            .year_range(i32::MAX)
            .is_err());
    }

    #[test]
    fn test_bbox() {
        let bbox = params(&[("bbox", "103,37.5,105.2,39")]).bbox().unwrap().unwrap();
        assert_eq!(bbox.max_x, 105.2);
        assert!(params(&[("bbox", "1,2,3")]).bbox().is_err());
        assert!(params(&[]).bbox().unwrap().is_none());
    }
}
