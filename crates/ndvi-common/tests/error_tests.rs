//! Tests for the error taxonomy and its HTTP mapping.

use ndvi_common::{NdviError, YearMonth};

#[test]
fn test_malformed_input_is_400() {
    assert_eq!(
        NdviError::MissingParameter("lat".to_string()).http_status_code(),
        400
    );
    assert_eq!(NdviError::invalid("month", "bad").http_status_code(), 400);
    assert_eq!(
        NdviError::invalid("month", "bad").exception_code(),
        "InvalidParameterValue"
    );
}

#[test]
fn test_not_found_is_404() {
    let err = NdviError::NotFound(YearMonth::new(2020, 7).unwrap());
    assert_eq!(err.http_status_code(), 404);
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No data found for 2020-07");
}

#[test]
fn test_read_failures_are_500() {
    let err = NdviError::raster_read("/data/x.tif", "truncated strip");
    assert_eq!(err.http_status_code(), 500);
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("/data/x.tif"));

    let io: NdviError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert_eq!(io.http_status_code(), 500);
}

#[test]
fn test_month_validation_error_names_param() {
    let err = YearMonth::new(2020, 13).unwrap_err();
    match err {
        NdviError::InvalidParameter { param, .. } => assert_eq!(param, "month"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_internal_error_uses_generic_code() {
    let err = NdviError::Internal("raster task failed".to_string());
    assert_eq!(err.http_status_code(), 500);
    assert_eq!(err.exception_code(), "NoApplicableCode");
    assert_eq!(err.to_string(), "Internal server error: raster task failed");
}
