//! Tests for BoundingBox parsing and grid geometry.

use ndvi_common::bbox::{BboxParseError, BoundingBox};
use ndvi_common::TENGGELI_REGION;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_query_bbox() {
    let bbox = BoundingBox::from_query_string("103.0,37.5,105.2,39.0").unwrap();
    assert_eq!(bbox, TENGGELI_REGION);
}

#[test]
fn test_parse_query_bbox_with_spaces() {
    let bbox = BoundingBox::from_query_string(" 1, 2 ,3,4 ").unwrap();
    assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn test_parse_wrong_arity() {
    assert!(matches!(
        BoundingBox::from_query_string("1,2,3"),
        Err(BboxParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_parse_not_a_number() {
    assert!(matches!(
        BoundingBox::from_query_string("1,2,east,4"),
        Err(BboxParseError::InvalidNumber(_))
    ));
    assert!(matches!(
        BoundingBox::from_query_string("1,2,NaN,4"),
        Err(BboxParseError::InvalidNumber(_))
    ));
}

#[test]
fn test_parse_inverted_bbox() {
    assert!(matches!(
        BoundingBox::from_query_string("10,10,5,5"),
        Err(BboxParseError::Degenerate(_))
    ));
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_contains_point_edges_inclusive() {
    assert!(TENGGELI_REGION.contains_point(103.0, 37.5));
    assert!(TENGGELI_REGION.contains_point(104.5, 38.5));
    assert!(!TENGGELI_REGION.contains_point(0.0, 0.0));
}

#[test]
fn test_cell_centers_stay_inside() {
    let rows = 15;
    let cols = 15;
    for row in 0..rows {
        for col in 0..cols {
            let (lon, lat) = TENGGELI_REGION.cell_center(rows, cols, row, col);
            assert!(TENGGELI_REGION.contains_point(lon, lat));
        }
    }
}
