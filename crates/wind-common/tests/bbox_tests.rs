//! Tests for BoundingBox operations used by the wind query path.

use wind_common::bbox::{BboxParseError, BoundingBox};

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_integer_bbox() {
    let bbox = BoundingBox::parse("0,0,100,100").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_parse_geographic_bbox() {
    let bbox = BoundingBox::parse("10.70,59.90,10.80,59.95").unwrap();
    assert!((bbox.min_x - 10.70).abs() < 1e-9);
    assert!((bbox.max_y - 59.95).abs() < 1e-9);
}

#[test]
fn test_parse_scientific_notation() {
    let bbox = BoundingBox::parse("5e5,6.65e6,5.01e5,6.651e6").unwrap();
    assert!((bbox.min_x - 500000.0).abs() < 1e-6);
    assert!((bbox.max_y - 6651000.0).abs() < 1e-6);
}

#[test]
fn test_parse_too_few_parts() {
    let result = BoundingBox::parse("0,0,100");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_invalid_number() {
    let result = BoundingBox::parse("0,abc,100,100");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_width_height() {
    let bbox = BoundingBox::new(500000.0, 6650000.0, 501500.0, 6651000.0);
    assert_eq!(bbox.width(), 1500.0);
    assert_eq!(bbox.height(), 1000.0);
}

#[test]
fn test_contains_point_edges_inclusive() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(1.0, 1.0));
    assert!(bbox.contains_point(0.5, 0.25));
    assert!(!bbox.contains_point(1.0000001, 0.5));
    assert!(!bbox.contains_point(0.5, -0.1));
}

#[test]
fn test_intersection_contained() {
    let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let inner = BoundingBox::new(2.0, 3.0, 4.0, 5.0);
    assert_eq!(outer.intersection(&inner), Some(inner));
    assert_eq!(inner.intersection(&outer), Some(inner));
}

#[test]
fn test_intersection_disjoint() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let b = BoundingBox::new(5.0, 5.0, 6.0, 6.0);
    assert!(a.intersection(&b).is_none());
}

#[test]
fn test_corners() {
    let bbox = BoundingBox::new(0.0, 1.0, 2.0, 3.0);
    let corners = bbox.corners();
    assert_eq!(corners[0], (0.0, 1.0));
    assert_eq!(corners[1], (2.0, 1.0));
    assert_eq!(corners[2], (2.0, 3.0));
    assert_eq!(corners[3], (0.0, 3.0));
}

#[test]
fn test_serde_round_trip() {
    let bbox = BoundingBox::new(1.5, 2.5, 3.5, 4.5);
    let json = serde_json::to_string(&bbox).unwrap();
    assert!(json.contains("\"min_x\":1.5"));
    let back: BoundingBox = serde_json::from_str(&json).unwrap();
    assert_eq!(bbox, back);
}
