//! Tests for BoundingBox operations.

use map_common::bbox::{BboxParseError, BoundingBox};
use map_common::Coordinate;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
}

#[test]
fn test_bbox_from_corners_any_order() {
    let bbox = BoundingBox::from_corners(Coordinate::new(10.0, 0.0), Coordinate::new(0.0, 10.0));
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn test_bbox_from_center() {
    let bbox = BoundingBox::from_center(Coordinate::new(5.0, 5.0), 4.0, 2.0);
    assert_eq!(bbox, BoundingBox::new(3.0, 4.0, 7.0, 6.0));
    assert_eq!(bbox.center(), Coordinate::new(5.0, 5.0));
}

// ============================================================================
// parse tests
// ============================================================================

#[test]
fn test_parse_bbox_integer() {
    let bbox = BoundingBox::parse("0,0,100,100").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_parse_bbox_floating() {
    let bbox: BoundingBox = "-125.5,24.75,-66.25,50.125".parse().unwrap();
    assert!((bbox.min_x - (-125.5)).abs() < 0.001);
    assert!((bbox.min_y - 24.75).abs() < 0.001);
    assert!((bbox.max_x - (-66.25)).abs() < 0.001);
    assert!((bbox.max_y - 50.125).abs() < 0.001);
}

#[test]
fn test_parse_bbox_web_mercator() {
    let bbox =
        BoundingBox::parse("-20037508.34,-20037508.34,20037508.34,20037508.34").unwrap();
    assert!((bbox.min_x - (-20037508.34)).abs() < 0.01);
    assert!((bbox.max_x - 20037508.34).abs() < 0.01);
}

#[test]
fn test_parse_bbox_whitespace_tolerated() {
    let bbox = BoundingBox::parse(" 0, 0, 100, 100 ").unwrap();
    assert_eq!(bbox.max_y, 100.0);
}

#[test]
fn test_parse_bbox_invalid_format_too_few() {
    let result = BoundingBox::parse("0,0,100");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_bbox_invalid_number() {
    let result = BoundingBox::parse("abc,0,100,100");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

#[test]
fn test_parse_bbox_inverted() {
    let result = BoundingBox::parse("10,10,0,0");
    assert!(matches!(result, Err(BboxParseError::Inverted(_))));
}

#[test]
fn test_display_parses_back() {
    let bbox = BoundingBox::new(-1.5, 2.0, 3.25, 4.0);
    assert_eq!(BoundingBox::parse(&bbox.to_string()).unwrap(), bbox);
}

// ============================================================================
// Dimension tests
// ============================================================================

#[test]
fn test_bbox_width_crossing_zero() {
    let bbox = BoundingBox::new(-10.0, 0.0, 10.0, 10.0);
    assert_eq!(bbox.width(), 20.0);
}

#[test]
fn test_bbox_zero_dimensions_is_degenerate() {
    let bbox = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
    assert_eq!(bbox.width(), 0.0);
    assert_eq!(bbox.height(), 0.0);
    assert!(bbox.is_degenerate());
    assert!(!BoundingBox::new(0.0, 0.0, 1e-10, 1e-10).is_degenerate());
}

// ============================================================================
// Intersection tests
// ============================================================================

#[test]
fn test_bbox_intersects_symmetric() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn test_bbox_intersects_adjacent_edge() {
    // Touching at edge - not intersecting (open interval)
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
    assert!(!a.intersects(&b));
    assert!(a.touches(&b));
}

#[test]
fn test_bbox_touches_corner_only() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
    assert!(a.touches(&b));
    assert!(!a.touches(&BoundingBox::new(10.5, 10.5, 20.0, 20.0)));
}

#[test]
fn test_bbox_intersection_with_self() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(bbox.intersection(&bbox).unwrap(), bbox);
}

#[test]
fn test_bbox_union() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(20.0, -5.0, 30.0, 5.0);
    assert_eq!(a.union(&b), BoundingBox::new(0.0, -5.0, 30.0, 10.0));
}

#[test]
fn test_bbox_contains() {
    let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let inner = BoundingBox::new(25.0, 25.0, 75.0, 75.0);
    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
}

// ============================================================================
// Contains point tests
// ============================================================================

#[test]
fn test_bbox_contains_point_on_edge() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 5.0));
    assert!(bbox.contains_point(10.0, 5.0));
    assert!(bbox.contains_point(5.0, 0.0));
    assert!(bbox.contains_point(5.0, 10.0));
}

#[test]
fn test_bbox_contains_point_outside() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(!bbox.contains_point(-1.0, 5.0));
    assert!(!bbox.contains_point(11.0, 5.0));
}

#[test]
fn test_bbox_translate() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).translate(5.0, -5.0);
    assert_eq!(bbox, BoundingBox::new(5.0, -5.0, 15.0, 5.0));
}
