//! Shared test utilities for the tile-mosaic workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Temporary tile sets (images, world files, shapefile indexes)
//! - Solid and gradient image generators
//! - Common bounding boxes and colours
//! - Approximate comparisons for ground coordinates
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then build fixtures in your tests:
//!
//! ```ignore
//! use test_utils::TileSetBuilder;
//!
//! let set = TileSetBuilder::new()
//!     .tile("tiles/a.png", (0.0, 0.0, 10.0, 10.0), [255, 0, 0, 255])
//!     .build();
//! let index = set.index_path();
//! ```

pub mod fixtures;
pub mod images;
pub mod tiles;

pub use fixtures::*;
pub use images::*;
pub use tiles::*;

/// Default tolerance for ground-coordinate comparisons.
pub const GROUND_EPSILON: f64 = 1e-9;

/// Assert two numbers differ by at most an epsilon ([`GROUND_EPSILON`]
/// when omitted).
///
/// ```ignore
/// assert_approx_eq!(0.1 + 0.2, 0.3);
/// assert_approx_eq!(9.95, 10.0 - 0.05, 1e-12);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, $crate::GROUND_EPSILON)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        assert!(
            (left - right).abs() <= epsilon,
            "{} = {} is not within {} of {}",
            stringify!($left),
            left,
            epsilon,
            right
        );
    }};
}

/// Assert a bounding box (anything with `min_x`..`max_y` fields) matches
/// `(min_x, min_y, max_x, max_y)` within [`GROUND_EPSILON`].
///
/// ```ignore
/// assert_bbox_approx_eq!(tile.ground_bounds(), (0.0, 0.0, 10.0, 10.0));
/// ```
#[macro_export]
macro_rules! assert_bbox_approx_eq {
    ($bbox:expr, ($min_x:expr, $min_y:expr, $max_x:expr, $max_y:expr)) => {{
        let bbox = $bbox;
        $crate::assert_approx_eq!(bbox.min_x, $min_x);
        $crate::assert_approx_eq!(bbox.min_y, $min_y);
        $crate::assert_approx_eq!(bbox.max_x, $max_x);
        $crate::assert_approx_eq!(bbox.max_y, $max_y);
    }};
}
