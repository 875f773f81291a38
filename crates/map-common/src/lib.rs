//! Common types shared by the tile mosaic crates.

pub mod bbox;
pub mod coord;
pub mod error;
pub mod geometry;
pub mod geotransform;
pub mod layer;
pub mod viewport;

pub use bbox::{BboxParseError, BoundingBox};
pub use coord::Coordinate;
pub use error::{MapError, MapResult};
pub use geometry::Geometry;
pub use geotransform::GeoTransform;
pub use layer::{LayerRef, MapLayer};
pub use viewport::Viewport;
