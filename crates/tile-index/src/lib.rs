//! Raster mosaics driven by a tile index.
//!
//! A tile index is a vector dataset (usually a shapefile built with
//! `gdaltindex`) with one polygon footprint per raster tile and a text field
//! naming the tile's file. [`TileIndexLayer`] queries the index for the
//! viewport, georeferences each matching raster and composites it onto the
//! frame.
//!
//! # Example
//!
//! ```ignore
//! use map_common::{BoundingBox, MapLayer, Viewport};
//! use tile_index::{TileIndexConfig, TileIndexLayer, TransformMode};
//!
//! let config = TileIndexConfig::new("ortho", "/data/ortho/index.shp")
//!     .with_transform(TransformMode::Metadata);
//! let layer = TileIndexLayer::open(config)?;
//!
//! let viewport = Viewport::new(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0), 512, 512)?;
//! let mut frame = image::RgbaImage::new(512, 512);
//! layer.render(&mut frame, &viewport)?;
//! ```

pub mod cache;
pub mod compose;
pub mod config;
pub mod error;
pub mod footprint;
pub mod layer;
pub mod path;
pub mod raster;
pub mod resolver;
pub mod source;

pub use cache::{CacheStats, CachedTransform, TransformCache};
pub use config::{TileIndexConfig, TransformMode};
pub use error::{Result, TileIndexError, TileIndexResult};
pub use footprint::TileFootprint;
pub use layer::{RenderReport, TileIndexLayer};
pub use path::resolve_tile_path;
pub use raster::{FsRasterAccess, RasterAccess};
pub use resolver::{Resolution, ResolvedTile, SkipReason, SkippedTile, TileFailure, TileResolver};
pub use source::{
    FootprintSource, MemoryFootprintSource, ShapefileFootprintSource, SourceSession,
};
