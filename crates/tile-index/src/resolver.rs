//! Resolution of a query envelope to drawable tiles.
//!
//! ```text
//! resolve(envelope)
//!      │
//!      ├─► open source ─► intersection query ─► close source
//!      │
//!      └─► for each footprint (native order)
//!               │
//!               ├─► path field ─► absolute path ─► exists?
//!               │         └─► no: skip (placeholder if configured)
//!               │
//!               └─► transform
//!                     ├─► metadata: cache, else raster tags / world file
//!                     └─► geometry: footprint envelope / pixel size
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use map_common::{BoundingBox, GeoTransform};
use serde::Serialize;
use tracing::warn;

use crate::cache::{CacheStats, CachedTransform, TransformCache};
use crate::config::{TileIndexConfig, TransformMode};
use crate::error::{Result, TileIndexError};
use crate::footprint::TileFootprint;
use crate::path::resolve_tile_path;
use crate::raster::RasterAccess;
use crate::source::{FootprintSource, SourceSession};

/// A tile ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTile {
    pub footprint_id: usize,
    pub path: PathBuf,
    pub footprint: BoundingBox,
    pub transform: GeoTransform,
    pub width: u32,
    pub height: u32,
    /// True when `path` is the configured placeholder standing in for a
    /// missing raster.
    pub placeholder: bool,
}

impl ResolvedTile {
    /// Ground envelope the image covers under its transform.
    pub fn ground_bounds(&self) -> BoundingBox {
        self.transform.ground_bounds(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    /// The path field is absent or blank.
    MissingPath,
    /// The resolved raster file does not exist.
    FileNotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTile {
    pub footprint_id: usize,
    pub reason: SkipReason,
}

/// A footprint whose raster exists but could not be georeferenced.
#[derive(Debug)]
pub struct TileFailure {
    pub footprint_id: usize,
    pub path: PathBuf,
    pub error: TileIndexError,
}

/// Outcome of one query.
#[derive(Debug, Default)]
pub struct Resolution {
    pub tiles: Vec<ResolvedTile>,
    pub skipped: Vec<SkippedTile>,
    pub failed: Vec<TileFailure>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Turns index footprints into georeferenced raster paths.
pub struct TileResolver {
    index_path: PathBuf,
    mode: TransformMode,
    placeholder: Option<PathBuf>,
    raster: Arc<dyn RasterAccess>,
    cache: TransformCache,
}

impl TileResolver {
    pub fn new(config: &TileIndexConfig, raster: Arc<dyn RasterAccess>) -> Self {
        Self {
            index_path: config.index_path.clone(),
            mode: config.transform,
            placeholder: config.placeholder.clone(),
            raster,
            cache: TransformCache::new(config.cache_capacity),
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// Resolve every footprint of `source` intersecting `envelope`.
    ///
    /// The source is opened for the query and closed before any raster is
    /// touched, also when the query fails. Per-tile problems are collected
    /// in the returned [`Resolution`]; only a failed query is an error.
    pub fn resolve(
        &mut self,
        source: &mut dyn FootprintSource,
        envelope: &BoundingBox,
    ) -> Result<Resolution> {
        let footprints = {
            let mut session = SourceSession::open(source)?;
            session.intersection_query(envelope)?
        };

        let mut resolution = Resolution::default();
        for footprint in &footprints {
            self.resolve_footprint(footprint, &mut resolution);
        }
        Ok(resolution)
    }

    fn resolve_footprint(&mut self, footprint: &TileFootprint, out: &mut Resolution) {
        let Some(path) = footprint
            .location()
            .and_then(|location| resolve_tile_path(&self.index_path, location))
        else {
            warn!(record = footprint.id, "Tile footprint has no raster path");
            self.skip(footprint, SkipReason::MissingPath, out);
            return;
        };

        if !self.raster.exists(&path) {
            warn!(record = footprint.id, path = %path.display(), "Tile raster not found");
            self.skip(footprint, SkipReason::FileNotFound(path), out);
            return;
        }

        match self.transform_for(&path, &footprint.envelope) {
            Ok((transform, width, height)) => out.tiles.push(ResolvedTile {
                footprint_id: footprint.id,
                path,
                footprint: footprint.envelope,
                transform,
                width,
                height,
                placeholder: false,
            }),
            Err(error) => {
                warn!(record = footprint.id, path = %path.display(), error = %error, "Failed to georeference tile");
                out.failed.push(TileFailure {
                    footprint_id: footprint.id,
                    path,
                    error,
                });
            }
        }
    }

    fn transform_for(
        &mut self,
        path: &Path,
        envelope: &BoundingBox,
    ) -> Result<(GeoTransform, u32, u32)> {
        match self.mode {
            TransformMode::Geometry => {
                let (width, height) = self.raster.dimensions(path)?;
                let transform = GeoTransform::from_envelope(envelope, width, height)?;
                Ok((transform, width, height))
            }
            TransformMode::Metadata => {
                if let Some(cached) = self.cache.get(path) {
                    return Ok((cached.transform, cached.width, cached.height));
                }
                let transform = self.raster.geotransform(path)?;
                let (width, height) = self.raster.dimensions(path)?;
                self.cache.insert(
                    path.to_path_buf(),
                    CachedTransform::new(transform, width, height),
                );
                Ok((transform, width, height))
            }
        }
    }

    /// Record a skipped footprint and, when configured, stand the placeholder
    /// image in for it.
    fn skip(&self, footprint: &TileFootprint, reason: SkipReason, out: &mut Resolution) {
        out.skipped.push(SkippedTile {
            footprint_id: footprint.id,
            reason,
        });

        let Some(placeholder) = &self.placeholder else {
            return;
        };

        let stretched = self.raster.dimensions(placeholder).and_then(|(width, height)| {
            let transform = GeoTransform::from_envelope(&footprint.envelope, width, height)?;
            Ok((transform, width, height))
        });

        match stretched {
            Ok((transform, width, height)) => out.tiles.push(ResolvedTile {
                footprint_id: footprint.id,
                path: placeholder.clone(),
                footprint: footprint.envelope,
                transform,
                width,
                height,
                placeholder: true,
            }),
            Err(error) => {
                warn!(path = %placeholder.display(), error = %error, "Placeholder image unusable");
                out.failed.push(TileFailure {
                    footprint_id: footprint.id,
                    path: placeholder.clone(),
                    error,
                });
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
