//! A map layer drawing the mosaic described by a tile index.
//!
//! A tile index is a vector dataset tying several rasters into one layer:
//! each record holds a tile footprint and the path of its image. Indexes are
//! typically built with `gdaltindex imagery.shp imagery/*.tif`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use image::RgbaImage;
use map_common::{BoundingBox, MapError, MapLayer, MapResult, Viewport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::CacheStats;
use crate::compose::composite;
use crate::config::TileIndexConfig;
use crate::error::{Result, TileIndexError};
use crate::raster::{FsRasterAccess, RasterAccess};
use crate::resolver::{Resolution, TileResolver};
use crate::source::{FootprintSource, ShapefileFootprintSource, SourceSession};

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Tiles drawn from their own raster.
    pub drawn: usize,
    /// Placeholder images drawn for missing rasters.
    pub placeholders: usize,
    /// Footprints without a usable raster path or file.
    pub skipped: usize,
    /// Tiles that could not be georeferenced or decoded.
    pub failed: usize,
}

struct LayerState {
    source: Option<Box<dyn FootprintSource>>,
    resolver: TileResolver,
}

pub struct TileIndexLayer {
    config: TileIndexConfig,
    extents: Option<BoundingBox>,
    raster: Arc<dyn RasterAccess>,
    state: Mutex<LayerState>,
}

impl TileIndexLayer {
    /// Open a shapefile index with default settings and the given path field.
    pub fn new(
        name: impl Into<String>,
        index_path: impl Into<std::path::PathBuf>,
        field_name: impl Into<String>,
    ) -> Result<Self> {
        Self::open(TileIndexConfig::new(name, index_path).with_field_name(field_name))
    }

    /// Open the shapefile index named by `config` and read its extents.
    pub fn open(config: TileIndexConfig) -> Result<Self> {
        let source = ShapefileFootprintSource::new(&config.index_path, &config.field_name);
        Self::with_source(config, Box::new(source), Arc::new(FsRasterAccess))
    }

    /// Build a layer over any footprint source and raster backend.
    ///
    /// The source is opened once to read the index extents and closed again.
    pub fn with_source(
        config: TileIndexConfig,
        mut source: Box<dyn FootprintSource>,
        raster: Arc<dyn RasterAccess>,
    ) -> Result<Self> {
        config.validate()?;

        let extents = {
            let mut session = SourceSession::open(source.as_mut())?;
            session.extents()?
        };

        info!(
            layer = %config.name,
            index = %config.index_path.display(),
            extents = ?extents,
            transform = config.transform.as_str(),
            "Opened tile index layer"
        );

        let resolver = TileResolver::new(&config, Arc::clone(&raster));
        Ok(Self {
            config,
            extents,
            raster,
            state: Mutex::new(LayerState {
                source: Some(source),
                resolver,
            }),
        })
    }

    pub fn config(&self) -> &TileIndexConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, LayerState>> {
        self.state.lock().map_err(|_| TileIndexError::Poisoned)
    }

    /// Resolve the tiles intersecting `envelope` without drawing them.
    pub fn resolve(&self, envelope: &BoundingBox) -> Result<Resolution> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let source = state
            .source
            .as_deref_mut()
            .ok_or_else(|| TileIndexError::Disposed(self.config.name.clone()))?;
        state.resolver.resolve(source, envelope)
    }

    /// Draw every tile intersecting the viewport onto `surface`.
    ///
    /// A failing index query aborts the pass with an error. Tiles that fail
    /// to decode are logged, counted and skipped; the pass continues.
    pub fn render_tiles(&self, surface: &mut RgbaImage, viewport: &Viewport) -> Result<RenderReport> {
        if surface.dimensions() != (viewport.width(), viewport.height()) {
            return Err(MapError::InvalidViewport(format!(
                "surface is {}x{} but viewport is {}x{}",
                surface.width(),
                surface.height(),
                viewport.width(),
                viewport.height()
            ))
            .into());
        }

        let resolution = self.resolve(viewport.envelope())?;
        let mut report = RenderReport {
            skipped: resolution.skipped.len(),
            failed: resolution.failed.len(),
            ..RenderReport::default()
        };

        for tile in &resolution.tiles {
            debug!(layer = %self.config.name, path = %tile.path.display(), "Drawing tile");

            let image = match self.raster.load(&tile.path) {
                Ok(image) => image,
                Err(error) => {
                    warn!(layer = %self.config.name, path = %tile.path.display(), error = %error, "Failed to load tile");
                    report.failed += 1;
                    continue;
                }
            };

            composite(surface, &image, &tile.transform, viewport, self.config.opacity);

            if tile.placeholder {
                report.placeholders += 1;
            } else {
                report.drawn += 1;
            }
        }

        Ok(report)
    }

    /// Release the index source and the transform cache.
    ///
    /// Safe to call more than once; the source is disposed exactly once.
    pub fn dispose(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut source) = state.source.take() {
            source.dispose();
            state.resolver.clear_cache();
            info!(layer = %self.config.name, "Disposed tile index layer");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().map(|s| s.source.is_none()).unwrap_or(true)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock()
            .map(|s| s.resolver.cache_stats())
            .unwrap_or_default()
    }
}

impl MapLayer for TileIndexLayer {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn envelope(&self) -> Option<BoundingBox> {
        self.extents
    }

    fn render(&self, surface: &mut RgbaImage, viewport: &Viewport) -> MapResult<()> {
        self.render_tiles(surface, viewport)?;
        Ok(())
    }
}

impl Drop for TileIndexLayer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for TileIndexLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileIndexLayer")
            .field("name", &self.config.name)
            .field("index_path", &self.config.index_path)
            .field("extents", &self.extents)
            .finish_non_exhaustive()
    }
}
