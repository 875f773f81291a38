//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use map_common::{BoundingBox, GeoTransform};
use tile_index::{
    FootprintSource, MemoryFootprintSource, RasterAccess, TileFootprint, TileIndexError,
};

/// Rasters that exist only as dimensions, colours and optional transforms.
/// Every trait call is counted.
#[derive(Default)]
pub struct MockRaster {
    files: HashMap<PathBuf, MockFile>,
    pub exists_calls: AtomicUsize,
    pub dimension_calls: AtomicUsize,
    pub transform_calls: AtomicUsize,
    pub load_calls: AtomicUsize,
}

struct MockFile {
    size: (u32, u32),
    color: [u8; 4],
    transform: Option<GeoTransform>,
    corrupt: bool,
}

impl MockRaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, width: u32, height: u32, color: [u8; 4]) -> Self {
        self.files.insert(
            PathBuf::from(path),
            MockFile {
                size: (width, height),
                color,
                transform: None,
                corrupt: false,
            },
        );
        self
    }

    /// A file with an embedded transform for metadata mode.
    pub fn with_georeferenced(mut self, path: &str, width: u32, height: u32, transform: GeoTransform) -> Self {
        self.files.insert(
            PathBuf::from(path),
            MockFile {
                size: (width, height),
                color: [0, 0, 255, 255],
                transform: Some(transform),
                corrupt: false,
            },
        );
        self
    }

    /// A file that exists but fails to decode.
    pub fn with_corrupt(mut self, path: &str) -> Self {
        self.files.insert(
            PathBuf::from(path),
            MockFile {
                size: (0, 0),
                color: [0, 0, 0, 0],
                transform: None,
                corrupt: true,
            },
        );
        self
    }

    pub fn total_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
            + self.dimension_calls.load(Ordering::SeqCst)
            + self.transform_calls.load(Ordering::SeqCst)
            + self.load_calls.load(Ordering::SeqCst)
    }

    fn file(&self, path: &Path) -> tile_index::Result<&MockFile> {
        match self.files.get(path) {
            Some(f) if !f.corrupt => Ok(f),
            _ => Err(TileIndexError::RasterRead {
                path: path.to_path_buf(),
                message: "unreadable".to_string(),
            }),
        }
    }
}

impl RasterAccess for MockRaster {
    fn exists(&self, path: &Path) -> bool {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.files.contains_key(path)
    }

    fn dimensions(&self, path: &Path) -> tile_index::Result<(u32, u32)> {
        self.dimension_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.file(path)?.size)
    }

    fn geotransform(&self, path: &Path) -> tile_index::Result<GeoTransform> {
        self.transform_calls.fetch_add(1, Ordering::SeqCst);
        self.file(path)?
            .transform
            .ok_or_else(|| TileIndexError::MissingGeoTransform(path.to_path_buf()))
    }

    fn load(&self, path: &Path) -> tile_index::Result<RgbaImage> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let file = self.file(path)?;
        Ok(RgbaImage::from_pixel(file.size.0, file.size.1, Rgba(file.color)))
    }
}

/// Counters observed by a [`CountingSource`].
#[derive(Default)]
pub struct SourceCounters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub disposes: AtomicUsize,
}

/// Wraps a memory source, counting lifecycle calls, optionally failing queries.
pub struct CountingSource {
    inner: MemoryFootprintSource,
    counters: Arc<SourceCounters>,
    fail_queries: bool,
}

impl CountingSource {
    pub fn new(footprints: Vec<TileFootprint>) -> (Self, Arc<SourceCounters>) {
        let counters = Arc::new(SourceCounters::default());
        let source = Self {
            inner: MemoryFootprintSource::new(footprints),
            counters: Arc::clone(&counters),
            fail_queries: false,
        };
        (source, counters)
    }

    pub fn failing(mut self) -> Self {
        self.fail_queries = true;
        self
    }
}

impl FootprintSource for CountingSource {
    fn open(&mut self) -> tile_index::Result<()> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open()
    }

    fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close();
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn intersection_query(&mut self, envelope: &BoundingBox) -> tile_index::Result<Vec<TileFootprint>> {
        if self.fail_queries {
            return Err(TileIndexError::IndexQuery("simulated failure".to_string()));
        }
        self.inner.intersection_query(envelope)
    }

    fn extents(&mut self) -> tile_index::Result<Option<BoundingBox>> {
        self.inner.extents()
    }

    fn dispose(&mut self) {
        self.counters.disposes.fetch_add(1, Ordering::SeqCst);
        self.inner.dispose();
    }
}

pub fn footprint(id: usize, bounds: (f64, f64, f64, f64), location: Option<&str>) -> TileFootprint {
    TileFootprint::new(
        id,
        BoundingBox::new(bounds.0, bounds.1, bounds.2, bounds.3),
        location.map(str::to_string),
    )
}
