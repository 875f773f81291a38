use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use ::shapefile::dbase::FieldValue;
use ::shapefile::Shape;
use map_common::BoundingBox;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info, warn};

use super::FootprintSource;
use crate::error::{Result, TileIndexError};
use crate::footprint::TileFootprint;

/// Tile index stored as an ESRI shapefile, as written by `gdaltindex`.
///
/// Opening builds an R-tree over the footprint envelopes; closing releases
/// it. The tree is kept until dispose and reused by later opens while the
/// `.shp` and `.dbf` modification times are unchanged.
pub struct ShapefileFootprintSource {
    path: PathBuf,
    field_name: String,
    index: Option<Arc<RTree<IndexedFootprint>>>,
    cached: Option<CachedIndex>,
    loads: usize,
    disposed: bool,
}

struct CachedIndex {
    stamp: IndexStamp,
    tree: Arc<RTree<IndexedFootprint>>,
}

/// Modification times of the geometry and attribute files.
type IndexStamp = (SystemTime, Option<SystemTime>);

struct IndexedFootprint(TileFootprint);

impl RTreeObject for IndexedFootprint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let e = &self.0.envelope;
        AABB::from_corners([e.min_x, e.min_y], [e.max_x, e.max_y])
    }
}

impl ShapefileFootprintSource {
    pub fn new(path: impl Into<PathBuf>, field_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            field_name: field_name.into(),
            index: None,
            cached: None,
            loads: 0,
            disposed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the index files have been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn stamp(&self) -> Option<IndexStamp> {
        let modified = |path: &Path| std::fs::metadata(path).and_then(|m| m.modified()).ok();
        let shp = modified(&self.path)?;
        Some((shp, modified(&self.path.with_extension("dbf"))))
    }

    fn open_error(&self, message: impl ToString) -> TileIndexError {
        TileIndexError::IndexOpen {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    fn read_footprints(&self) -> Result<Vec<TileFootprint>> {
        let mut reader =
            ::shapefile::Reader::from_path(&self.path).map_err(|e| self.open_error(e))?;

        let mut footprints = Vec::new();
        for (id, item) in reader.iter_shapes_and_records().enumerate() {
            let (shape, record) = item.map_err(|e| self.open_error(e))?;

            let Some(envelope) = shape_envelope(&shape) else {
                warn!(path = %self.path.display(), record = id, "Skipping index record without a footprint");
                continue;
            };

            let location = match record.get(&self.field_name) {
                Some(FieldValue::Character(value)) => value.clone(),
                Some(FieldValue::Memo(value)) => Some(value.clone()),
                Some(_) => {
                    warn!(record = id, field = %self.field_name, "Path field is not a text field");
                    None
                }
                None => None,
            };

            footprints.push(TileFootprint::new(id, envelope, location));
        }
        Ok(footprints)
    }
}

fn shape_envelope(shape: &Shape) -> Option<BoundingBox> {
    let (min, max) = match shape {
        Shape::Polygon(p) => {
            let b = p.bbox();
            ((b.min.x, b.min.y), (b.max.x, b.max.y))
        }
        Shape::PolygonM(p) => {
            let b = p.bbox();
            ((b.min.x, b.min.y), (b.max.x, b.max.y))
        }
        Shape::PolygonZ(p) => {
            let b = p.bbox();
            ((b.min.x, b.min.y), (b.max.x, b.max.y))
        }
        _ => return None,
    };
    Some(BoundingBox::new(min.0, min.1, max.0, max.1))
}

impl FootprintSource for ShapefileFootprintSource {
    fn open(&mut self) -> Result<()> {
        if self.disposed {
            return Err(self.open_error("source has been disposed"));
        }
        if self.index.is_some() {
            return Ok(());
        }

        let stamp = self.stamp();
        if let (Some(stamp), Some(cached)) = (stamp, &self.cached) {
            if cached.stamp == stamp {
                debug!(path = %self.path.display(), "Reusing tile index");
                self.index = Some(Arc::clone(&cached.tree));
                return Ok(());
            }
        }

        let footprints = self.read_footprints()?;
        self.loads += 1;
        debug!(path = %self.path.display(), records = footprints.len(), "Opened tile index");
        let tree = Arc::new(RTree::bulk_load(
            footprints.into_iter().map(IndexedFootprint).collect(),
        ));
        self.cached = stamp.map(|stamp| CachedIndex {
            stamp,
            tree: Arc::clone(&tree),
        });
        self.index = Some(tree);
        Ok(())
    }

    fn close(&mut self) {
        self.index = None;
    }

    fn is_open(&self) -> bool {
        self.index.is_some()
    }

    fn intersection_query(&mut self, envelope: &BoundingBox) -> Result<Vec<TileFootprint>> {
        let index = self.index.as_ref().ok_or(TileIndexError::IndexNotOpen)?;
        let query = AABB::from_corners(
            [envelope.min_x, envelope.min_y],
            [envelope.max_x, envelope.max_y],
        );

        let mut hits: Vec<TileFootprint> = index
            .locate_in_envelope_intersecting(&query)
            .map(|f| f.0.clone())
            .collect();
        hits.sort_by_key(|f| f.id);
        Ok(hits)
    }

    fn extents(&mut self) -> Result<Option<BoundingBox>> {
        let index = self.index.as_ref().ok_or(TileIndexError::IndexNotOpen)?;
        Ok(index
            .iter()
            .map(|f| f.0.envelope)
            .reduce(|acc, e| acc.union(&e)))
    }

    fn dispose(&mut self) {
        if !self.disposed {
            info!(path = %self.path.display(), "Releasing tile index");
        }
        self.index = None;
        self.cached = None;
        self.disposed = true;
    }
}
