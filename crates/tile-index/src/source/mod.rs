//! Spatial index sources of tile footprints.
//!
//! A source is opened for the duration of one query and closed again; the
//! layer holds it across renders and disposes it once.

mod memory;
mod shp;

pub use memory::MemoryFootprintSource;
pub use shp::ShapefileFootprintSource;

use map_common::BoundingBox;

use crate::error::Result;
use crate::footprint::TileFootprint;

/// Provider of tile footprints intersecting a query envelope.
pub trait FootprintSource: Send {
    fn open(&mut self) -> Result<()>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Footprints whose envelope intersects (or touches) `envelope`, in the
    /// source's native record order. The source must be open.
    fn intersection_query(&mut self, envelope: &BoundingBox) -> Result<Vec<TileFootprint>>;

    /// Union of all footprint envelopes, `None` for an empty index.
    /// The source must be open.
    fn extents(&mut self) -> Result<Option<BoundingBox>>;

    /// Release everything the source holds. Called once by the owning layer.
    fn dispose(&mut self);
}

/// Keeps a source open for a scope and closes it on every exit path.
pub struct SourceSession<'a> {
    source: &'a mut dyn FootprintSource,
}

impl<'a> SourceSession<'a> {
    pub fn open(source: &'a mut dyn FootprintSource) -> Result<Self> {
        source.open()?;
        Ok(Self { source })
    }

    pub fn intersection_query(&mut self, envelope: &BoundingBox) -> Result<Vec<TileFootprint>> {
        self.source.intersection_query(envelope)
    }

    pub fn extents(&mut self) -> Result<Option<BoundingBox>> {
        self.source.extents()
    }
}

impl Drop for SourceSession<'_> {
    fn drop(&mut self) {
        self.source.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_closes_on_drop() {
        let mut source = MemoryFootprintSource::new(vec![]);
        {
            let mut session = SourceSession::open(&mut source).unwrap();
            assert!(session.extents().unwrap().is_none());
        }
        assert!(!source.is_open());
    }
}
