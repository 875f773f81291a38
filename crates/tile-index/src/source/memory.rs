use map_common::BoundingBox;

use super::FootprintSource;
use crate::error::{Result, TileIndexError};
use crate::footprint::TileFootprint;

/// Footprints held in memory, scanned linearly. Useful for indexes built in
/// code and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFootprintSource {
    footprints: Vec<TileFootprint>,
    open: bool,
}

impl MemoryFootprintSource {
    pub fn new(footprints: Vec<TileFootprint>) -> Self {
        Self {
            footprints,
            open: false,
        }
    }

    /// Build from `(envelope, location)` pairs, numbering records in order.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BoundingBox, Option<S>)>,
        S: Into<String>,
    {
        let footprints = entries
            .into_iter()
            .enumerate()
            .map(|(id, (envelope, location))| {
                TileFootprint::new(id, envelope, location.map(Into::into))
            })
            .collect();
        Self::new(footprints)
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

impl FootprintSource for MemoryFootprintSource {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn intersection_query(&mut self, envelope: &BoundingBox) -> Result<Vec<TileFootprint>> {
        if !self.open {
            return Err(TileIndexError::IndexNotOpen);
        }
        Ok(self
            .footprints
            .iter()
            .filter(|f| f.envelope.touches(envelope))
            .cloned()
            .collect())
    }

    fn extents(&mut self) -> Result<Option<BoundingBox>> {
        if !self.open {
            return Err(TileIndexError::IndexNotOpen);
        }
        Ok(self
            .footprints
            .iter()
            .map(|f| f.envelope)
            .reduce(|acc, e| acc.union(&e)))
    }

    fn dispose(&mut self) {
        self.open = false;
        self.footprints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemoryFootprintSource {
        MemoryFootprintSource::from_entries([
            (BoundingBox::new(0.0, 0.0, 10.0, 10.0), Some("a.png")),
            (BoundingBox::new(10.0, 0.0, 20.0, 10.0), Some("b.png")),
            (BoundingBox::new(50.0, 50.0, 60.0, 60.0), None),
        ])
    }

    #[test]
    fn test_query_requires_open() {
        let mut s = source();
        assert!(matches!(
            s.intersection_query(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
            Err(TileIndexError::IndexNotOpen)
        ));
    }

    #[test]
    fn test_query_keeps_native_order() {
        let mut s = source();
        s.open().unwrap();
        let hits = s
            .intersection_query(&BoundingBox::new(5.0, 5.0, 15.0, 6.0))
            .unwrap();
        let ids: Vec<usize> = hits.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_extents_union() {
        let mut s = source();
        s.open().unwrap();
        assert_eq!(
            s.extents().unwrap(),
            Some(BoundingBox::new(0.0, 0.0, 60.0, 60.0))
        );
    }
}
