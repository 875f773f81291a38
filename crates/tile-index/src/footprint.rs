//! Tile footprint records read from an index.

use map_common::BoundingBox;
use serde::{Deserialize, Serialize};

/// One index record: where a tile lies and which file holds its imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileFootprint {
    /// Position of the record in the index (its native order).
    pub id: usize,
    /// Envelope of the footprint geometry.
    pub envelope: BoundingBox,
    /// Raw value of the path field, if the record has one.
    pub location: Option<String>,
}

impl TileFootprint {
    pub fn new(id: usize, envelope: BoundingBox, location: Option<String>) -> Self {
        Self {
            id,
            envelope,
            location,
        }
    }

    /// The path field with surrounding whitespace removed, `None` when blank.
    pub fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_location_is_none() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(TileFootprint::new(0, bbox, Some("   ".into())).location(), None);
        assert_eq!(TileFootprint::new(0, bbox, None).location(), None);
        assert_eq!(
            TileFootprint::new(0, bbox, Some(" a.tif ".into())).location(),
            Some("a.tif")
        );
    }
}
