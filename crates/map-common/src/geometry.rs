//! Minimal vector geometry for user-drawn shapes.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Coordinate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    /// Exterior ring; closing vertex optional.
    Polygon(Vec<Coordinate>),
}

impl Geometry {
    pub fn vertices(&self) -> &[Coordinate] {
        match self {
            Geometry::Point(c) => std::slice::from_ref(c),
            Geometry::LineString(v) | Geometry::Polygon(v) => v,
        }
    }

    pub fn envelope(&self) -> Option<BoundingBox> {
        let mut iter = self.vertices().iter();
        let first = iter.next()?;
        let start = BoundingBox::from_corners(*first, *first);
        Some(iter.fold(start, |acc, c| acc.union(&BoundingBox::from_corners(*c, *c))))
    }
}
