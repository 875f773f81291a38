//! Events raised by map widgets and input delivered to them.

use map_common::{BoundingBox, Coordinate, Geometry};

use crate::tool::Tool;

/// Screen position in widget pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pointer event payload: where it happened on screen and on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub world: Coordinate,
    pub screen: ScreenPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    ExtentChanged(BoundingBox),
    CenterChanged(Coordinate),
    ZoomChanged(f64),
    ActiveToolChanged(Tool),
    GeometryDefined(Geometry),
    Refreshing,
    Refreshed,
    MouseMove(PointerEvent),
    MouseDown(PointerEvent),
    MouseUp(PointerEvent),
    DoubleClick(PointerEvent),
    VisibilityChanged(bool),
}

/// Keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Escape,
    Char(char),
}
