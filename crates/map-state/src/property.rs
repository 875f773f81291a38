//! Names of the host properties observers can watch.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    MapExtent,
    MapCenter,
    MapZoom,
    MapMinZoom,
    MapMaxZoom,
    MapSrid,
    MaxExtent,
    ActiveTool,
    CustomTool,
    BackgroundLayer,
    MapLayers,
    DefinedGeometry,
    IsMapRendering,
    IsMapVisible,
    IsMouseDown,
    CurrentMouseCoordinate,
    CurrentMouseCoordinateString,
}

impl Property {
    pub fn name(&self) -> &'static str {
        match self {
            Property::MapExtent => "MapExtent",
            Property::MapCenter => "MapCenter",
            Property::MapZoom => "MapZoom",
            Property::MapMinZoom => "MapMinZoom",
            Property::MapMaxZoom => "MapMaxZoom",
            Property::MapSrid => "MapSRID",
            Property::MaxExtent => "MaxExtent",
            Property::ActiveTool => "ActiveTool",
            Property::CustomTool => "CustomTool",
            Property::BackgroundLayer => "BackgroundLayer",
            Property::MapLayers => "MapLayers",
            Property::DefinedGeometry => "DefinedGeometry",
            Property::IsMapRendering => "IsMapRendering",
            Property::IsMapVisible => "IsMapVisible",
            Property::IsMouseDown => "IsMouseDown",
            Property::CurrentMouseCoordinate => "CurrentMouseCoordinate",
            Property::CurrentMouseCoordinateString => "CurrentMouseCoordinateString",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
