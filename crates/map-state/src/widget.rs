//! The contract between the host bridge and an embedded map widget.

use map_common::{BoundingBox, Coordinate, LayerRef};

use crate::event::WidgetEvent;
use crate::tool::{CustomTool, Tool};

/// An embedded map widget as seen by [`MapHost`](crate::MapHost).
///
/// Setters update widget state and queue the matching [`WidgetEvent`]s
/// when a value actually changes; nothing is redrawn until
/// [`refresh`](Self::refresh).
pub trait MapWidget {
    /// Ground envelope currently shown.
    fn extent(&self) -> BoundingBox;

    /// Show `envelope`, keeping the widget's aspect ratio.
    fn zoom_to_box(&mut self, envelope: &BoundingBox);

    /// Show the union of every layer's envelope.
    fn zoom_to_extents(&mut self);

    fn center(&self) -> Coordinate;
    fn set_center(&mut self, center: Coordinate);

    /// Ground width of the view.
    fn zoom(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64);

    fn min_zoom(&self) -> f64;
    fn set_min_zoom(&mut self, zoom: f64);

    fn max_zoom(&self) -> f64;
    fn set_max_zoom(&mut self, zoom: f64);

    fn srid(&self) -> i32;
    fn set_srid(&mut self, srid: i32);

    fn max_extent(&self) -> Option<BoundingBox>;
    fn set_max_extent(&mut self, extent: Option<BoundingBox>);

    fn enforce_max_extent(&self) -> bool;
    fn set_enforce_max_extent(&mut self, enforce: bool);

    fn active_tool(&self) -> Tool;
    fn set_active_tool(&mut self, tool: Tool);

    fn custom_tool(&self) -> Option<&CustomTool>;
    fn set_custom_tool(&mut self, tool: Option<CustomTool>);

    fn background_layers(&self) -> &[LayerRef];
    fn clear_background_layers(&mut self);
    fn add_background_layer(&mut self, layer: LayerRef);

    fn layers(&self) -> &[LayerRef];
    fn add_layer(&mut self, layer: LayerRef);
    /// Returns false when the layer was not present.
    fn remove_layer(&mut self, layer: &LayerRef) -> bool;
    fn clear_layers(&mut self);

    fn contains_layer(&self, layer: &LayerRef) -> bool {
        self.layers().contains(layer)
    }

    /// Redraw every layer.
    fn refresh(&mut self);

    fn finish_drawing(&mut self);
    fn undo_drawing(&mut self);
    fn cancel_drawing(&mut self);

    /// Take the events queued since the last call, oldest first.
    fn drain_events(&mut self) -> Vec<WidgetEvent>;
}
