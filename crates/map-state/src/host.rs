//! Two-way bridge between observable host properties and a map widget.
//!
//! ```text
//!   host setter ──► gate (value differs from widget?) ──► widget write ──► refresh
//!        ▲                                                      │
//!        │                                                      ▼
//!   notify subscribers ◄── host property ◄── widget event (same gate)
//! ```
//!
//! Widget events go back through the inbound setters. The gate compares
//! against the widget's current value, so an echoed value never writes the
//! widget a second time and the two sides cannot ping-pong.

use std::sync::Arc;

use map_common::{BoundingBox, Coordinate, Geometry, LayerRef};
use tracing::{debug, trace};

use crate::dispatch::{DispatchMessage, Dispatcher, RenderSignal};
use crate::edit_layer::EditLayer;
use crate::error::{StateError, StateResult};
use crate::event::{Key, ScreenPoint, WidgetEvent};
use crate::layers::{apply_layer_change, replace_layers, LayerChange, LayerCollection};
use crate::property::Property;
use crate::tool::{CustomTool, Tool};
use crate::widget::MapWidget;

/// Zoom values closer than this are considered equal.
pub const ZOOM_TOLERANCE: f64 = 1e-4;

type Subscriber = Box<dyn FnMut(Property)>;
type Command = Box<dyn FnMut(Coordinate)>;

/// The host-side copy of every synchronised property.
#[derive(Debug, Clone, PartialEq)]
struct HostState {
    map_extent: BoundingBox,
    map_center: Coordinate,
    map_zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    srid: i32,
    max_extent: Option<BoundingBox>,
    active_tool: Tool,
    custom_tool: Option<CustomTool>,
    background_layer: Option<LayerRef>,
    defined_geometry: Option<Geometry>,
    is_map_rendering: bool,
    is_map_visible: bool,
    is_mouse_down: bool,
    current_mouse_coordinate: Option<Coordinate>,
}

impl HostState {
    fn from_widget<W: MapWidget>(widget: &W) -> Self {
        Self {
            map_extent: widget.extent(),
            map_center: widget.center(),
            map_zoom: widget.zoom(),
            min_zoom: widget.min_zoom(),
            max_zoom: widget.max_zoom(),
            srid: widget.srid(),
            max_extent: widget.max_extent(),
            active_tool: widget.active_tool(),
            custom_tool: widget.custom_tool().cloned(),
            background_layer: widget.background_layers().first().cloned(),
            defined_geometry: None,
            is_map_rendering: false,
            is_map_visible: true,
            is_mouse_down: false,
            current_mouse_coordinate: None,
        }
    }
}

struct EditLayerHandle {
    layer: Arc<EditLayer>,
    layer_ref: LayerRef,
}

pub struct MapHost<W: MapWidget> {
    widget: W,
    state: HostState,
    layers: LayerCollection,
    edit_layer: Option<EditLayerHandle>,
    subscribers: Vec<Subscriber>,
    on_click: Option<Command>,
    on_double_click: Option<Command>,
    mouse_down_at: Option<ScreenPoint>,
    dispatcher: Dispatcher,
    attached: bool,
}

impl<W: MapWidget> MapHost<W> {
    /// Attach to `widget`, taking its current state as the initial property
    /// values. Events the widget queued earlier are discarded.
    pub fn new(mut widget: W) -> Self {
        widget.drain_events();
        let state = HostState::from_widget(&widget);
        let layers = widget.layers().iter().cloned().collect();
        Self {
            widget,
            state,
            layers,
            edit_layer: None,
            subscribers: Vec::new(),
            on_click: None,
            on_double_click: None,
            mouse_down_at: None,
            dispatcher: Dispatcher::new(),
            attached: true,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Direct widget access, e.g. to deliver pointer input. Call
    /// [`pump`](Self::pump) afterwards to forward the resulting events.
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Register a change observer, called with the name of each property
    /// whose value changed.
    pub fn subscribe(&mut self, subscriber: impl FnMut(Property) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn set_on_click(&mut self, command: impl FnMut(Coordinate) + 'static) {
        self.on_click = Some(Box::new(command));
    }

    pub fn set_on_double_click(&mut self, command: impl FnMut(Coordinate) + 'static) {
        self.on_double_click = Some(Box::new(command));
    }

    /// Handle for renderers reporting progress from other threads.
    pub fn render_signal(&self) -> RenderSignal {
        self.dispatcher.signal()
    }

    // === Property getters ===

    pub fn map_extent(&self) -> BoundingBox {
        self.state.map_extent
    }

    pub fn map_center(&self) -> Coordinate {
        self.state.map_center
    }

    pub fn map_zoom(&self) -> f64 {
        self.state.map_zoom
    }

    pub fn min_zoom(&self) -> f64 {
        self.state.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.state.max_zoom
    }

    pub fn srid(&self) -> i32 {
        self.state.srid
    }

    pub fn max_extent(&self) -> Option<BoundingBox> {
        self.state.max_extent
    }

    pub fn active_tool(&self) -> Tool {
        self.state.active_tool
    }

    pub fn custom_tool(&self) -> Option<&CustomTool> {
        self.state.custom_tool.as_ref()
    }

    pub fn background_layer(&self) -> Option<&LayerRef> {
        self.state.background_layer.as_ref()
    }

    pub fn map_layers(&self) -> &LayerCollection {
        &self.layers
    }

    pub fn defined_geometry(&self) -> Option<&Geometry> {
        self.state.defined_geometry.as_ref()
    }

    pub fn edit_layer(&self) -> Option<&Arc<EditLayer>> {
        self.edit_layer.as_ref().map(|h| &h.layer)
    }

    pub fn is_map_rendering(&self) -> bool {
        self.state.is_map_rendering
    }

    pub fn is_map_visible(&self) -> bool {
        self.state.is_map_visible
    }

    pub fn is_mouse_down(&self) -> bool {
        self.state.is_mouse_down
    }

    pub fn current_mouse_coordinate(&self) -> Option<Coordinate> {
        self.state.current_mouse_coordinate
    }

    /// Mouse position in whole ground units, empty before the first move.
    pub fn current_mouse_coordinate_string(&self) -> String {
        self.state
            .current_mouse_coordinate
            .map(|c| c.to_string())
            .unwrap_or_default()
    }

    // === Inbound setters ===

    pub fn set_map_extent(&mut self, extent: BoundingBox) -> StateResult<()> {
        self.ensure_attached()?;
        self.apply_map_extent(extent);
        Ok(())
    }

    /// `None` is ignored.
    pub fn set_map_center(&mut self, center: Option<Coordinate>) -> StateResult<()> {
        self.ensure_attached()?;
        if let Some(center) = center {
            self.apply_map_center(center);
        }
        Ok(())
    }

    pub fn set_map_zoom(&mut self, zoom: f64) -> StateResult<()> {
        self.ensure_attached()?;
        self.apply_map_zoom(zoom);
        Ok(())
    }

    pub fn set_min_zoom(&mut self, zoom: f64) -> StateResult<()> {
        self.ensure_attached()?;
        if zoom > self.widget.max_zoom() {
            return Err(StateError::InvalidZoomRange {
                min: zoom,
                max: self.widget.max_zoom(),
            });
        }
        if self.state.min_zoom != zoom {
            self.state.min_zoom = zoom;
            self.notify(Property::MapMinZoom);
        }
        if zoom_eq(self.widget.min_zoom(), zoom) {
            return Ok(());
        }
        self.widget.set_min_zoom(zoom);
        self.refresh_widget();
        Ok(())
    }

    pub fn set_max_zoom(&mut self, zoom: f64) -> StateResult<()> {
        self.ensure_attached()?;
        if zoom < self.widget.min_zoom() {
            return Err(StateError::InvalidZoomRange {
                min: self.widget.min_zoom(),
                max: zoom,
            });
        }
        if self.state.max_zoom != zoom {
            self.state.max_zoom = zoom;
            self.notify(Property::MapMaxZoom);
        }
        if zoom_eq(self.widget.max_zoom(), zoom) {
            return Ok(());
        }
        self.widget.set_max_zoom(zoom);
        self.refresh_widget();
        Ok(())
    }

    pub fn set_srid(&mut self, srid: i32) -> StateResult<()> {
        self.ensure_attached()?;
        if self.state.srid != srid {
            self.state.srid = srid;
            self.notify(Property::MapSrid);
        }
        if self.widget.srid() == srid {
            return Ok(());
        }
        self.widget.set_srid(srid);
        self.refresh_widget();
        Ok(())
    }

    /// Constrain navigation to `extent`. `None` is ignored.
    pub fn set_max_extent(&mut self, extent: Option<BoundingBox>) -> StateResult<()> {
        self.ensure_attached()?;
        let Some(extent) = extent else {
            return Ok(());
        };
        if self.state.max_extent != Some(extent) {
            self.state.max_extent = Some(extent);
            self.notify(Property::MaxExtent);
        }
        if self.widget.max_extent() == Some(extent) {
            return Ok(());
        }
        self.widget.set_enforce_max_extent(true);
        self.widget.set_max_extent(Some(extent));
        self.refresh_widget();
        Ok(())
    }

    pub fn set_active_tool(&mut self, tool: Tool) -> StateResult<()> {
        self.ensure_attached()?;
        self.apply_active_tool(tool);
        Ok(())
    }

    pub fn set_custom_tool(&mut self, tool: Option<CustomTool>) -> StateResult<()> {
        self.ensure_attached()?;
        if self.state.custom_tool != tool {
            self.state.custom_tool = tool.clone();
            self.notify(Property::CustomTool);
        }
        if self.widget.custom_tool() == tool.as_ref() {
            return Ok(());
        }
        self.widget.set_custom_tool(tool);
        self.forward_widget_events();
        Ok(())
    }

    /// Show `layer` beneath every other layer, replacing the previous one.
    pub fn set_background_layer(&mut self, layer: Option<LayerRef>) -> StateResult<()> {
        self.ensure_attached()?;
        if self.state.background_layer != layer {
            self.state.background_layer = layer.clone();
            self.notify(Property::BackgroundLayer);
        }
        let current = self.widget.background_layers();
        let unchanged = match &layer {
            Some(l) => current.len() == 1 && &current[0] == l,
            None => current.is_empty(),
        };
        if unchanged {
            return Ok(());
        }
        self.widget.clear_background_layers();
        if let Some(layer) = layer {
            self.widget.add_background_layer(layer);
        }
        self.refresh_widget();
        Ok(())
    }

    /// Show `geometry` on the edit layer, creating the layer on first use.
    /// `None` clears it.
    pub fn set_defined_geometry(&mut self, geometry: Option<Geometry>) -> StateResult<()> {
        self.ensure_attached()?;
        self.apply_defined_geometry(geometry);
        Ok(())
    }

    // === Layer list ===

    pub fn add_layer(&mut self, layer: LayerRef) -> StateResult<()> {
        self.ensure_attached()?;
        let change = self.layers.push(layer);
        self.layers_changed(&change);
        Ok(())
    }

    /// Returns false when the layer was not in the list.
    pub fn remove_layer(&mut self, layer: &LayerRef) -> StateResult<bool> {
        self.ensure_attached()?;
        match self.layers.remove(layer) {
            Some(change) => {
                self.layers_changed(&change);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear_layers(&mut self) -> StateResult<()> {
        self.ensure_attached()?;
        let change = self.layers.clear();
        self.layers_changed(&change);
        Ok(())
    }

    /// Replace the whole layer list. Widget layers that belonged to the old
    /// list are removed; new ones not yet shown are added.
    pub fn set_map_layers(&mut self, layers: LayerCollection) -> StateResult<()> {
        self.ensure_attached()?;
        if self.layers == layers {
            return Ok(());
        }
        replace_layers(&mut self.widget, &self.layers, &layers);
        self.layers = layers;
        self.forget_orphaned_edit_layer();
        self.notify(Property::MapLayers);
        self.refresh_widget();
        Ok(())
    }

    fn layers_changed(&mut self, change: &LayerChange) {
        apply_layer_change(&mut self.widget, change);
        self.forget_orphaned_edit_layer();
        self.notify(Property::MapLayers);
        self.refresh_widget();
    }

    /// Drop the edit layer handle once it left the list, so the next
    /// geometry recreates it.
    fn forget_orphaned_edit_layer(&mut self) {
        let orphaned = self
            .edit_layer
            .as_ref()
            .is_some_and(|h| !self.layers.contains(&h.layer_ref));
        if orphaned {
            self.edit_layer = None;
        }
    }

    // === Commands ===

    pub fn finish_drawing(&mut self) -> StateResult<()> {
        self.ensure_attached()?;
        self.widget.finish_drawing();
        self.forward_widget_events();
        Ok(())
    }

    pub fn undo_drawing(&mut self) -> StateResult<()> {
        self.ensure_attached()?;
        self.widget.undo_drawing();
        self.forward_widget_events();
        Ok(())
    }

    pub fn cancel_drawing(&mut self) -> StateResult<()> {
        self.ensure_attached()?;
        self.widget.cancel_drawing();
        self.forward_widget_events();
        Ok(())
    }

    /// Arrow keys pan by half the visible width or height. Returns whether
    /// the key was handled; other keys leave the map untouched.
    pub fn handle_key(&mut self, key: Key) -> StateResult<bool> {
        self.ensure_attached()?;
        let extent = self.widget.extent();
        let (dx, dy) = match key {
            Key::Left => (-extent.width() / 2.0, 0.0),
            Key::Right => (extent.width() / 2.0, 0.0),
            Key::Up => (0.0, extent.height() / 2.0),
            Key::Down => (0.0, -extent.height() / 2.0),
            _ => return Ok(false),
        };
        let center = self.widget.center().offset(dx, dy);
        self.widget.set_center(center);
        self.refresh_widget();
        Ok(true)
    }

    pub fn zoom_to_extents(&mut self) -> StateResult<()> {
        self.ensure_attached()?;
        self.widget.zoom_to_extents();
        self.refresh_widget();
        Ok(())
    }

    pub fn zoom_to_envelope(&mut self, envelope: &BoundingBox) -> StateResult<()> {
        self.ensure_attached()?;
        self.widget.zoom_to_box(envelope);
        self.refresh_widget();
        Ok(())
    }

    /// Forward pending widget events and apply notifications queued by
    /// render signals. Returns the number of items processed.
    pub fn pump(&mut self) -> usize {
        let messages = self.dispatcher.drain();
        if !self.attached {
            self.widget.drain_events();
            return 0;
        }
        let mut processed = messages.len();
        for message in messages {
            match message {
                DispatchMessage::RenderStarted => self.set_rendering(true),
                DispatchMessage::RenderFinished => self.set_rendering(false),
            }
        }
        processed += self.forward_widget_events();
        processed
    }

    /// Stop forwarding widget events. Later calls are no-ops.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.widget.drain_events();
        self.dispatcher.drain();
        self.mouse_down_at = None;
        debug!("Map host detached from widget");
    }

    // === Internals ===

    fn ensure_attached(&self) -> StateResult<()> {
        if self.attached {
            Ok(())
        } else {
            Err(StateError::Detached)
        }
    }

    fn notify(&mut self, property: Property) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(property);
        }
    }

    fn refresh_widget(&mut self) {
        self.widget.refresh();
        self.forward_widget_events();
    }

    fn apply_map_extent(&mut self, extent: BoundingBox) {
        if self.state.map_extent != extent {
            self.state.map_extent = extent;
            self.notify(Property::MapExtent);
        }
        if self.widget.extent() == extent {
            trace!(%extent, "Widget already shows extent");
            return;
        }
        self.widget.zoom_to_box(&extent);
        self.refresh_widget();
    }

    fn apply_map_center(&mut self, center: Coordinate) {
        if self.state.map_center != center {
            self.state.map_center = center;
            self.notify(Property::MapCenter);
        }
        if self.widget.center() == center {
            return;
        }
        self.widget.set_center(center);
        self.refresh_widget();
    }

    fn apply_map_zoom(&mut self, zoom: f64) {
        if self.state.map_zoom != zoom {
            self.state.map_zoom = zoom;
            self.notify(Property::MapZoom);
        }
        if zoom_eq(self.widget.zoom(), zoom) {
            return;
        }
        self.widget.set_zoom(zoom);
        self.refresh_widget();
    }

    fn apply_active_tool(&mut self, tool: Tool) {
        if self.state.active_tool != tool {
            self.state.active_tool = tool;
            self.notify(Property::ActiveTool);
        }
        if self.widget.active_tool() == tool {
            return;
        }
        self.widget.set_active_tool(tool);
        self.forward_widget_events();
    }

    fn apply_defined_geometry(&mut self, geometry: Option<Geometry>) {
        if self.state.defined_geometry == geometry && self.edit_layer.is_some() {
            return;
        }
        if self.state.defined_geometry != geometry {
            self.state.defined_geometry = geometry.clone();
            self.notify(Property::DefinedGeometry);
        }

        let layer = self.ensure_edit_layer();
        layer.set_geometry(geometry);
        self.refresh_widget();
    }

    fn ensure_edit_layer(&mut self) -> Arc<EditLayer> {
        if let Some(handle) = &self.edit_layer {
            return Arc::clone(&handle.layer);
        }

        let layer = Arc::new(EditLayer::new());
        let layer_ref = LayerRef::from_arc(layer.clone());
        let change = self.layers.push(layer_ref.clone());
        apply_layer_change(&mut self.widget, &change);
        self.notify(Property::MapLayers);
        debug!("Created edit layer");

        self.edit_layer = Some(EditLayerHandle {
            layer: Arc::clone(&layer),
            layer_ref,
        });
        layer
    }

    fn set_rendering(&mut self, rendering: bool) {
        if self.state.is_map_rendering != rendering {
            self.state.is_map_rendering = rendering;
            self.notify(Property::IsMapRendering);
        }
    }

    fn set_mouse_down(&mut self, down: bool) {
        if self.state.is_mouse_down != down {
            self.state.is_mouse_down = down;
            self.notify(Property::IsMouseDown);
        }
    }

    /// Drain the widget until it has nothing more to say.
    fn forward_widget_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let events = self.widget.drain_events();
            if events.is_empty() {
                return handled;
            }
            handled += events.len();
            for event in events {
                self.handle_widget_event(event);
            }
        }
    }

    fn handle_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::ExtentChanged(extent) => self.apply_map_extent(extent),
            WidgetEvent::CenterChanged(center) => self.apply_map_center(center),
            WidgetEvent::ZoomChanged(zoom) => self.apply_map_zoom(zoom),
            WidgetEvent::ActiveToolChanged(tool) => self.apply_active_tool(tool),
            WidgetEvent::GeometryDefined(geometry) => self.apply_defined_geometry(Some(geometry)),
            WidgetEvent::Refreshing => self.set_rendering(true),
            WidgetEvent::Refreshed => self.set_rendering(false),
            WidgetEvent::MouseMove(pointer) => {
                self.state.current_mouse_coordinate = Some(pointer.world);
                self.notify(Property::CurrentMouseCoordinate);
                self.notify(Property::CurrentMouseCoordinateString);
            }
            WidgetEvent::MouseDown(pointer) => {
                self.mouse_down_at = Some(pointer.screen);
                self.set_mouse_down(true);
            }
            WidgetEvent::MouseUp(pointer) => {
                if self.mouse_down_at.take() == Some(pointer.screen) {
                    if let Some(command) = self.on_click.as_mut() {
                        command(pointer.world);
                    }
                }
                self.set_mouse_down(false);
            }
            WidgetEvent::DoubleClick(pointer) => {
                let at = self.state.current_mouse_coordinate.unwrap_or(pointer.world);
                if let Some(command) = self.on_double_click.as_mut() {
                    command(at);
                }
            }
            WidgetEvent::VisibilityChanged(visible) => {
                if self.state.is_map_visible != visible {
                    self.state.is_map_visible = visible;
                    self.notify(Property::IsMapVisible);
                }
            }
        }
    }
}

fn zoom_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < ZOOM_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_eq_tolerance() {
        assert!(zoom_eq(10.0, 10.00005));
        assert!(!zoom_eq(10.0, 10.001));
    }
}
