//! A headless map widget rendering its layers into an RGBA frame.
//!
//! The view is defined by a center and a zoom, the zoom being the ground
//! width of the frame. The ground height follows from the frame's aspect
//! ratio, so pixels are always square on the ground.

use std::collections::VecDeque;

use image::RgbaImage;
use map_common::{BoundingBox, Coordinate, Geometry, LayerRef, Viewport};
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::event::{PointerEvent, ScreenPoint, WidgetEvent};
use crate::tool::{CustomTool, Tool};
use crate::widget::MapWidget;

pub const DEFAULT_MIN_ZOOM: f64 = f64::EPSILON;
pub const DEFAULT_MAX_ZOOM: f64 = f64::MAX;

pub struct MapView {
    width: u32,
    height: u32,
    center: Coordinate,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    srid: i32,
    max_extent: Option<BoundingBox>,
    enforce_max_extent: bool,
    tool: Tool,
    custom_tool: Option<CustomTool>,
    background: Vec<LayerRef>,
    layers: Vec<LayerRef>,
    drawing: Vec<Coordinate>,
    mouse_down_at: Option<ScreenPoint>,
    visible: bool,
    frame: RgbaImage,
    refresh_count: u64,
    events: VecDeque<WidgetEvent>,
}

impl MapView {
    /// A view of `width` x `height` pixels centred on the origin, one ground
    /// unit wide.
    pub fn new(width: u32, height: u32) -> StateResult<Self> {
        if width == 0 || height == 0 {
            return Err(StateError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            center: Coordinate::default(),
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            srid: 0,
            max_extent: None,
            enforce_max_extent: false,
            tool: Tool::None,
            custom_tool: None,
            background: Vec::new(),
            layers: Vec::new(),
            drawing: Vec::new(),
            mouse_down_at: None,
            visible: true,
            frame: RgbaImage::new(width, height),
            refresh_count: 0,
            events: VecDeque::new(),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize the frame, keeping center and zoom.
    pub fn set_size(&mut self, width: u32, height: u32) -> StateResult<()> {
        if width == 0 || height == 0 {
            return Err(StateError::InvalidSize { width, height });
        }
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.frame = RgbaImage::new(width, height);
        self.apply_view(self.center, self.zoom);
        self.events.push_back(WidgetEvent::ExtentChanged(self.extent()));
        Ok(())
    }

    /// The last rendered frame.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// How many times the view has been redrawn.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn drawing_vertices(&self) -> &[Coordinate] {
        &self.drawing
    }

    pub fn viewport(&self) -> StateResult<Viewport> {
        Ok(Viewport::new(self.extent(), self.width, self.height)?)
    }

    /// Ground units per pixel.
    pub fn resolution(&self) -> f64 {
        self.zoom / self.width as f64
    }

    fn ground_height(&self, zoom: f64) -> f64 {
        zoom * self.height as f64 / self.width as f64
    }

    pub fn screen_to_world(&self, point: ScreenPoint) -> Coordinate {
        let extent = self.extent();
        let res = self.resolution();
        Coordinate::new(
            extent.min_x + point.x as f64 * res,
            extent.max_y - point.y as f64 * res,
        )
    }

    /// Clamp a requested view to the zoom limits and, when enforced, the
    /// maximum extent; queue change events for whatever moved.
    fn apply_view(&mut self, center: Coordinate, zoom: f64) {
        let mut zoom = zoom.max(self.min_zoom).min(self.max_zoom);
        let mut center = center;

        if let Some(max) = self.max_extent.filter(|_| self.enforce_max_extent) {
            let fit = max
                .width()
                .min(max.height() * self.width as f64 / self.height as f64);
            if zoom > fit {
                zoom = fit;
            }
            let half_w = zoom / 2.0;
            let half_h = self.ground_height(zoom) / 2.0;
            center.x = center.x.max(max.min_x + half_w).min(max.max_x - half_w);
            center.y = center.y.max(max.min_y + half_h).min(max.max_y - half_h);
        }

        let zoom_changed = zoom != self.zoom;
        let center_changed = center != self.center;
        self.zoom = zoom;
        self.center = center;

        if zoom_changed {
            self.events.push_back(WidgetEvent::ZoomChanged(zoom));
        }
        if center_changed {
            self.events.push_back(WidgetEvent::CenterChanged(center));
        }
        if zoom_changed || center_changed {
            self.events.push_back(WidgetEvent::ExtentChanged(self.extent()));
        }
    }

    fn pointer(&self, screen: ScreenPoint) -> PointerEvent {
        PointerEvent {
            world: self.screen_to_world(screen),
            screen,
        }
    }

    pub fn mouse_move(&mut self, screen: ScreenPoint) {
        let event = self.pointer(screen);
        self.events.push_back(WidgetEvent::MouseMove(event));
    }

    pub fn mouse_down(&mut self, screen: ScreenPoint) {
        self.mouse_down_at = Some(screen);
        let event = self.pointer(screen);
        self.events.push_back(WidgetEvent::MouseDown(event));
    }

    /// Releasing where the button went down places a vertex with a drawing
    /// tool; releasing elsewhere with the pan tool drags the map.
    pub fn mouse_up(&mut self, screen: ScreenPoint) {
        let event = self.pointer(screen);
        self.events.push_back(WidgetEvent::MouseUp(event));

        let Some(down) = self.mouse_down_at.take() else {
            return;
        };
        if down == screen {
            self.place_vertex(event.world);
        } else if self.tool == Tool::Pan {
            let res = self.resolution();
            let dx = (screen.x - down.x) as f64 * res;
            let dy = (screen.y - down.y) as f64 * res;
            self.apply_view(self.center.offset(-dx, dy), self.zoom);
        }
    }

    pub fn double_click(&mut self, screen: ScreenPoint) {
        let event = self.pointer(screen);
        self.events.push_back(WidgetEvent::DoubleClick(event));
        if matches!(self.tool, Tool::DrawLine | Tool::DrawPolygon) {
            self.finish_drawing();
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.events.push_back(WidgetEvent::VisibilityChanged(visible));
        }
    }

    fn place_vertex(&mut self, world: Coordinate) {
        match self.tool {
            Tool::DrawPoint => self
                .events
                .push_back(WidgetEvent::GeometryDefined(Geometry::Point(world))),
            Tool::DrawLine | Tool::DrawPolygon => self.drawing.push(world),
            _ => {}
        }
    }

    fn render_frame(&mut self) {
        let mut frame = RgbaImage::new(self.width, self.height);
        match self.viewport() {
            Ok(viewport) => {
                for layer in self.background.iter().chain(&self.layers) {
                    if let Err(e) = layer.render(&mut frame, &viewport) {
                        warn!(layer = layer.name(), error = %e, "Layer failed to render");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Cannot render view"),
        }
        self.frame = frame;
    }
}

impl MapWidget for MapView {
    fn extent(&self) -> BoundingBox {
        BoundingBox::from_center(self.center, self.zoom, self.ground_height(self.zoom))
    }

    fn zoom_to_box(&mut self, envelope: &BoundingBox) {
        let fit = envelope
            .width()
            .max(envelope.height() * self.width as f64 / self.height as f64);
        let zoom = if fit > 0.0 { fit } else { self.zoom };
        self.apply_view(envelope.center(), zoom);
    }

    fn zoom_to_extents(&mut self) {
        let extents = self
            .background
            .iter()
            .chain(&self.layers)
            .filter_map(|l| l.envelope())
            .reduce(|acc, e| acc.union(&e));
        match extents {
            Some(extents) => self.zoom_to_box(&extents),
            None => debug!("No layer extents to zoom to"),
        }
    }

    fn center(&self) -> Coordinate {
        self.center
    }

    fn set_center(&mut self, center: Coordinate) {
        self.apply_view(center, self.zoom);
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.apply_view(self.center, zoom);
    }

    fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    fn set_min_zoom(&mut self, zoom: f64) {
        self.min_zoom = zoom;
        self.apply_view(self.center, self.zoom);
    }

    fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    fn set_max_zoom(&mut self, zoom: f64) {
        self.max_zoom = zoom;
        self.apply_view(self.center, self.zoom);
    }

    fn srid(&self) -> i32 {
        self.srid
    }

    fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    fn max_extent(&self) -> Option<BoundingBox> {
        self.max_extent
    }

    fn set_max_extent(&mut self, extent: Option<BoundingBox>) {
        self.max_extent = extent;
        self.apply_view(self.center, self.zoom);
    }

    fn enforce_max_extent(&self) -> bool {
        self.enforce_max_extent
    }

    fn set_enforce_max_extent(&mut self, enforce: bool) {
        self.enforce_max_extent = enforce;
        self.apply_view(self.center, self.zoom);
    }

    fn active_tool(&self) -> Tool {
        self.tool
    }

    fn set_active_tool(&mut self, tool: Tool) {
        if self.tool == tool {
            return;
        }
        self.drawing.clear();
        self.tool = tool;
        self.events.push_back(WidgetEvent::ActiveToolChanged(tool));
    }

    fn custom_tool(&self) -> Option<&CustomTool> {
        self.custom_tool.as_ref()
    }

    fn set_custom_tool(&mut self, tool: Option<CustomTool>) {
        self.custom_tool = tool;
    }

    fn background_layers(&self) -> &[LayerRef] {
        &self.background
    }

    fn clear_background_layers(&mut self) {
        self.background.clear();
    }

    fn add_background_layer(&mut self, layer: LayerRef) {
        self.background.push(layer);
    }

    fn layers(&self) -> &[LayerRef] {
        &self.layers
    }

    fn add_layer(&mut self, layer: LayerRef) {
        self.layers.push(layer);
    }

    fn remove_layer(&mut self, layer: &LayerRef) -> bool {
        match self.layers.iter().position(|l| l == layer) {
            Some(index) => {
                self.layers.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear_layers(&mut self) {
        self.layers.clear();
    }

    fn refresh(&mut self) {
        self.events.push_back(WidgetEvent::Refreshing);
        self.render_frame();
        self.refresh_count += 1;
        self.events.push_back(WidgetEvent::Refreshed);
    }

    fn finish_drawing(&mut self) {
        let geometry = match self.tool {
            Tool::DrawLine if self.drawing.len() >= 2 => {
                Geometry::LineString(std::mem::take(&mut self.drawing))
            }
            Tool::DrawPolygon if self.drawing.len() >= 3 => {
                Geometry::Polygon(std::mem::take(&mut self.drawing))
            }
            _ => return,
        };
        self.events.push_back(WidgetEvent::GeometryDefined(geometry));
    }

    fn undo_drawing(&mut self) {
        self.drawing.pop();
    }

    fn cancel_drawing(&mut self) {
        self.drawing.clear();
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent> {
        self.events.drain(..).collect()
    }
}
