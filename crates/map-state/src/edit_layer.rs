//! Vector layer showing the user-defined geometry.

use std::sync::{Mutex, MutexGuard, PoisonError};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use map_common::{BoundingBox, Geometry, MapLayer, MapResult, Viewport};

pub const EDIT_LAYER_NAME: &str = "EditLayer";

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);
const POINT_RADIUS: f32 = 3.0;

/// Holds the geometries to outline; shared between the host and the
/// widget's layer list.
pub struct EditLayer {
    name: String,
    geometries: Mutex<Vec<Geometry>>,
    color: Rgba<u8>,
}

impl EditLayer {
    pub fn new() -> Self {
        Self {
            name: EDIT_LAYER_NAME.to_string(),
            geometries: Mutex::new(Vec::new()),
            color: OUTLINE,
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = Rgba(color);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Geometry>> {
        self.geometries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the shown geometry; `None` clears the layer.
    pub fn set_geometry(&self, geometry: Option<Geometry>) {
        let mut geometries = self.lock();
        geometries.clear();
        geometries.extend(geometry);
    }

    pub fn geometries(&self) -> Vec<Geometry> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for EditLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MapLayer for EditLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn envelope(&self) -> Option<BoundingBox> {
        self.lock()
            .iter()
            .filter_map(Geometry::envelope)
            .reduce(|acc, e| acc.union(&e))
    }

    fn render(&self, surface: &mut RgbaImage, viewport: &Viewport) -> MapResult<()> {
        let to_screen = |c: &map_common::Coordinate| {
            let (x, y) = viewport.ground_to_screen(c.x, c.y);
            (x as f32, y as f32)
        };

        for geometry in self.lock().iter() {
            match geometry {
                Geometry::Point(c) => {
                    let (x, y) = to_screen(c);
                    draw_line_segment_mut(surface, (x - POINT_RADIUS, y), (x + POINT_RADIUS, y), self.color);
                    draw_line_segment_mut(surface, (x, y - POINT_RADIUS), (x, y + POINT_RADIUS), self.color);
                }
                Geometry::LineString(vertices) => {
                    for pair in vertices.windows(2) {
                        draw_line_segment_mut(surface, to_screen(&pair[0]), to_screen(&pair[1]), self.color);
                    }
                }
                Geometry::Polygon(ring) => {
                    for pair in ring.windows(2) {
                        draw_line_segment_mut(surface, to_screen(&pair[0]), to_screen(&pair[1]), self.color);
                    }
                    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
                        if ring.len() > 2 && first != last {
                            draw_line_segment_mut(surface, to_screen(last), to_screen(first), self.color);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
