//! Screen <-> ground mapping for one rendered frame.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Coordinate, MapError, MapResult};

/// The ground envelope shown in a frame of `width` x `height` pixels.
///
/// Screen rows grow downward, ground Y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    envelope: BoundingBox,
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(envelope: BoundingBox, width: u32, height: u32) -> MapResult<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidViewport(format!(
                "frame size {}x{}",
                width, height
            )));
        }
        if envelope.is_degenerate() {
            return Err(MapError::InvalidViewport(format!(
                "envelope {} has no area",
                envelope
            )));
        }
        Ok(Self {
            envelope,
            width,
            height,
        })
    }

    pub fn envelope(&self) -> &BoundingBox {
        &self.envelope
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ground units per screen pixel along X and Y.
    pub fn resolution(&self) -> (f64, f64) {
        (
            self.envelope.width() / self.width as f64,
            self.envelope.height() / self.height as f64,
        )
    }

    pub fn screen_to_ground(&self, px: f64, py: f64) -> Coordinate {
        let (rx, ry) = self.resolution();
        Coordinate::new(self.envelope.min_x + px * rx, self.envelope.max_y - py * ry)
    }

    pub fn ground_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let (rx, ry) = self.resolution();
        ((x - self.envelope.min_x) / rx, (self.envelope.max_y - y) / ry)
    }

    /// Screen pixel range `[x0, x1) x [y0, y1)` touched by `bbox`, clipped to the frame.
    pub fn pixel_window(&self, bbox: &BoundingBox) -> Option<(u32, u32, u32, u32)> {
        let clipped = self.envelope.intersection(bbox)?;
        let (x0, y0) = self.ground_to_screen(clipped.min_x, clipped.max_y);
        let (x1, y1) = self.ground_to_screen(clipped.max_x, clipped.min_y);

        let x0 = (x0.floor().max(0.0) as u32).min(self.width);
        let y0 = (y0.floor().max(0.0) as u32).min(self.height);
        let x1 = (x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (y1.ceil().max(0.0) as u32).min(self.height);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }
}
