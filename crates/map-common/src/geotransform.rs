//! Affine georeferencing transforms.
//!
//! Coefficients are kept in GDAL order:
//!
//! ```text
//! x_ground = origin_x + col * pixel_width + row * row_rotation
//! y_ground = origin_y + col * col_rotation + row * pixel_height
//! ```
//!
//! `(col, row)` address the top-left corner of a pixel. North-up imagery has
//! a negative `pixel_height`.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Coordinate, MapError, MapResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from a GDAL-ordered coefficient array.
    ///
    /// Fails when the transform cannot be inverted or carries non-finite
    /// values; such a transform cannot place a single pixel.
    pub fn from_gdal_array(c: [f64; 6]) -> MapResult<Self> {
        let gt = Self {
            origin_x: c[0],
            pixel_width: c[1],
            row_rotation: c[2],
            origin_y: c[3],
            col_rotation: c[4],
            pixel_height: c[5],
        };
        gt.validate()?;
        Ok(gt)
    }

    pub fn to_gdal_array(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Stretch an image of `width` x `height` pixels over `envelope`.
    ///
    /// No rotation; origin at the envelope's upper-left corner.
    pub fn from_envelope(envelope: &BoundingBox, width: u32, height: u32) -> MapResult<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::DegenerateTransform(format!(
                "image has zero dimension ({}x{})",
                width, height
            )));
        }
        if envelope.is_degenerate() {
            return Err(MapError::DegenerateTransform(format!(
                "footprint {} has no area",
                envelope
            )));
        }

        Self::from_gdal_array([
            envelope.min_x,
            envelope.width() / width as f64,
            0.0,
            envelope.max_y,
            0.0,
            -(envelope.height() / height as f64),
        ])
    }

    /// Build from the six lines of a world file (`A D B E C F`).
    ///
    /// World files reference the centre of the upper-left pixel, so the
    /// origin is shifted back by half a pixel.
    pub fn from_world_file(a: f64, d: f64, b: f64, e: f64, c: f64, f: f64) -> MapResult<Self> {
        Self::from_gdal_array([
            c - a / 2.0 - b / 2.0,
            a,
            b,
            f - d / 2.0 - e / 2.0,
            d,
            e,
        ])
    }

    fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation
    }

    fn validate(&self) -> MapResult<()> {
        if self.to_gdal_array().iter().any(|v| !v.is_finite()) {
            return Err(MapError::DegenerateTransform(
                "non-finite coefficient".to_string(),
            ));
        }
        if self.determinant() == 0.0 {
            return Err(MapError::DegenerateTransform(
                "zero pixel size".to_string(),
            ));
        }
        Ok(())
    }

    /// Ground size of one pixel along columns and rows, always positive.
    pub fn pixel_size(&self) -> (f64, f64) {
        (
            self.pixel_width.hypot(self.col_rotation),
            self.row_rotation.hypot(self.pixel_height),
        )
    }

    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.origin_x, self.origin_y)
    }

    pub fn is_rotated(&self) -> bool {
        self.row_rotation != 0.0 || self.col_rotation != 0.0
    }

    pub fn pixel_to_ground(&self, col: f64, row: f64) -> Coordinate {
        Coordinate::new(
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Inverse of [`pixel_to_ground`](Self::pixel_to_ground).
    pub fn ground_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let det = self.determinant();
        let col = (dx * self.pixel_height - dy * self.row_rotation) / det;
        let row = (dy * self.pixel_width - dx * self.col_rotation) / det;
        (col, row)
    }

    /// Envelope covered by an image of the given size.
    pub fn ground_bounds(&self, width: u32, height: u32) -> BoundingBox {
        let w = width as f64;
        let h = height as f64;
        let corners = [
            self.pixel_to_ground(0.0, 0.0),
            self.pixel_to_ground(w, 0.0),
            self.pixel_to_ground(0.0, h),
            self.pixel_to_ground(w, h),
        ];
        let first = BoundingBox::from_corners(corners[0], corners[0]);
        corners[1..]
            .iter()
            .fold(first, |acc, c| acc.union(&BoundingBox::from_corners(*c, *c)))
    }
}
