//! Image generators for tile fixtures.

use image::{Rgba, RgbaImage};

/// Image filled with a single colour.
pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Image whose red channel grows left to right and green channel top to
/// bottom. Handy for checking orientation after a transform.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
        let g = (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8;
        Rgba([r, g, 0, 255])
    })
}

/// Count pixels equal to `color`.
pub fn count_pixels(image: &RgbaImage, color: [u8; 4]) -> usize {
    image.pixels().filter(|p| p.0 == color).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_image() {
        let img = solid_image(4, 3, [1, 2, 3, 4]);
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(count_pixels(&img, [1, 2, 3, 4]), 12);
    }

    #[test]
    fn test_gradient_corners() {
        let img = gradient_image(10, 10);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(9, 9).0, [255, 255, 0, 255]);
    }
}
