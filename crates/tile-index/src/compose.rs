//! Compositing georeferenced images onto a frame.

use image::{Rgba, RgbaImage};
use map_common::{GeoTransform, Viewport};

/// Draw `image`, placed on the ground by `transform`, onto `surface`.
///
/// Every frame pixel inside the image's ground bounds is mapped back to a
/// source pixel (nearest neighbour) and blended source-over with the source
/// alpha scaled by `opacity`. Returns the number of frame pixels written.
pub fn composite(
    surface: &mut RgbaImage,
    image: &RgbaImage,
    transform: &GeoTransform,
    viewport: &Viewport,
    opacity: f32,
) -> usize {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 0.0 || image.width() == 0 || image.height() == 0 {
        return 0;
    }

    let bounds = transform.ground_bounds(image.width(), image.height());
    let Some((x0, y0, x1, y1)) = viewport.pixel_window(&bounds) else {
        return 0;
    };
    let x1 = x1.min(surface.width());
    let y1 = y1.min(surface.height());

    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let mut written = 0;

    for py in y0..y1 {
        for px in x0..x1 {
            let ground = viewport.screen_to_ground(px as f64 + 0.5, py as f64 + 0.5);
            let (col, row) = transform.ground_to_pixel(ground.x, ground.y);
            if col < 0.0 || row < 0.0 || col >= src_w || row >= src_h {
                continue;
            }

            let src = image.get_pixel(col as u32, row as u32);
            let dst = surface.get_pixel_mut(px, py);
            *dst = blend_over(*dst, *src, opacity);
            written += 1;
        }
    }
    written
}

/// Non-premultiplied source-over blend.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let channel = |s: u8, d: u8| -> u8 {
        let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::BoundingBox;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn frame() -> (RgbaImage, Viewport) {
        let viewport = Viewport::new(BoundingBox::new(0.0, 0.0, 20.0, 20.0), 20, 20).unwrap();
        (RgbaImage::from_pixel(20, 20, CLEAR), viewport)
    }

    #[test]
    fn test_tile_lands_in_its_footprint() {
        let (mut surface, viewport) = frame();
        let tile = RgbaImage::from_pixel(5, 5, RED);
        let gt = GeoTransform::from_envelope(&BoundingBox::new(0.0, 10.0, 10.0, 20.0), 5, 5)
            .unwrap();

        let written = composite(&mut surface, &tile, &gt, &viewport, 1.0);

        assert_eq!(written, 100);
        // Upper-left quadrant of the frame is the upper-left of the ground
        assert_eq!(*surface.get_pixel(0, 0), RED);
        assert_eq!(*surface.get_pixel(9, 9), RED);
        assert_eq!(*surface.get_pixel(10, 10), CLEAR);
        assert_eq!(*surface.get_pixel(5, 15), CLEAR);
    }

    #[test]
    fn test_tile_outside_frame_draws_nothing() {
        let (mut surface, viewport) = frame();
        let tile = RgbaImage::from_pixel(4, 4, RED);
        let gt = GeoTransform::from_envelope(&BoundingBox::new(100.0, 100.0, 110.0, 110.0), 4, 4)
            .unwrap();
        assert_eq!(composite(&mut surface, &tile, &gt, &viewport, 1.0), 0);
    }

    #[test]
    fn test_zero_opacity_draws_nothing() {
        let (mut surface, viewport) = frame();
        let tile = RgbaImage::from_pixel(4, 4, RED);
        let gt = GeoTransform::from_envelope(&BoundingBox::new(0.0, 0.0, 20.0, 20.0), 4, 4)
            .unwrap();
        assert_eq!(composite(&mut surface, &tile, &gt, &viewport, 0.0), 0);
        assert_eq!(*surface.get_pixel(3, 3), CLEAR);
    }

    #[test]
    fn test_blend_half_opacity_over_white() {
        let out = blend_over(Rgba([255, 255, 255, 255]), RED, 0.5);
        assert_eq!(out, Rgba([255, 128, 128, 255]));
    }

    #[test]
    fn test_blend_over_transparent_keeps_source_colour() {
        let out = blend_over(CLEAR, RED, 0.5);
        assert_eq!(out, Rgba([255, 0, 0, 128]));
    }
}
