//! Georeferencing embedded in GeoTIFF tags.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use map_common::{GeoTransform, MapResult};
use tiff::decoder::Decoder;
use tiff::tags::Tag;

use crate::error::{Result, TileIndexError};

const GT_RASTER_TYPE_GEO_KEY: u64 = 1025;
const RASTER_PIXEL_IS_POINT: u64 = 2;

/// Raw georeferencing tags of one GeoTIFF.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GeoTags {
    pub transformation: Option<Vec<f64>>,
    pub tiepoint: Option<Vec<f64>>,
    pub pixel_scale: Option<Vec<f64>>,
    pub key_directory: Option<Vec<u64>>,
}

/// Read the affine transform from `ModelTransformationTag`, or from
/// `ModelTiepointTag` + `ModelPixelScaleTag`.
///
/// `Ok(None)` when the file is a TIFF without georeferencing tags.
pub fn read_geotiff_transform(path: &Path) -> Result<Option<GeoTransform>> {
    let file = File::open(path).map_err(|e| TileIndexError::raster(path, e))?;
    let mut decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| TileIndexError::raster(path, e))?;

    let tags = GeoTags {
        transformation: tag_f64s(&mut decoder, path, Tag::ModelTransformationTag)?,
        tiepoint: tag_f64s(&mut decoder, path, Tag::ModelTiepointTag)?,
        pixel_scale: tag_f64s(&mut decoder, path, Tag::ModelPixelScaleTag)?,
        key_directory: tag_u64s(&mut decoder, path, Tag::GeoKeyDirectoryTag)?,
    };
    Ok(transform_from_tags(&tags)?)
}

fn tag_f64s<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
    tag: Tag,
) -> Result<Option<Vec<f64>>> {
    match decoder.find_tag(tag).map_err(|e| TileIndexError::raster(path, e))? {
        Some(value) => value
            .into_f64_vec()
            .map(Some)
            .map_err(|e| TileIndexError::raster(path, e)),
        None => Ok(None),
    }
}

fn tag_u64s<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
    tag: Tag,
) -> Result<Option<Vec<u64>>> {
    match decoder.find_tag(tag).map_err(|e| TileIndexError::raster(path, e))? {
        Some(value) => value
            .into_u64_vec()
            .map(Some)
            .map_err(|e| TileIndexError::raster(path, e)),
        None => Ok(None),
    }
}

/// Transform described by the tags, with tie points moved to the pixel
/// corner when the raster is `RasterPixelIsPoint`.
pub(crate) fn transform_from_tags(tags: &GeoTags) -> MapResult<Option<GeoTransform>> {
    let gt = match (&tags.transformation, &tags.tiepoint, &tags.pixel_scale) {
        (Some(m), _, _) if m.len() >= 8 => [m[3], m[0], m[1], m[7], m[4], m[5]],
        (_, Some(tie), Some(scale)) if tie.len() >= 6 && scale.len() >= 2 => {
            let (col, row, x, y) = (tie[0], tie[1], tie[3], tie[4]);
            let (sx, sy) = (scale[0], scale[1]);
            [x - col * sx, sx, 0.0, y + row * sy, 0.0, -sy]
        }
        _ => return Ok(None),
    };

    let pixel_is_point = tags
        .key_directory
        .as_deref()
        .map(raster_is_pixel_is_point)
        .unwrap_or(false);
    let gt = if pixel_is_point { shift_to_corner(gt) } else { gt };

    GeoTransform::from_gdal_array(gt).map(Some)
}

/// Scan the GeoKey directory for `GTRasterTypeGeoKey`.
///
/// The directory is a list of four-value entries; the first one is the
/// header, the rest are `(key id, tag location, count, value)`. Only
/// inline values (location 0) are considered.
fn raster_is_pixel_is_point(keys: &[u64]) -> bool {
    keys.chunks_exact(4)
        .skip(1)
        .find(|entry| entry[0] == GT_RASTER_TYPE_GEO_KEY)
        .map(|entry| entry[1] == 0 && entry[3] == RASTER_PIXEL_IS_POINT)
        .unwrap_or(false)
}

/// Move the origin from the centre of the first pixel to its corner.
fn shift_to_corner(mut gt: [f64; 6]) -> [f64; 6] {
    gt[0] -= gt[1] * 0.5 + gt[2] * 0.5;
    gt[3] -= gt[4] * 0.5 + gt[5] * 0.5;
    gt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tie_and_scale(keys: Option<Vec<u64>>) -> GeoTags {
        GeoTags {
            tiepoint: Some(vec![0.0, 0.0, 0.0, 100.0, 200.0, 0.0]),
            pixel_scale: Some(vec![2.0, 2.0, 0.0]),
            key_directory: keys,
            ..GeoTags::default()
        }
    }

    #[test]
    fn test_tiepoint_pixel_is_area_unchanged() {
        let keys = vec![1, 1, 0, 1, 1025, 0, 1, 1];
        let gt = transform_from_tags(&tie_and_scale(Some(keys)))
            .unwrap()
            .unwrap();
        assert_eq!(gt.to_gdal_array(), [100.0, 2.0, 0.0, 200.0, 0.0, -2.0]);
    }

    #[test]
    fn test_tiepoint_pixel_is_point_shifts_half_pixel() {
        let keys = vec![1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 2];
        let gt = transform_from_tags(&tie_and_scale(Some(keys)))
            .unwrap()
            .unwrap();
        assert_eq!(gt.to_gdal_array(), [99.0, 2.0, 0.0, 201.0, 0.0, -2.0]);
    }

    #[test]
    fn test_transformation_pixel_is_point_shifts_with_rotation() {
        let tags = GeoTags {
            transformation: Some(vec![
                2.0, 0.5, 0.0, 100.0, //
                0.25, -2.0, 0.0, 200.0, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ]),
            key_directory: Some(vec![1, 1, 0, 1, 1025, 0, 1, 2]),
            ..GeoTags::default()
        };
        let gt = transform_from_tags(&tags).unwrap().unwrap();
        assert_eq!(gt.to_gdal_array(), [98.75, 2.0, 0.5, 200.875, 0.25, -2.0]);
    }

    #[test]
    fn test_missing_tags() {
        assert!(transform_from_tags(&GeoTags::default()).unwrap().is_none());
        let tags = GeoTags {
            tiepoint: Some(vec![0.0, 0.0, 0.0, 100.0, 200.0, 0.0]),
            ..GeoTags::default()
        };
        assert!(transform_from_tags(&tags).unwrap().is_none());
    }

    #[test]
    fn test_raster_type_key_lookup() {
        assert!(!raster_is_pixel_is_point(&[]));
        // header only
        assert!(!raster_is_pixel_is_point(&[1, 1, 0, 0]));
        // value stored in another tag
        assert!(!raster_is_pixel_is_point(&[1, 1, 0, 1, 1025, 34737, 1, 2]));
        // header entry is never a key
        assert!(!raster_is_pixel_is_point(&[1025, 0, 1, 2]));
        assert!(raster_is_pixel_is_point(&[1, 1, 0, 1, 1025, 0, 1, 2]));
    }
}
