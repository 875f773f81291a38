//! Raster file access: existence checks, pixel dimensions, embedded
//! georeferencing and decoding.
//!
//! The resolver touches the filesystem only through [`RasterAccess`].

mod geotiff;
mod world_file;

pub use geotiff::read_geotiff_transform;
pub use world_file::{parse_world_file, read_world_file, world_file_candidates};

use std::path::Path;

use image::RgbaImage;
use map_common::GeoTransform;
use tracing::debug;

use crate::error::{Result, TileIndexError};

pub trait RasterAccess: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Pixel width and height, read from the header only.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;

    /// The raster's own georeferencing.
    fn geotransform(&self, path: &Path) -> Result<GeoTransform>;

    /// Decode the full image as RGBA.
    fn load(&self, path: &Path) -> Result<RgbaImage>;
}

/// Rasters on the local filesystem, decoded with the `image` crate.
///
/// Georeferencing comes from GeoTIFF tags for `.tif`/`.tiff` files, then
/// from a world-file sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRasterAccess;

impl RasterAccess for FsRasterAccess {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        image::image_dimensions(path).map_err(|e| TileIndexError::raster(path, e))
    }

    fn geotransform(&self, path: &Path) -> Result<GeoTransform> {
        let mut tiff_error = None;
        if is_tiff(path) {
            match read_geotiff_transform(path) {
                Ok(Some(gt)) => return Ok(gt),
                Ok(None) => {}
                Err(e) => tiff_error = Some(e),
            }
        }
        if let Some(gt) = read_world_file(path)? {
            if let Some(e) = &tiff_error {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "GeoTIFF tags unreadable, using world file"
                );
            }
            return Ok(gt);
        }
        Err(tiff_error.unwrap_or_else(|| TileIndexError::MissingGeoTransform(path.to_path_buf())))
    }

    fn load(&self, path: &Path) -> Result<RgbaImage> {
        let image = image::open(path).map_err(|e| TileIndexError::raster(path, e))?;
        Ok(image.to_rgba8())
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_tiff() {
        assert!(is_tiff(&PathBuf::from("a/b.TIF")));
        assert!(is_tiff(&PathBuf::from("b.tiff")));
        assert!(!is_tiff(&PathBuf::from("b.png")));
        assert!(!is_tiff(&PathBuf::from("tif")));
    }

    #[test]
    fn test_corrupt_tiff_falls_back_to_world_file() {
        let dir = tempfile::tempdir().unwrap();
        let tif = dir.path().join("a.tif");
        std::fs::write(&tif, b"not a tiff at all").unwrap();
        std::fs::write(dir.path().join("a.tfw"), "1\n0\n0\n-1\n0.5\n9.5\n").unwrap();

        let gt = FsRasterAccess.geotransform(&tif).unwrap();
        assert_eq!(gt.to_gdal_array(), [0.0, 1.0, 0.0, 10.0, 0.0, -1.0]);
    }

    #[test]
    fn test_corrupt_tiff_without_world_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let tif = dir.path().join("a.tif");
        std::fs::write(&tif, b"not a tiff at all").unwrap();

        let err = FsRasterAccess.geotransform(&tif).unwrap_err();
        assert!(matches!(err, TileIndexError::RasterRead { .. }), "{err:?}");
    }

    #[test]
    fn test_missing_georeferencing() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("a.png");
        std::fs::write(&png, b"unused").unwrap();

        let err = FsRasterAccess.geotransform(&png).unwrap_err();
        assert!(matches!(err, TileIndexError::MissingGeoTransform(_)));
    }
}
