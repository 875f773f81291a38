//! World-file sidecars (`.tfw`, `.pgw`, `.wld`, ...).

use std::path::{Path, PathBuf};

use map_common::GeoTransform;

use crate::error::{Result, TileIndexError};

/// Sidecar paths to probe for `raster`, most specific first:
/// `a.tif` -> `a.tfw`, `a.tifw`, `a.wld`.
pub fn world_file_candidates(raster: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(ext) = raster.extension().and_then(|e| e.to_str()) {
        if let (Some(first), Some(last), true) =
            (ext.chars().next(), ext.chars().last(), ext.len() >= 2)
        {
            candidates.push(raster.with_extension(format!("{}{}w", first, last)));
        }
        candidates.push(raster.with_extension(format!("{}w", ext)));
    }
    candidates.push(raster.with_extension("wld"));
    candidates.dedup();
    candidates
}

/// Parse the six numeric lines of a world file.
pub fn parse_world_file(text: &str) -> Option<GeoTransform> {
    let values: Vec<f64> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(6)
        .map(|l| l.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    if values.len() != 6 {
        return None;
    }
    GeoTransform::from_world_file(
        values[0], values[1], values[2], values[3], values[4], values[5],
    )
    .ok()
}

/// Read the first sidecar found next to `raster`.
///
/// `Ok(None)` when no sidecar exists; an error when one exists but is not a
/// valid world file.
pub fn read_world_file(raster: &Path) -> Result<Option<GeoTransform>> {
    for candidate in world_file_candidates(raster) {
        if !candidate.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&candidate)
            .map_err(|e| TileIndexError::raster(&candidate, e))?;
        return parse_world_file(&text)
            .map(Some)
            .ok_or_else(|| TileIndexError::raster(&candidate, "malformed world file"));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::Coordinate;

    #[test]
    fn test_candidates_for_tif() {
        let c = world_file_candidates(Path::new("/d/a.tif"));
        assert_eq!(
            c,
            vec![
                PathBuf::from("/d/a.tfw"),
                PathBuf::from("/d/a.tifw"),
                PathBuf::from("/d/a.wld"),
            ]
        );
    }

    #[test]
    fn test_candidates_without_extension() {
        assert_eq!(
            world_file_candidates(Path::new("/d/a")),
            vec![PathBuf::from("/d/a.wld")]
        );
    }

    #[test]
    fn test_parse_world_file() {
        let gt = parse_world_file("0.5\n0\n0\n-0.5\n100.25\n199.75\n").unwrap();
        assert_eq!(gt.origin(), Coordinate::new(100.0, 200.0));
        assert_eq!(gt.pixel_size(), (0.5, 0.5));
    }

    #[test]
    fn test_parse_world_file_rejects_short_or_garbage() {
        assert!(parse_world_file("1\n0\n0\n-1\n").is_none());
        assert!(parse_world_file("1\n0\nx\n-1\n0\n0\n").is_none());
        assert!(parse_world_file("0\n0\n0\n0\n0\n0\n").is_none());
    }
}
