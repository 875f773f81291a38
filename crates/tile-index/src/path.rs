//! Resolution of index path fields to raster files.

use std::path::{Path, PathBuf};

/// Resolve a path field value against the index file's directory.
///
/// Absolute values are returned unchanged. Blank values resolve to `None`.
/// Indexes written on Windows store `\` separators; they are normalised on
/// other platforms.
pub fn resolve_tile_path(index_path: &Path, location: &str) -> Option<PathBuf> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }

    let normalized = if cfg!(windows) {
        location.to_string()
    } else {
        location.replace('\\', "/")
    };

    let candidate = PathBuf::from(normalized);
    if candidate.is_absolute() {
        return Some(candidate);
    }

    let base = index_path.parent().unwrap_or_else(|| Path::new(""));
    Some(base.join(candidate))
}
