//! Error types for tile index resolution and rendering.

use std::path::PathBuf;

use map_common::MapError;
use thiserror::Error;

/// Errors that can occur while querying a tile index or drawing its tiles.
#[derive(Error, Debug)]
pub enum TileIndexError {
    /// The index data source could not be opened.
    #[error("failed to open tile index {path}: {message}")]
    IndexOpen { path: PathBuf, message: String },

    /// A query was issued against a closed source.
    #[error("tile index is not open")]
    IndexNotOpen,

    /// The spatial query itself failed.
    #[error("tile index query failed: {0}")]
    IndexQuery(String),

    /// The layer (and its source) has already been released.
    #[error("tile index layer '{0}' has been disposed")]
    Disposed(String),

    /// A raster could not be read or decoded.
    #[error("failed to read raster {path}: {message}")]
    RasterRead { path: PathBuf, message: String },

    /// Metadata mode found no embedded transform and no world file.
    #[error("no georeferencing found for {0}")]
    MissingGeoTransform(PathBuf),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A mutex guarding layer state was poisoned by a panicking render.
    #[error("tile index layer state is poisoned")]
    Poisoned,

    #[error(transparent)]
    Map(#[from] MapError),
}

impl TileIndexError {
    pub(crate) fn raster(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TileIndexError::RasterRead {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl From<TileIndexError> for MapError {
    fn from(err: TileIndexError) -> Self {
        match err {
            TileIndexError::Map(inner) => inner,
            TileIndexError::Disposed(name) => MapError::LayerDisposed(name),
            TileIndexError::Config(message) => MapError::ConfigError(message),
            TileIndexError::RasterRead { .. } | TileIndexError::MissingGeoTransform(_) => {
                MapError::DataReadError(err.to_string())
            }
            other => MapError::RenderError(other.to_string()),
        }
    }
}

/// Result type for tile index operations.
pub type Result<T> = std::result::Result<T, TileIndexError>;

/// Alias used by downstream crates importing several result types.
pub type TileIndexResult<T> = Result<T>;
