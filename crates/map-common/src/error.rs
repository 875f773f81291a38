//! Error types shared by the mapping crates.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

#[derive(Debug, Error)]
pub enum MapError {
    // === Geometry Errors ===
    #[error("Degenerate transform: {0}")]
    DegenerateTransform(String),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),

    // === Data Errors ===
    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    // === Layer Errors ===
    #[error("Layer has been disposed: {0}")]
    LayerDisposed(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::DataReadError(err.to_string())
    }
}

impl From<image::ImageError> for MapError {
    fn from(err: image::ImageError) -> Self {
        MapError::ImageError(err.to_string())
    }
}

impl From<crate::bbox::BboxParseError> for MapError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        MapError::InvalidBbox(err.to_string())
    }
}
