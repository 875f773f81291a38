//! Error types for the map state bridge.

use map_common::MapError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    /// The host was detached from its widget.
    #[error("map host is detached")]
    Detached,

    #[error("invalid zoom range: min {min} > max {max}")]
    InvalidZoomRange { min: f64, max: f64 },

    #[error("invalid widget size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error(transparent)]
    Map(#[from] MapError),
}

pub type StateResult<T> = Result<T, StateError>;
