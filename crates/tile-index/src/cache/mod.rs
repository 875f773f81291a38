//! Caching for resolved tile georeferencing.

mod transform_cache;

pub use transform_cache::{CacheStats, CachedTransform, TransformCache};
