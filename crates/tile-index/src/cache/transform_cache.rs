//! LRU cache of per-file transforms for metadata mode.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use map_common::{BoundingBox, GeoTransform};
use serde::Serialize;

/// What metadata mode learned about one raster file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedTransform {
    pub transform: GeoTransform,
    /// Ground envelope covered by the raster.
    pub envelope: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl CachedTransform {
    pub fn new(transform: GeoTransform, width: u32, height: u32) -> Self {
        Self {
            transform,
            envelope: transform.ground_bounds(width, height),
            width,
            height,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub evictions: u64,
}

/// Entry-bounded LRU cache keyed by absolute raster path.
pub struct TransformCache {
    cache: LruCache<PathBuf, CachedTransform>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl TransformCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Look up a path, refreshing its LRU position.
    pub fn get(&mut self, path: &Path) -> Option<CachedTransform> {
        match self.cache.get(path) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(*entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.cache.contains(path)
    }

    /// Insert or replace an entry, evicting the least recently used one when full.
    pub fn insert(&mut self, path: PathBuf, entry: CachedTransform) {
        let replaced_same_key = self.cache.contains(&path);
        if self.cache.push(path, entry).is_some() && !replaced_same_key {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
