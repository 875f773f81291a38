//! Configuration for a tile index layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TileIndexError};

/// Path field name written by `gdaltindex`.
pub const DEFAULT_FIELD_NAME: &str = "location";

/// Transform cache capacity (entries) when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// How a tile's georeferencing is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    /// Read the transform embedded in the raster (GeoTIFF tags or world file)
    /// and cache it by path.
    Metadata,
    /// Stretch the image over the footprint envelope; nothing is cached.
    #[default]
    Geometry,
}

impl TransformMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "metadata" => Some(Self::Metadata),
            "geometry" => Some(Self::Geometry),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Geometry => "geometry",
        }
    }
}

/// Everything needed to open and draw one tile index layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileIndexConfig {
    /// Layer name shown in layer lists.
    pub name: String,

    /// Path to the index shapefile (`.shp`).
    pub index_path: PathBuf,

    /// Attribute holding each tile's raster path, absolute or relative to
    /// the index file's directory.
    #[serde(default = "default_field_name")]
    pub field_name: String,

    #[serde(default)]
    pub transform: TransformMode,

    /// Maximum number of cached transforms (metadata mode).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Layer opacity, 0 (invisible) to 1 (opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Image drawn over footprints whose raster is missing.
    #[serde(default)]
    pub placeholder: Option<PathBuf>,
}

fn default_field_name() -> String {
    DEFAULT_FIELD_NAME.to_string()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_opacity() -> f32 {
    1.0
}

impl TileIndexConfig {
    pub fn new(name: impl Into<String>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            index_path: index_path.into(),
            field_name: default_field_name(),
            transform: TransformMode::default(),
            cache_capacity: default_cache_capacity(),
            opacity: default_opacity(),
            placeholder: None,
        }
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn with_transform(mut self, transform: TransformMode) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<PathBuf>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| TileIndexError::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file. Relative `index_path` and `placeholder` values are
    /// taken relative to the config file's directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TileIndexError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_yaml_str(&text)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        if config.index_path.is_relative() {
            config.index_path = base.join(&config.index_path);
        }
        if let Some(placeholder) = config.placeholder.as_mut() {
            if placeholder.is_relative() {
                *placeholder = base.join(&*placeholder);
            }
        }
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TileIndexError::Config("name must not be empty".to_string()));
        }

        if self.field_name.trim().is_empty() {
            return Err(TileIndexError::Config(
                "field_name must not be empty".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(TileIndexError::Config(
                "cache_capacity must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(TileIndexError::Config(format!(
                "opacity must be within 0..=1, got {}",
                self.opacity
            )));
        }

        Ok(())
    }

    /// Directory relative raster paths are resolved against.
    pub fn index_dir(&self) -> &Path {
        self.index_path.parent().unwrap_or_else(|| Path::new(""))
    }
}
