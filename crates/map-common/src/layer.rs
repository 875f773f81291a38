//! The renderable layer contract consumed by map widgets.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use image::RgbaImage;

use crate::{BoundingBox, MapResult, Viewport};

/// A layer that can paint itself onto an RGBA frame.
///
/// Layers are shared between the host's layer list and the widget's, so
/// rendering takes `&self`; layers with caches use interior mutability.
pub trait MapLayer: Send + Sync {
    fn name(&self) -> &str;

    /// Ground extent of everything the layer can draw, if known.
    fn envelope(&self) -> Option<BoundingBox>;

    fn render(&self, surface: &mut RgbaImage, viewport: &Viewport) -> MapResult<()>;
}

/// Shared handle to a layer. Equality is identity.
#[derive(Clone)]
pub struct LayerRef(Arc<dyn MapLayer>);

impl LayerRef {
    pub fn new<L: MapLayer + 'static>(layer: L) -> Self {
        Self(Arc::new(layer))
    }

    pub fn from_arc(layer: Arc<dyn MapLayer>) -> Self {
        Self(layer)
    }
}

impl Deref for LayerRef {
    type Target = dyn MapLayer;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for LayerRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for LayerRef {}

impl fmt::Debug for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayerRef").field(&self.0.name()).finish()
    }
}
