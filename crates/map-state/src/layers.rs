//! The host-side layer list and its incremental mirroring into a widget.

use map_common::LayerRef;

use crate::widget::MapWidget;

/// What happened to a [`LayerCollection`].
#[derive(Debug, Clone, PartialEq)]
pub enum LayerChange {
    Add(Vec<LayerRef>),
    Remove(Vec<LayerRef>),
    Reset,
}

/// An ordered layer list reporting each mutation as a [`LayerChange`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerCollection {
    layers: Vec<LayerRef>,
}

impl LayerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: LayerRef) -> LayerChange {
        self.layers.push(layer.clone());
        LayerChange::Add(vec![layer])
    }

    pub fn extend(&mut self, layers: impl IntoIterator<Item = LayerRef>) -> LayerChange {
        let added: Vec<LayerRef> = layers.into_iter().collect();
        self.layers.extend(added.iter().cloned());
        LayerChange::Add(added)
    }

    /// `None` when the layer is not in the collection.
    pub fn remove(&mut self, layer: &LayerRef) -> Option<LayerChange> {
        let index = self.layers.iter().position(|l| l == layer)?;
        let removed = self.layers.remove(index);
        Some(LayerChange::Remove(vec![removed]))
    }

    pub fn clear(&mut self) -> LayerChange {
        self.layers.clear();
        LayerChange::Reset
    }

    pub fn contains(&self, layer: &LayerRef) -> bool {
        self.layers.contains(layer)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayerRef> {
        self.layers.iter()
    }

    pub fn as_slice(&self) -> &[LayerRef] {
        &self.layers
    }
}

impl FromIterator<LayerRef> for LayerCollection {
    fn from_iter<I: IntoIterator<Item = LayerRef>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LayerCollection {
    type Item = &'a LayerRef;
    type IntoIter = std::slice::Iter<'a, LayerRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

/// Mirror one collection change into the widget's layer list. Layers
/// already present are not added twice; absent ones are not removed.
pub fn apply_layer_change<W: MapWidget + ?Sized>(widget: &mut W, change: &LayerChange) {
    match change {
        LayerChange::Add(layers) => {
            for layer in layers {
                if !widget.contains_layer(layer) {
                    widget.add_layer(layer.clone());
                }
            }
        }
        LayerChange::Remove(layers) => {
            for layer in layers {
                widget.remove_layer(layer);
            }
        }
        LayerChange::Reset => widget.clear_layers(),
    }
}

/// Swap the collection the widget mirrors: layers of `old` leave the widget,
/// layers of `new` not yet shown join it.
pub fn replace_layers<W: MapWidget + ?Sized>(
    widget: &mut W,
    old: &LayerCollection,
    new: &LayerCollection,
) {
    for layer in old {
        widget.remove_layer(layer);
    }
    for layer in new {
        if !widget.contains_layer(layer) {
            widget.add_layer(layer.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MapView;
    use image::RgbaImage;
    use map_common::{BoundingBox, MapLayer, MapResult, Viewport};

    struct Blank(&'static str);

    impl MapLayer for Blank {
        fn name(&self) -> &str {
            self.0
        }

        fn envelope(&self) -> Option<BoundingBox> {
            None
        }

        fn render(&self, _: &mut RgbaImage, _: &Viewport) -> MapResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_incremental_sync() {
        let mut widget = MapView::new(10, 10).unwrap();
        let mut collection = LayerCollection::new();
        let a = LayerRef::new(Blank("a"));
        let b = LayerRef::new(Blank("b"));

        let change = collection.push(a.clone());
        apply_layer_change(&mut widget, &change);
        apply_layer_change(&mut widget, &change);
        assert_eq!(widget.layers(), &[a.clone()]);

        let change = collection.push(b.clone());
        apply_layer_change(&mut widget, &change);
        let change = collection.remove(&a).unwrap();
        apply_layer_change(&mut widget, &change);
        assert_eq!(widget.layers(), &[b.clone()]);

        assert!(collection.remove(&a).is_none());

        let change = collection.clear();
        apply_layer_change(&mut widget, &change);
        assert!(widget.layers().is_empty());
    }

    #[test]
    fn test_replace_keeps_foreign_layers() {
        let mut widget = MapView::new(10, 10).unwrap();
        let own = LayerRef::new(Blank("own"));
        let old_layer = LayerRef::new(Blank("old"));
        let shared = LayerRef::new(Blank("shared"));
        widget.add_layer(own.clone());
        widget.add_layer(old_layer.clone());

        let old: LayerCollection = [old_layer].into_iter().collect();
        let new: LayerCollection = [shared.clone()].into_iter().collect();
        replace_layers(&mut widget, &old, &new);

        assert_eq!(widget.layers(), &[own, shared]);
    }
}
