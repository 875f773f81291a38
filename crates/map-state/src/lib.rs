//! Map viewport state shared between an application and a map widget.
//!
//! [`MapHost`] keeps a copy of every viewport, tool and layer property the
//! application binds to, and mirrors it into a [`MapWidget`]. Writes in
//! either direction are gated on the value actually differing, so a change
//! echoed back by the other side stops after one hop.
//!
//! [`MapView`] is a headless widget that renders [`map_common::MapLayer`]s
//! into an RGBA frame.

pub mod dispatch;
pub mod edit_layer;
pub mod error;
pub mod event;
pub mod host;
pub mod layers;
pub mod property;
pub mod tool;
pub mod view;
pub mod widget;

pub use dispatch::{DispatchMessage, Dispatcher, RenderSignal};
pub use edit_layer::{EditLayer, EDIT_LAYER_NAME};
pub use error::{StateError, StateResult};
pub use event::{Key, PointerEvent, ScreenPoint, WidgetEvent};
pub use host::{MapHost, ZOOM_TOLERANCE};
pub use layers::{apply_layer_change, replace_layers, LayerChange, LayerCollection};
pub use property::Property;
pub use tool::{CustomTool, Tool};
pub use view::MapView;
pub use widget::MapWidget;
