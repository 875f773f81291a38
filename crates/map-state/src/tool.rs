//! Interaction tools a map widget can run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    None,
    Pan,
    ZoomIn,
    ZoomOut,
    Query,
    DrawPoint,
    DrawLine,
    DrawPolygon,
    /// The widget's custom tool is active.
    Custom,
}

impl Tool {
    pub fn is_drawing(&self) -> bool {
        matches!(self, Tool::DrawPoint | Tool::DrawLine | Tool::DrawPolygon)
    }
}

/// An application-defined tool, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomTool {
    pub name: String,
}

impl CustomTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for CustomTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
