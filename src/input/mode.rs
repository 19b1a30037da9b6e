//! Selection tool mode.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Crop tool selection.
///
/// Exactly one mode is active at a time. Switching modes discards any
/// in-progress drawing and the committed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Drag from corner to corner; commits on pointer release
    #[default]
    Rectangle,
    /// Click to add vertices; commits on double-click
    Polygon,
}

impl SelectionMode {
    /// Parses a mode name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "rectangle" | "rect" => Some(Self::Rectangle),
            "polygon" | "poly" => Some(Self::Polygon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Polygon => "polygon",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
