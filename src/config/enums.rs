//! Configuration enum types.

use crate::draw::{Color, color::*};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a named color or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// outline_color = "yellow"
///
/// # Custom RGB color (0-255 per component)
/// outline_color = [255, 128, 0]  # Orange
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: red, green, blue, yellow, gray, white, black
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to an opaque [`Color`].
    ///
    /// Unknown color names fall back to `fallback` with a warning. RGB arrays
    /// are converted from the 0-255 range to 0.0-1.0.
    pub fn to_color_or(&self, fallback: Color) -> Color {
        match self {
            ColorSpec::Name(name) => name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using fallback", name);
                fallback
            }),
            ColorSpec::Rgb([r, g, b]) => Color {
                r: *r as f64 / 255.0,
                g: *g as f64 / 255.0,
                b: *b as f64 / 255.0,
                a: 1.0,
            },
        }
    }

    /// Converts with black as the fallback for unknown names.
    pub fn to_color(&self) -> Color {
        self.to_color_or(BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_rgb_colors_convert() {
        assert_eq!(ColorSpec::Name("Yellow".into()).to_color(), YELLOW);
        assert_eq!(
            ColorSpec::Rgb([255, 0, 51]).to_color(),
            Color::new(1.0, 0.0, 0.2, 1.0)
        );
        assert_eq!(ColorSpec::Name("chartreuse".into()).to_color_or(RED), RED);
    }
}
