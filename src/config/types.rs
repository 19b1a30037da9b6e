//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::input::SelectionMode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Region-selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionConfig {
    /// Selection mode when an image is first opened ("rectangle" or "polygon")
    #[serde(default)]
    pub default_mode: SelectionMode,

    /// Minimum rectangle side in pixels; smaller drags are discarded
    /// (valid range: 1.0 - 500.0)
    #[serde(default = "default_min_size")]
    pub min_size: f64,

    /// Radius of the polygon vertex markers in pixels, 0 disables them
    /// (valid range: 0.0 - 20.0)
    #[serde(default = "default_vertex_radius")]
    pub vertex_radius: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_mode: SelectionMode::default(),
            min_size: default_min_size(),
            vertex_radius: default_vertex_radius(),
        }
    }
}

/// Overlay appearance.
///
/// The mask darkens everything outside the selection; the outline traces
/// the selection shape itself.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OverlayConfig {
    /// Mask color - named color or `[r, g, b]`
    #[serde(default = "default_mask_color")]
    pub mask_color: ColorSpec,

    /// Mask opacity (valid range: 0.0 - 1.0)
    #[serde(default = "default_mask_opacity")]
    pub mask_opacity: f64,

    /// Outline and vertex marker color - named color or `[r, g, b]`
    #[serde(default = "default_outline_color")]
    pub outline_color: ColorSpec,

    /// Outline stroke width in pixels (valid range: 0.5 - 20.0)
    #[serde(default = "default_outline_width")]
    pub outline_width: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mask_color: default_mask_color(),
            mask_opacity: default_mask_opacity(),
            outline_color: default_outline_color(),
            outline_width: default_outline_width(),
        }
    }
}

/// Preview generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PreviewConfig {
    /// Larger preview side in pixels; bigger regions are scaled down
    /// (valid range: 16.0 - 4096.0)
    #[serde(default = "default_preview_max_width")]
    pub max_width: f64,

    /// Produce clipped previews for closed polygons (off: rectangles only)
    #[serde(default)]
    pub polygon_clip: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_preview_max_width(),
            polygon_clip: false,
        }
    }
}

/// Initial display settings applied when an image is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewportConfig {
    /// Window center override; the dataset's window is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_center: Option<f64>,

    /// Window width override (minimum 1.0); used together with `window_center`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_width: Option<f64>,

    /// Invert grayscale on load
    #[serde(default)]
    pub invert: bool,

    /// Color shown around the image
    #[serde(default = "default_background")]
    pub background: ColorSpec,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            window_center: None,
            window_width: None,
            invert: false,
            background: default_background(),
        }
    }
}

/// Thumbnail board settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ThumbnailConfig {
    /// Larger thumbnail side in pixels (valid range: 16.0 - 1024.0)
    #[serde(default = "default_thumbnail_size")]
    pub size: f64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: default_thumbnail_size(),
        }
    }
}

/// PNG export settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Directory exported images are written to (`~` is expanded)
    #[serde(default = "default_export_directory")]
    pub directory: String,

    /// File name template with chrono format specifiers
    /// (e.g. "crop_%Y-%m-%d_%H%M%S")
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            filename_template: default_filename_template(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_min_size() -> f64 {
    crate::input::state::DEFAULT_MIN_SELECTION_SIZE
}

fn default_vertex_radius() -> f64 {
    3.0
}

fn default_mask_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_mask_opacity() -> f64 {
    0.5
}

fn default_outline_color() -> ColorSpec {
    ColorSpec::Name("yellow".to_string())
}

fn default_outline_width() -> f64 {
    2.0
}

fn default_preview_max_width() -> f64 {
    crate::draw::preview::DEFAULT_MAX_PREVIEW_WIDTH
}

fn default_background() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_thumbnail_size() -> f64 {
    crate::viewer::thumbnails::DEFAULT_THUMBNAIL_SIZE
}

fn default_export_directory() -> String {
    "~/Pictures/dicomcrop".to_string()
}

fn default_filename_template() -> String {
    "crop_%Y-%m-%d_%H%M%S".to_string()
}
