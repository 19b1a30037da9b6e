//! Geometry helpers shared by the selection, overlay and preview code.
//!
//! This module provides:
//! - Drag normalization (anchor/cursor to top-left + size)
//! - Element-to-surface coordinate mapping
//! - Scale-to-fit calculations for previews, thumbnails and the viewport

use crate::input::PointerPoint;

// ============================================================================
// Drag Normalization
// ============================================================================

/// Normalizes a one-dimensional drag span.
///
/// Returns `(start, length)` where `start` is the smaller coordinate and
/// `length` is non-negative, regardless of drag direction.
pub fn normalize_span(anchor: f64, cursor: f64) -> (f64, f64) {
    if cursor >= anchor {
        (anchor, cursor - anchor)
    } else {
        (cursor, anchor - cursor)
    }
}

// ============================================================================
// Coordinate Mapping
// ============================================================================

/// Maps element-local (screen) coordinates to source-surface pixel coordinates.
///
/// The overlay and display surfaces keep their own pixel dimensions while the
/// host element may be laid out at a different size, so pointer positions are
/// scaled per axis before they touch surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMapping {
    /// Surface pixels per element unit along X
    pub scale_x: f64,
    /// Surface pixels per element unit along Y
    pub scale_y: f64,
}

impl Default for SurfaceMapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl SurfaceMapping {
    /// One element unit equals one surface pixel.
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Builds a mapping from surface pixel size and element layout size.
    ///
    /// Degenerate element sizes fall back to a unit scale on that axis.
    pub fn new(
        surface_width: i32,
        surface_height: i32,
        element_width: f64,
        element_height: f64,
    ) -> Self {
        let axis = |surface: i32, element: f64| {
            if element > 0.0 && surface > 0 {
                surface as f64 / element
            } else {
                1.0
            }
        };
        Self {
            scale_x: axis(surface_width, element_width),
            scale_y: axis(surface_height, element_height),
        }
    }

    /// Maps a single pointer position into surface space.
    pub fn to_surface(&self, point: PointerPoint) -> (f64, f64) {
        (point.x * self.scale_x, point.y * self.scale_y)
    }

    /// Maps an element-space rectangle into surface space.
    pub fn rect_to_surface(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64, f64, f64) {
        (
            x * self.scale_x,
            y * self.scale_y,
            width * self.scale_x,
            height * self.scale_y,
        )
    }
}

// ============================================================================
// Scale-to-fit
// ============================================================================

/// Scale factor that shrinks `width`×`height` so its larger side fits `max`.
///
/// Never scales up: content already within `max` keeps a factor of 1.0.
pub fn downscale_factor(width: f64, height: f64, max: f64) -> f64 {
    let largest = width.max(height);
    if largest <= 0.0 || max <= 0.0 || largest <= max {
        1.0
    } else {
        max / largest
    }
}

/// Output size after applying [`downscale_factor`], at least one pixel per side.
pub fn scaled_size(width: f64, height: f64, max: f64) -> (i32, i32) {
    let factor = downscale_factor(width, height, max);
    let w = (width * factor).round().max(1.0) as i32;
    let h = (height * factor).round().max(1.0) as i32;
    (w, h)
}

/// Scale that fits an image entirely inside a display area (up or down).
pub fn fit_scale(
    image_width: i32,
    image_height: i32,
    display_width: i32,
    display_height: i32,
) -> f64 {
    if image_width <= 0 || image_height <= 0 || display_width <= 0 || display_height <= 0 {
        return 1.0;
    }
    let sx = display_width as f64 / image_width as f64;
    let sy = display_height as f64 / image_height as f64;
    sx.min(sy)
}
