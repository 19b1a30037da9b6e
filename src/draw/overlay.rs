//! Transparent overlay surface layered above the displayed image.

use super::color::{BLACK, Color, YELLOW};
use super::render::{clear_surface, render_overlay};
use crate::input::ActiveShape;
use crate::util::SurfaceMapping;
use cairo::{Context, Format, ImageSurface};

/// Appearance of the selection overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Mask fill, alpha included
    pub mask: Color,
    /// Selection outline and vertex marker color
    pub outline: Color,
    /// Outline stroke width in surface pixels
    pub outline_width: f64,
    /// Polygon vertex marker radius in surface pixels (0 = no markers)
    pub vertex_radius: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            mask: BLACK.with_alpha(0.5),
            outline: YELLOW,
            outline_width: 2.0,
            vertex_radius: 3.0,
        }
    }
}

/// Overlay pixel buffer kept in sync with the displayed image size.
pub struct OverlaySurface {
    surface: ImageSurface,
}

impl std::fmt::Debug for OverlaySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlaySurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl OverlaySurface {
    /// Creates a fully transparent overlay of the given pixel size.
    pub fn new(width: i32, height: i32) -> Result<Self, cairo::Error> {
        let surface = ImageSurface::create(Format::ARgb32, width.max(0), height.max(0))?;
        Ok(Self { surface })
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    /// Resynchronizes the pixel dimensions with the hosting surface.
    ///
    /// The old buffer is dropped, never rescaled, so stale pixels cannot be
    /// shown at the new size. Returns `true` when the size changed; the
    /// caller is expected to re-render if a region is committed.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<bool, cairo::Error> {
        let (width, height) = (width.max(0), height.max(0));
        if width == self.width() && height == self.height() {
            return Ok(false);
        }
        log::debug!(
            "Resizing overlay {}x{} -> {}x{}",
            self.width(),
            self.height(),
            width,
            height
        );
        self.surface = ImageSurface::create(Format::ARgb32, width, height)?;
        Ok(true)
    }

    /// Draws the mask and active shape, replacing the previous contents.
    pub fn render(
        &mut self,
        shape: Option<ActiveShape<'_>>,
        mapping: &SurfaceMapping,
        style: &OverlayStyle,
    ) -> Result<(), cairo::Error> {
        let ctx = Context::new(&self.surface)?;
        render_overlay(&ctx, self.width(), self.height(), shape, mapping, style);
        drop(ctx);
        self.surface.flush();
        Ok(())
    }

    /// Makes the overlay fully transparent.
    pub fn clear(&mut self) -> Result<(), cairo::Error> {
        let ctx = Context::new(&self.surface)?;
        clear_surface(&ctx);
        drop(ctx);
        self.surface.flush();
        Ok(())
    }

    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut ImageSurface {
        &mut self.surface
    }
}
