//! Preview generation from the committed selection.

use super::region::{CommittedRegion, RectangleRegion};
use super::render::trace_polygon;
use crate::util::{self, SurfaceMapping};
use cairo::{Context, Format, ImageSurface};
use thiserror::Error;

/// Default maximum preview width in pixels.
pub const DEFAULT_MAX_PREVIEW_WIDTH: f64 = 400.0;

/// Reasons a preview could not be produced.
///
/// All of these are recoverable: the caller logs them and keeps the last
/// valid preview state.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no region is committed")]
    NoRegion,

    #[error("no image is loaded")]
    NoImage,

    #[error("polygon previews are disabled")]
    UnsupportedRegion,

    #[error("selected region lies outside the image")]
    EmptyRegion,

    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),
}

/// A generated preview and the source rectangle it was copied from.
pub struct PreviewImage {
    surface: ImageSurface,
    /// Source rectangle in surface pixels (x, y, width, height)
    pub source_rect: (f64, f64, f64, f64),
    /// Applied downscale factor (1.0 = copied at full size)
    pub scale: f64,
}

impl std::fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("source_rect", &self.source_rect)
            .field("scale", &self.scale)
            .finish()
    }
}

impl PreviewImage {
    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut ImageSurface {
        &mut self.surface
    }
}

/// Copies committed regions out of the rendered display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGenerator {
    /// Larger preview side never exceeds this
    pub max_width: f64,
    /// Whether polygon regions produce a clipped preview
    pub polygon_clip: bool,
}

impl Default for PreviewGenerator {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_PREVIEW_WIDTH,
            polygon_clip: false,
        }
    }
}

impl PreviewGenerator {
    pub fn new(max_width: f64, polygon_clip: bool) -> Self {
        Self {
            max_width,
            polygon_clip,
        }
    }

    /// Copies the pixels under `region` from `source` into a new preview.
    ///
    /// The copy is scaled down (never up) so the larger side fits
    /// `max_width`, preserving aspect ratio. The region is mapped into
    /// source pixel space with `mapping` and clamped to the source bounds.
    ///
    /// Must be called again whenever the source's rendered pixels change
    /// (window/level, invert, zoom), even if the region is unchanged.
    pub fn generate(
        &self,
        region: Option<&CommittedRegion>,
        mapping: &SurfaceMapping,
        source: Option<&ImageSurface>,
    ) -> Result<PreviewImage, PreviewError> {
        let region = region.ok_or(PreviewError::NoRegion)?;
        let source = source.ok_or(PreviewError::NoImage)?;

        let (bounds, clip) = match region {
            CommittedRegion::Rectangle(rect) => (*rect, None),
            CommittedRegion::Polygon(polygon) => {
                if !self.polygon_clip {
                    return Err(PreviewError::UnsupportedRegion);
                }
                let bounds = polygon.bounding_box().ok_or(PreviewError::EmptyRegion)?;
                (bounds, Some(polygon))
            }
        };

        let (x, y, width, height) = clamp_to_source(&bounds, mapping, source)?;
        let scale = util::downscale_factor(width, height, self.max_width);
        let (out_w, out_h) = util::scaled_size(width, height, self.max_width);

        let surface = ImageSurface::create(Format::ARgb32, out_w, out_h)?;
        {
            let ctx = Context::new(&surface)?;
            ctx.scale(scale, scale);
            ctx.translate(-x, -y);
            if let Some(polygon) = clip {
                trace_polygon(&ctx, polygon, mapping);
                ctx.clip();
            }
            ctx.set_source_surface(source, 0.0, 0.0)?;
            ctx.source().set_filter(cairo::Filter::Good);
            ctx.paint()?;
        }
        surface.flush();

        log::debug!(
            "Preview {}x{} from source rect ({:.0}, {:.0}, {:.0}x{:.0}) at scale {:.3}",
            out_w,
            out_h,
            x,
            y,
            width,
            height,
            scale
        );

        Ok(PreviewImage {
            surface,
            source_rect: (x, y, width, height),
            scale,
        })
    }
}

/// Maps `bounds` into source pixels and intersects it with the source.
fn clamp_to_source(
    bounds: &RectangleRegion,
    mapping: &SurfaceMapping,
    source: &ImageSurface,
) -> Result<(f64, f64, f64, f64), PreviewError> {
    let (x, y, w, h) = mapping.rect_to_surface(bounds.x, bounds.y, bounds.width, bounds.height);
    let max_x = source.width() as f64;
    let max_y = source.height() as f64;

    let x0 = x.clamp(0.0, max_x);
    let y0 = y.clamp(0.0, max_y);
    let x1 = (x + w).clamp(0.0, max_x);
    let y1 = (y + h).clamp(0.0, max_y);

    if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
        return Err(PreviewError::EmptyRegion);
    }
    Ok((x0, y0, x1 - x0, y1 - y0))
}
