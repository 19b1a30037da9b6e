//! Viewport state and grayscale rendering.

use crate::dicom::DicomImage;
use crate::draw::Color;
use crate::util;
use cairo::{Context, Format, ImageSurface};

/// Narrowest window allowed; keeps the VOI function well defined.
pub const MIN_WINDOW_WIDTH: f64 = 1.0;

/// Zoom bounds relative to the image's natural size.
pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 40.0;

/// Per-view display state: zoom, pan, inversion and window/level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Display pixels per image pixel
    pub scale: f64,
    /// Pan offset from the centered position, in display pixels
    pub translation: (f64, f64),
    pub invert: bool,
    pub window_center: f64,
    pub window_width: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: (0.0, 0.0),
            invert: false,
            window_center: 128.0,
            window_width: 256.0,
        }
    }
}

impl Viewport {
    /// Initial viewport for an image: fit to display, centered, image window.
    pub fn for_image(image: &DicomImage, display_width: i32, display_height: i32) -> Self {
        Self {
            scale: util::fit_scale(image.width(), image.height(), display_width, display_height),
            translation: (0.0, 0.0),
            invert: image.monochrome1,
            window_center: image.window_center,
            window_width: image.window_width.max(MIN_WINDOW_WIDTH),
        }
    }

    /// Sets the window, clamping the width to [`MIN_WINDOW_WIDTH`].
    pub fn set_window(&mut self, center: f64, width: f64) {
        self.window_center = center;
        self.window_width = width.max(MIN_WINDOW_WIDTH);
    }

    /// Multiplies the scale, clamped to [`MIN_SCALE`]..=[`MAX_SCALE`].
    pub fn zoom_by(&mut self, factor: f64) {
        if factor > 0.0 {
            self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    /// Maps a modality value to an 8-bit display value.
    ///
    /// Linear VOI function: values at or below the bottom of the window map
    /// to 0, values above the top map to 255, the rest interpolate. The
    /// result is inverted when `invert` is set.
    pub fn display_value(&self, modality: f64) -> u8 {
        let center = self.window_center - 0.5;
        let width = self.window_width.max(MIN_WINDOW_WIDTH) - 1.0;

        let value = if width <= 0.0 {
            if modality <= center { 0.0 } else { 255.0 }
        } else if modality <= center - width / 2.0 {
            0.0
        } else if modality > center + width / 2.0 {
            255.0
        } else {
            ((modality - center) / width + 0.5) * 255.0
        };

        let value = value.round().clamp(0.0, 255.0) as u8;
        if self.invert { 255 - value } else { value }
    }
}

/// Renders the image at natural size through the viewport's VOI function.
pub fn render_grayscale(
    image: &DicomImage,
    viewport: &Viewport,
) -> Result<ImageSurface, cairo::Error> {
    let width = image.width();
    let height = image.height();
    let stride = Format::ARgb32.stride_for_width(width as u32)?;
    let mut data = vec![0u8; stride as usize * height as usize];

    for (y, row) in image.pixels().chunks(width.max(1) as usize).take(height as usize).enumerate() {
        let line = &mut data[y * stride as usize..];
        for (x, &stored) in row.iter().enumerate() {
            let g = viewport.display_value(image.modality_value(stored)) as u32;
            let pixel = 0xFF00_0000 | (g << 16) | (g << 8) | g;
            line[x * 4..x * 4 + 4].copy_from_slice(&pixel.to_ne_bytes());
        }
    }

    ImageSurface::create_for_data(data, Format::ARgb32, width, height, stride)
}

/// Composes the grayscale image onto a display-sized surface.
///
/// The image is centered, scaled by `viewport.scale` and offset by
/// `viewport.translation`; uncovered areas show `background`.
pub fn render_display(
    grayscale: &ImageSurface,
    viewport: &Viewport,
    display_width: i32,
    display_height: i32,
    background: Color,
) -> Result<ImageSurface, cairo::Error> {
    let surface =
        ImageSurface::create(Format::ARgb32, display_width.max(0), display_height.max(0))?;
    {
        let ctx = Context::new(&surface)?;
        background.with_alpha(1.0).apply(&ctx);
        ctx.paint()?;

        ctx.translate(
            display_width as f64 / 2.0 + viewport.translation.0,
            display_height as f64 / 2.0 + viewport.translation.1,
        );
        ctx.scale(viewport.scale, viewport.scale);
        ctx.translate(
            -(grayscale.width() as f64) / 2.0,
            -(grayscale.height() as f64) / 2.0,
        );
        ctx.set_source_surface(grayscale, 0.0, 0.0)?;
        ctx.source().set_filter(cairo::Filter::Good);
        ctx.paint()?;
    }
    surface.flush();
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_at(surface: &mut ImageSurface, x: i32, y: i32) -> u8 {
        let stride = surface.stride() as usize;
        let data = surface.data().expect("exclusive surface access");
        let offset = y as usize * stride + x as usize * 4;
        let pixel = u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        (pixel & 0xFF) as u8
    }

    #[test]
    fn default_window_is_identity_for_eight_bit_values() {
        let viewport = Viewport::default();
        assert_eq!(viewport.display_value(0.0), 0);
        assert_eq!(viewport.display_value(128.0), 128);
        assert_eq!(viewport.display_value(255.0), 255);
        assert_eq!(viewport.display_value(-40.0), 0);
        assert_eq!(viewport.display_value(4000.0), 255);
    }

    #[test]
    fn narrow_window_thresholds() {
        let mut viewport = Viewport::default();
        viewport.set_window(100.0, 0.0);
        assert_eq!(viewport.window_width, MIN_WINDOW_WIDTH);
        assert_eq!(viewport.display_value(99.0), 0);
        assert_eq!(viewport.display_value(100.0), 255);
    }

    #[test]
    fn invert_flips_output() {
        let viewport = Viewport {
            invert: true,
            ..Viewport::default()
        };
        assert_eq!(viewport.display_value(0.0), 255);
        assert_eq!(viewport.display_value(255.0), 0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(1000.0);
        assert_eq!(viewport.scale, MAX_SCALE);
        viewport.zoom_by(0.0);
        assert_eq!(viewport.scale, MAX_SCALE);
        viewport.zoom_by(1e-6);
        assert_eq!(viewport.scale, MIN_SCALE);
    }

    #[test]
    fn for_image_fits_and_uses_image_window() {
        let mut image = DicomImage::from_pixels(200, 100, vec![0; 20_000]).unwrap();
        image.window_center = 40.0;
        image.window_width = 400.0;
        image.monochrome1 = true;
        let viewport = Viewport::for_image(&image, 400, 400);
        assert_eq!(viewport.scale, 2.0);
        assert_eq!((viewport.window_center, viewport.window_width), (40.0, 400.0));
        assert!(viewport.invert);
    }

    #[test]
    fn render_grayscale_writes_opaque_gray_pixels() {
        let image = DicomImage::from_pixels(2, 1, vec![0, 255]).unwrap();
        let mut surface = render_grayscale(&image, &Viewport::default()).unwrap();
        assert_eq!(gray_at(&mut surface, 0, 0), 0);
        assert_eq!(gray_at(&mut surface, 1, 0), 255);
    }

    #[test]
    fn render_display_centers_scaled_image() {
        let image = DicomImage::from_pixels(10, 10, vec![255; 100]).unwrap();
        let gray = render_grayscale(&image, &Viewport::default()).unwrap();
        let viewport = Viewport {
            scale: 2.0,
            ..Viewport::default()
        };
        let mut display = render_display(&gray, &viewport, 100, 100, crate::draw::BLACK).unwrap();
        assert_eq!(gray_at(&mut display, 50, 50), 255);
        assert_eq!(gray_at(&mut display, 5, 5), 0);
    }
}
