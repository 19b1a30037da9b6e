//! Viewer: event-handler glue between image, viewport and selection.
//!
//! The [`Viewer`] owns the loaded image, its viewport, the rendered display
//! surface, the selection controller, the overlay and the last preview. Host
//! events are dispatched to it one at a time; every handler finishes its
//! overlay render and preview regeneration before returning, so the next
//! event always sees fully settled state.

pub mod thumbnails;
pub mod viewport;

pub use thumbnails::{Thumbnail, ThumbnailBoard};
pub use viewport::{Viewport, render_display, render_grayscale};

use crate::config::Config;
use crate::dicom::{self, DicomError, DicomImage};
use crate::draw::{
    BLACK, Color, OverlayStyle, OverlaySurface, PreviewError, PreviewGenerator, PreviewImage,
};
use crate::input::{
    Key, MouseButton, PointerPoint, SelectionController, SelectionMode, SelectionOutcome,
};
use crate::util::SurfaceMapping;
use cairo::ImageSurface;
use std::path::Path;
use thiserror::Error;

/// Zoom step applied by the +/- keys.
const ZOOM_STEP: f64 = 1.25;

/// Errors surfaced by viewer operations that cannot be handled locally.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Dicom(#[from] DicomError),

    #[error("no image loaded")]
    NoImage,

    #[error("rendering failed: {0}")]
    Cairo(#[from] cairo::Error),
}

/// Runtime options derived from configuration.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub mode: SelectionMode,
    pub min_size: f64,
    pub overlay_style: OverlayStyle,
    pub preview: PreviewGenerator,
    pub background: Color,
    /// Window override applied on load instead of the dataset's window
    pub window: Option<(f64, f64)>,
    /// Inverts on load (combined with MONOCHROME1)
    pub invert: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Rectangle,
            min_size: crate::input::state::DEFAULT_MIN_SELECTION_SIZE,
            overlay_style: OverlayStyle::default(),
            preview: PreviewGenerator::default(),
            background: BLACK,
            window: None,
            invert: false,
        }
    }
}

impl ViewerOptions {
    pub fn from_config(config: &Config) -> Self {
        let window = match (config.viewport.window_center, config.viewport.window_width) {
            (Some(center), Some(width)) => Some((center, width)),
            _ => None,
        };
        Self {
            mode: config.selection.default_mode,
            min_size: config.selection.min_size,
            overlay_style: config.overlay_style(),
            preview: PreviewGenerator::new(config.preview.max_width, config.preview.polygon_clip),
            background: config.viewport.background.to_color(),
            window,
            invert: config.viewport.invert,
        }
    }
}

/// Image viewer with the crop-region selection layered on top.
pub struct Viewer {
    options: ViewerOptions,
    image: Option<DicomImage>,
    viewport: Viewport,
    /// Natural-size VOI render, rebuilt when window or invert change
    grayscale: Option<ImageSurface>,
    /// Display-size render the preview copies from
    display: Option<ImageSurface>,
    display_size: (i32, i32),
    /// Layout size of the hosting element when it differs from the display
    element_size: Option<(f64, f64)>,
    controller: SelectionController,
    overlay: OverlaySurface,
    preview: Option<PreviewImage>,
    /// Last user-visible diagnostic
    status: Option<String>,
}

impl Viewer {
    /// Creates an empty viewer with a display surface of the given size.
    pub fn new(
        options: ViewerOptions,
        display_width: i32,
        display_height: i32,
    ) -> Result<Self, ViewerError> {
        let controller = SelectionController::new(options.mode, options.min_size);
        let overlay = OverlaySurface::new(display_width, display_height)?;
        Ok(Self {
            options,
            image: None,
            viewport: Viewport::default(),
            grayscale: None,
            display: None,
            display_size: (display_width.max(0), display_height.max(0)),
            element_size: None,
            controller,
            overlay,
            preview: None,
            status: None,
        })
    }

    pub fn image(&self) -> Option<&DicomImage> {
        self.image.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SelectionController {
        &mut self.controller
    }

    pub fn display(&self) -> Option<&ImageSurface> {
        self.display.as_ref()
    }

    pub fn overlay(&self) -> &OverlaySurface {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlaySurface {
        &mut self.overlay
    }

    pub fn preview(&self) -> Option<&PreviewImage> {
        self.preview.as_ref()
    }

    pub fn preview_mut(&mut self) -> Option<&mut PreviewImage> {
        self.preview.as_mut()
    }

    pub fn display_size(&self) -> (i32, i32) {
        self.display_size
    }

    /// Last diagnostic meant for the user (e.g. why a load failed).
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Current element-to-surface coordinate mapping.
    pub fn mapping(&self) -> SurfaceMapping {
        match self.element_size {
            Some((w, h)) => SurfaceMapping::new(self.display_size.0, self.display_size.1, w, h),
            None => SurfaceMapping::identity(),
        }
    }

    // ------------------------------------------------------------------
    // Image loading
    // ------------------------------------------------------------------

    /// Reads a DICOM file and displays it.
    ///
    /// On failure the previous image stays displayed and the error is kept
    /// as the status message.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ViewerError> {
        match dicom::load_image(path) {
            Ok(image) => self.load_image(image),
            Err(err) => {
                log::error!("Could not load {}: {}", path.display(), err);
                self.status = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Displays an already decoded image, resetting viewport and selection.
    pub fn load_image(&mut self, image: DicomImage) -> Result<(), ViewerError> {
        let mut viewport = Viewport::for_image(&image, self.display_size.0, self.display_size.1);
        if let Some((center, width)) = self.options.window {
            viewport.set_window(center, width);
        }
        viewport.invert ^= self.options.invert;

        self.image = Some(image);
        self.viewport = viewport;
        self.grayscale = None;
        self.status = None;
        self.controller.clear();
        self.preview = None;
        self.refresh_display()?;
        self.refresh_overlay()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Surface geometry
    // ------------------------------------------------------------------

    /// Resizes the display surface and resynchronizes the overlay.
    ///
    /// With a committed region, the overlay and preview are regenerated
    /// immediately so nothing stale is shown at the new size.
    pub fn resize_display(&mut self, width: i32, height: i32) -> Result<(), ViewerError> {
        let size = (width.max(0), height.max(0));
        if size == self.display_size {
            return Ok(());
        }
        self.display_size = size;
        self.overlay.resize(size.0, size.1)?;
        self.refresh_display()?;
        self.refresh_overlay()?;
        self.refresh_preview();
        Ok(())
    }

    /// Sets the layout size of the hosting element (pointer coordinate space).
    pub fn set_element_size(&mut self, width: f64, height: f64) -> Result<(), ViewerError> {
        self.element_size = Some((width, height));
        self.refresh_overlay()?;
        self.refresh_preview();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Replaces the viewport and re-renders; regenerates a committed preview.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<(), ViewerError> {
        if self.image.is_none() {
            return Err(ViewerError::NoImage);
        }
        let voi_changed = viewport.window_center != self.viewport.window_center
            || viewport.window_width != self.viewport.window_width
            || viewport.invert != self.viewport.invert;
        self.viewport = viewport;
        if voi_changed {
            self.grayscale = None;
        }
        self.refresh_display()?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_window_level(&mut self, center: f64, width: f64) -> Result<(), ViewerError> {
        let mut viewport = self.viewport;
        viewport.set_window(center, width);
        log::debug!("Window/level set to C={:.1} W={:.1}", center, viewport.window_width);
        self.set_viewport(viewport)
    }

    /// Drag-style window adjustment: width by `delta_width`, center by `delta_center`.
    pub fn adjust_window_level(
        &mut self,
        delta_width: f64,
        delta_center: f64,
    ) -> Result<(), ViewerError> {
        let center = self.viewport.window_center + delta_center;
        let width = self.viewport.window_width + delta_width;
        self.set_window_level(center, width)
    }

    pub fn toggle_invert(&mut self) -> Result<(), ViewerError> {
        let mut viewport = self.viewport;
        viewport.invert = !viewport.invert;
        self.set_viewport(viewport)
    }

    pub fn zoom_by(&mut self, factor: f64) -> Result<(), ViewerError> {
        let mut viewport = self.viewport;
        viewport.zoom_by(factor);
        self.set_viewport(viewport)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<(), ViewerError> {
        let mut viewport = self.viewport;
        viewport.translation.0 += dx;
        viewport.translation.1 += dy;
        self.set_viewport(viewport)
    }

    /// Restores the viewport the image was loaded with.
    pub fn reset_viewport(&mut self) -> Result<(), ViewerError> {
        let image = self.image.as_ref().ok_or(ViewerError::NoImage)?;
        let mut viewport = Viewport::for_image(image, self.display_size.0, self.display_size.1);
        if let Some((center, width)) = self.options.window {
            viewport.set_window(center, width);
        }
        viewport.invert ^= self.options.invert;
        self.set_viewport(viewport)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.controller.set_mode(mode) {
            self.settle(SelectionOutcome::Discarded);
        }
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear();
        self.settle(SelectionOutcome::Discarded);
    }

    pub fn on_mouse_press(
        &mut self,
        button: MouseButton,
        point: PointerPoint,
    ) -> SelectionOutcome {
        let outcome = self.controller.on_mouse_press(button, point);
        self.settle(outcome)
    }

    pub fn on_mouse_motion(&mut self, point: PointerPoint) -> SelectionOutcome {
        let outcome = self.controller.on_mouse_motion(point);
        self.settle(outcome)
    }

    pub fn on_mouse_release(
        &mut self,
        button: MouseButton,
        point: PointerPoint,
    ) -> SelectionOutcome {
        let outcome = self.controller.on_mouse_release(button, point);
        self.settle(outcome)
    }

    pub fn on_double_click(&mut self) -> SelectionOutcome {
        let outcome = self.controller.on_double_click();
        self.settle(outcome)
    }

    pub fn on_mouse_leave(&mut self) -> SelectionOutcome {
        let outcome = self.controller.on_mouse_leave();
        self.settle(outcome)
    }

    /// Processes a key press.
    ///
    /// - Escape: clear selection
    /// - R / P: rectangle / polygon mode
    /// - Enter: close polygon
    /// - I: toggle invert
    /// - + / -: zoom in / out, 0: reset viewport
    pub fn on_key_press(&mut self, key: Key) {
        let result = match key {
            Key::Escape => {
                self.clear_selection();
                Ok(())
            }
            Key::Return => {
                self.on_double_click();
                Ok(())
            }
            Key::Char(c) => match c.to_ascii_lowercase() {
                'r' => {
                    self.set_mode(SelectionMode::Rectangle);
                    Ok(())
                }
                'p' => {
                    self.set_mode(SelectionMode::Polygon);
                    Ok(())
                }
                'i' => self.toggle_invert(),
                '+' | '=' => self.zoom_by(ZOOM_STEP),
                '-' | '_' => self.zoom_by(1.0 / ZOOM_STEP),
                '0' => self.reset_viewport(),
                _ => Ok(()),
            },
            Key::Unknown => Ok(()),
        };
        if let Err(err) = result {
            log::debug!("Key {:?} ignored: {}", key, err);
        }
    }

    /// Redraws the overlay from the current controller state.
    pub fn render_overlay(&mut self) -> Result<(), ViewerError> {
        self.refresh_overlay()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Applies the side effects of a selection outcome and returns it.
    ///
    /// The overlay is only re-rendered when the controller marked it stale.
    fn settle(&mut self, outcome: SelectionOutcome) -> SelectionOutcome {
        match outcome {
            SelectionOutcome::Ignored => return outcome,
            SelectionOutcome::Updated => {
                // A new press can drop the committed region without committing.
                if self.controller.committed().is_none() {
                    self.preview = None;
                }
            }
            SelectionOutcome::Committed => self.refresh_preview(),
            SelectionOutcome::Discarded => self.preview = None,
        }
        if self.controller.needs_redraw
            && let Err(err) = self.refresh_overlay()
        {
            log::error!("Overlay render failed: {}", err);
        }
        outcome
    }

    fn refresh_display(&mut self) -> Result<(), ViewerError> {
        let Some(image) = self.image.as_ref() else {
            self.display = None;
            return Ok(());
        };
        if self.grayscale.is_none() {
            self.grayscale = Some(render_grayscale(image, &self.viewport)?);
        }
        if let Some(grayscale) = self.grayscale.as_ref() {
            self.display = Some(render_display(
                grayscale,
                &self.viewport,
                self.display_size.0,
                self.display_size.1,
                self.options.background,
            )?);
        }
        Ok(())
    }

    fn refresh_overlay(&mut self) -> Result<(), ViewerError> {
        let mapping = self.mapping();
        match self.controller.active_shape() {
            Some(shape) => self
                .overlay
                .render(Some(shape), &mapping, &self.options.overlay_style)?,
            None => self.overlay.clear()?,
        }
        self.controller.needs_redraw = false;
        Ok(())
    }

    /// Regenerates the preview when a region is committed.
    fn refresh_preview(&mut self) {
        if self.controller.committed().is_none() {
            self.preview = None;
            return;
        }
        let mapping = self.mapping();
        match self
            .options
            .preview
            .generate(self.controller.committed(), &mapping, self.display.as_ref())
        {
            Ok(preview) => self.preview = Some(preview),
            Err(PreviewError::Cairo(err)) => {
                log::error!("Preview render failed: {}", err);
                self.preview = None;
            }
            Err(err) => {
                log::info!("No preview: {}", err);
                self.preview = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PointerPoint {
        PointerPoint::new(x, y)
    }

    fn gradient_image() -> DicomImage {
        let pixels = (0..256 * 256).map(|i| (i % 256) as i32).collect();
        DicomImage::from_pixels(256, 256, pixels).unwrap()
    }

    fn loaded_viewer() -> Viewer {
        let mut viewer = Viewer::new(ViewerOptions::default(), 512, 512).unwrap();
        viewer.load_image(gradient_image()).unwrap();
        viewer
    }

    fn drag(viewer: &mut Viewer, from: PointerPoint, to: PointerPoint) -> SelectionOutcome {
        viewer.on_mouse_press(MouseButton::Left, from);
        viewer.on_mouse_motion(to);
        viewer.on_mouse_release(MouseButton::Left, to)
    }

    fn preview_pixels(viewer: &mut Viewer) -> Vec<u8> {
        viewer
            .preview_mut()
            .unwrap()
            .surface_mut()
            .data()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn committed_rectangle_produces_preview() {
        let mut viewer = loaded_viewer();

        assert_eq!(
            drag(&mut viewer, p(50.0, 50.0), p(200.0, 150.0)),
            SelectionOutcome::Committed
        );

        let preview = viewer.preview().expect("preview generated");
        assert_eq!((preview.width(), preview.height()), (150, 100));
    }

    #[test]
    fn new_press_after_commit_drops_preview() {
        let mut viewer = loaded_viewer();
        drag(&mut viewer, p(50.0, 50.0), p(200.0, 150.0));
        assert!(viewer.preview().is_some());

        assert_eq!(
            viewer.on_mouse_press(MouseButton::Left, p(300.0, 300.0)),
            SelectionOutcome::Updated
        );

        assert!(viewer.controller().committed().is_none());
        assert!(viewer.preview().is_none());
    }

    #[test]
    fn polygon_restart_drops_clipped_preview() {
        let options = ViewerOptions {
            mode: SelectionMode::Polygon,
            preview: PreviewGenerator {
                polygon_clip: true,
                ..PreviewGenerator::default()
            },
            ..ViewerOptions::default()
        };
        let mut viewer = Viewer::new(options, 512, 512).unwrap();
        viewer.load_image(gradient_image()).unwrap();
        for point in [p(10.0, 10.0), p(200.0, 10.0), p(100.0, 200.0)] {
            viewer.on_mouse_press(MouseButton::Left, point);
        }
        assert_eq!(viewer.on_double_click(), SelectionOutcome::Committed);
        assert!(viewer.preview().is_some());

        viewer.on_mouse_press(MouseButton::Left, p(300.0, 300.0));

        assert!(viewer.controller().committed().is_none());
        assert!(viewer.preview().is_none());
    }

    #[test]
    fn overlay_redraws_only_when_stale() {
        let mut viewer = loaded_viewer();
        drag(&mut viewer, p(50.0, 50.0), p(200.0, 150.0));
        assert!(!viewer.controller().needs_redraw);

        viewer.overlay.clear().unwrap();
        viewer.settle(SelectionOutcome::Updated);
        let data = viewer.overlay_mut().surface_mut().data().unwrap().to_vec();
        assert!(data.iter().all(|b| *b == 0));

        viewer.controller.needs_redraw = true;
        viewer.settle(SelectionOutcome::Updated);
        let data = viewer.overlay_mut().surface_mut().data().unwrap().to_vec();
        assert!(data.iter().any(|b| *b != 0));
        assert!(!viewer.controller().needs_redraw);
    }

    #[test]
    fn discarded_rectangle_clears_overlay_and_preview() {
        let mut viewer = loaded_viewer();
        drag(&mut viewer, p(50.0, 50.0), p(200.0, 150.0));

        assert_eq!(
            drag(&mut viewer, p(10.0, 10.0), p(15.0, 12.0)),
            SelectionOutcome::Discarded
        );

        assert!(viewer.preview().is_none());
        let data = viewer.overlay_mut().surface_mut().data().unwrap().to_vec();
        assert!(data.iter().all(|b| *b == 0));
    }

    #[test]
    fn window_level_change_regenerates_preview() {
        let mut viewer = loaded_viewer();
        drag(&mut viewer, p(100.0, 100.0), p(300.0, 300.0));
        let before = preview_pixels(&mut viewer);

        viewer.set_window_level(40.0, 20.0).unwrap();

        let after = preview_pixels(&mut viewer);
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
        assert!(viewer.controller().committed().is_some());
    }

    #[test]
    fn window_level_change_without_region_has_no_preview() {
        let mut viewer = loaded_viewer();
        viewer.set_window_level(40.0, 20.0).unwrap();
        assert!(viewer.preview().is_none());
    }

    #[test]
    fn resize_keeps_overlay_in_sync() {
        let mut viewer = loaded_viewer();
        drag(&mut viewer, p(50.0, 50.0), p(200.0, 150.0));

        viewer.resize_display(300, 200).unwrap();

        assert_eq!(
            (viewer.overlay().width(), viewer.overlay().height()),
            (300, 200)
        );
        assert_eq!(
            viewer.display().map(|d| (d.width(), d.height())),
            Some((300, 200))
        );
        assert!(viewer.preview().is_some());
    }

    #[test]
    fn element_mapping_scales_preview_source() {
        let mut viewer = loaded_viewer();
        viewer.set_element_size(256.0, 256.0).unwrap();

        drag(&mut viewer, p(20.0, 20.0), p(120.0, 70.0));

        let preview = viewer.preview().unwrap();
        assert_eq!(preview.source_rect, (40.0, 40.0, 200.0, 100.0));
        assert_eq!((preview.width(), preview.height()), (200, 100));
    }

    #[test]
    fn polygon_commit_without_clip_has_no_preview() {
        let mut viewer = loaded_viewer();
        viewer.on_key_press(Key::Char('p'));
        assert_eq!(viewer.controller().mode(), SelectionMode::Polygon);

        for point in [p(0.0, 0.0), p(100.0, 0.0), p(50.0, 100.0)] {
            viewer.on_mouse_press(MouseButton::Left, point);
        }
        assert_eq!(viewer.on_double_click(), SelectionOutcome::Committed);
        assert!(viewer.controller().committed().is_some());
        assert!(viewer.preview().is_none());
    }

    #[test]
    fn escape_clears_selection() {
        let mut viewer = loaded_viewer();
        drag(&mut viewer, p(50.0, 50.0), p(200.0, 150.0));
        viewer.on_key_press(Key::Escape);
        assert!(viewer.controller().committed().is_none());
        assert!(viewer.preview().is_none());
    }

    #[test]
    fn viewport_changes_require_image() {
        let mut viewer = Viewer::new(ViewerOptions::default(), 64, 64).unwrap();
        assert!(matches!(viewer.zoom_by(2.0), Err(ViewerError::NoImage)));
        assert!(viewer.display().is_none());
    }

    #[test]
    fn load_failure_sets_status_message() {
        let mut viewer = Viewer::new(ViewerOptions::default(), 64, 64).unwrap();
        let result = viewer.load_file(Path::new("/nonexistent/scan.dcm"));
        assert!(matches!(result, Err(ViewerError::Dicom(_))));
        assert!(viewer.status_message().is_some());
        assert!(viewer.image().is_none());
    }
}
