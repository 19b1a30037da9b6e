//! Thumbnails sorted into containers by anatomical view.

use crate::dicom::ViewContainer;
use crate::util;
use cairo::{Context, Format, ImageSurface};
use std::collections::BTreeMap;

/// Default larger-side size of a thumbnail in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: f64 = 128.0;

/// Downscaled snapshot of a rendered image.
pub struct Thumbnail {
    /// Label shown with the thumbnail (usually the source file name)
    pub label: String,
    surface: ImageSurface,
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("label", &self.label)
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .finish()
    }
}

impl Thumbnail {
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }
}

/// Thumbnails grouped per [`ViewContainer`], in insertion order.
#[derive(Debug)]
pub struct ThumbnailBoard {
    size: f64,
    containers: BTreeMap<ViewContainer, Vec<Thumbnail>>,
}

impl Default for ThumbnailBoard {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl ThumbnailBoard {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            containers: BTreeMap::new(),
        }
    }

    /// Adds a downscaled copy of `source` to `container`.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        container: ViewContainer,
        source: &ImageSurface,
    ) -> Result<&Thumbnail, cairo::Error> {
        let width = source.width() as f64;
        let height = source.height() as f64;
        let scale = util::downscale_factor(width, height, self.size);
        let (out_w, out_h) = util::scaled_size(width, height, self.size);

        let surface = ImageSurface::create(Format::ARgb32, out_w, out_h)?;
        {
            let ctx = Context::new(&surface)?;
            ctx.scale(scale, scale);
            ctx.set_source_surface(source, 0.0, 0.0)?;
            ctx.source().set_filter(cairo::Filter::Good);
            ctx.paint()?;
        }
        surface.flush();

        let label = label.into();
        log::debug!("Sorted thumbnail '{}' into {}", label, container.id());
        let entries = self.containers.entry(container).or_default();
        let index = entries.len();
        entries.push(Thumbnail { label, surface });
        Ok(&entries[index])
    }

    /// Thumbnails in a container, oldest first.
    pub fn thumbnails(&self, container: ViewContainer) -> &[Thumbnail] {
        self.containers
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Selects a thumbnail for display.
    pub fn show(&self, container: ViewContainer, index: usize) -> Option<&Thumbnail> {
        self.thumbnails(container).get(index)
    }

    pub fn len(&self) -> usize {
        self.containers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
