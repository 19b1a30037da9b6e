//! DICOM dataset access.
//!
//! Parsing is delegated to `dicom-object`; this module only exposes the
//! tag-keyed lookups the viewer needs ([`Dataset`]) and builds a displayable
//! [`DicomImage`] from them. [`view`] classifies images by anatomical view
//! for thumbnail sorting.

pub mod file;
pub mod image;
pub mod view;

pub use dicom_core::Tag;
pub use file::{load_image, open_dataset};
pub use image::DicomImage;
pub use view::ViewContainer;

use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;

/// Tag-keyed read access to a parsed DICOM dataset.
pub trait Dataset {
    /// Text value with surrounding padding removed; `None` when absent or empty.
    fn string(&self, tag: Tag) -> Option<String>;

    /// Unsigned 16-bit value (US).
    fn uint16(&self, tag: Tag) -> Option<u16>;

    /// First value of a decimal string (DS) element.
    fn float_string(&self, tag: Tag) -> Option<f64>;

    /// Raw native pixel data bytes.
    fn pixel_data(&self) -> Option<Cow<'_, [u8]>>;
}

/// Errors raised while turning a dataset into a displayable image.
///
/// These surface to the user as a diagnostic message; the load is aborted
/// and the viewer keeps its previous image.
#[derive(Debug, Error)]
pub enum DicomError {
    #[error("failed to read DICOM file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("missing required element {0}")]
    MissingElement(&'static str),

    #[error("no pixel data element found")]
    MissingPixelData,

    #[error("unsupported bits allocated: {0}")]
    UnsupportedBitsAllocated(u16),

    #[error("pixel data holds {actual} bytes, expected at least {expected}")]
    TruncatedPixelData { expected: usize, actual: usize },
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory dataset for unit tests.
    #[derive(Default)]
    pub struct MemoryDataset {
        pub strings: HashMap<Tag, String>,
        pub numbers: HashMap<Tag, u16>,
        pub pixels: Option<Vec<u8>>,
    }

    impl MemoryDataset {
        pub fn with_string(mut self, tag: Tag, value: &str) -> Self {
            self.strings.insert(tag, value.to_string());
            self
        }

        pub fn with_u16(mut self, tag: Tag, value: u16) -> Self {
            self.numbers.insert(tag, value);
            self
        }

        pub fn with_pixels(mut self, pixels: Vec<u8>) -> Self {
            self.pixels = Some(pixels);
            self
        }
    }

    impl Dataset for MemoryDataset {
        fn string(&self, tag: Tag) -> Option<String> {
            self.strings
                .get(&tag)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }

        fn uint16(&self, tag: Tag) -> Option<u16> {
            self.numbers.get(&tag).copied()
        }

        fn float_string(&self, tag: Tag) -> Option<f64> {
            self.string(tag)?.split('\\').next()?.trim().parse().ok()
        }

        fn pixel_data(&self) -> Option<Cow<'_, [u8]>> {
            self.pixels.as_deref().map(Cow::Borrowed)
        }
    }
}
