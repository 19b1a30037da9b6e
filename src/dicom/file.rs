//! Dataset access backed by `dicom-object`.

use super::{Dataset, DicomError, DicomImage, Tag};
use dicom_dictionary_std::tags;
use dicom_object::{DefaultDicomObject, InMemDicomObject, open_file};
use std::borrow::Cow;
use std::path::Path;

impl Dataset for InMemDicomObject {
    fn string(&self, tag: Tag) -> Option<String> {
        let element = self.element(tag).ok()?;
        let value = element.to_str().ok()?;
        let trimmed = value.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn uint16(&self, tag: Tag) -> Option<u16> {
        self.element(tag).ok()?.to_int::<u16>().ok()
    }

    fn float_string(&self, tag: Tag) -> Option<f64> {
        self.element(tag).ok()?.to_float64().ok()
    }

    fn pixel_data(&self) -> Option<Cow<'_, [u8]>> {
        self.element(tags::PIXEL_DATA).ok()?.to_bytes().ok()
    }
}

/// Reads and parses a DICOM file.
pub fn open_dataset(path: &Path) -> Result<DefaultDicomObject, DicomError> {
    log::debug!("Opening DICOM file {}", path.display());
    open_file(path).map_err(|err| DicomError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Reads a DICOM file and builds a displayable image from it.
pub fn load_image(path: &Path) -> Result<DicomImage, DicomError> {
    let object = open_dataset(path)?;
    let image = DicomImage::from_dataset(&*object)?;
    log::info!(
        "Loaded {} ({}x{}, view {})",
        path.display(),
        image.columns,
        image.rows,
        image.formatted_tags()
    );
    Ok(image)
}
