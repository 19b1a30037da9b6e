//! Displayable grayscale image built from a DICOM dataset.

use super::view::{self, ViewContainer};
use super::{Dataset, DicomError};
use dicom_dictionary_std::tags;

/// Window used when the dataset carries none.
pub const DEFAULT_WINDOW_CENTER: f64 = 128.0;
pub const DEFAULT_WINDOW_WIDTH: f64 = 256.0;

/// Single-frame grayscale image with the attributes needed for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomImage {
    pub rows: u16,
    pub columns: u16,
    /// Stored pixel values, row-major
    pixels: Vec<i32>,
    pub slope: f64,
    pub intercept: f64,
    pub window_center: f64,
    pub window_width: f64,
    /// MONOCHROME1: low values display bright
    pub monochrome1: bool,
    pub laterality: Option<String>,
    pub view_position: Option<String>,
}

impl DicomImage {
    /// Builds an image from stored pixel values with default display attributes.
    pub fn from_pixels(columns: u16, rows: u16, pixels: Vec<i32>) -> Result<Self, DicomError> {
        let expected = columns as usize * rows as usize;
        if pixels.len() < expected {
            return Err(DicomError::TruncatedPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            pixels,
            slope: 1.0,
            intercept: 0.0,
            window_center: DEFAULT_WINDOW_CENTER,
            window_width: DEFAULT_WINDOW_WIDTH,
            monochrome1: false,
            laterality: None,
            view_position: None,
        })
    }

    /// Reads geometry, pixel data and display attributes from a dataset.
    ///
    /// Rows, columns and pixel data are required; everything else falls back
    /// to a linear 8-bit style display (slope 1, intercept 0, window 128/256).
    pub fn from_dataset<D: Dataset + ?Sized>(dataset: &D) -> Result<Self, DicomError> {
        let rows = dataset
            .uint16(tags::ROWS)
            .ok_or(DicomError::MissingElement("Rows (0028,0010)"))?;
        let columns = dataset
            .uint16(tags::COLUMNS)
            .ok_or(DicomError::MissingElement("Columns (0028,0011)"))?;
        let bits_allocated = dataset.uint16(tags::BITS_ALLOCATED).unwrap_or(16);
        let signed = dataset.uint16(tags::PIXEL_REPRESENTATION) == Some(1);
        let data = dataset.pixel_data().ok_or(DicomError::MissingPixelData)?;

        let count = rows as usize * columns as usize;
        let pixels = decode_pixels(&data, count, bits_allocated, signed)?;

        let mut image = Self::from_pixels(columns, rows, pixels)?;
        image.slope = dataset.float_string(tags::RESCALE_SLOPE).unwrap_or(1.0);
        image.intercept = dataset.float_string(tags::RESCALE_INTERCEPT).unwrap_or(0.0);
        image.window_center = dataset
            .float_string(tags::WINDOW_CENTER)
            .unwrap_or(DEFAULT_WINDOW_CENTER);
        image.window_width = dataset
            .float_string(tags::WINDOW_WIDTH)
            .filter(|w| *w >= 1.0)
            .unwrap_or(DEFAULT_WINDOW_WIDTH);
        image.monochrome1 = dataset
            .string(tags::PHOTOMETRIC_INTERPRETATION)
            .is_some_and(|p| p == "MONOCHROME1");
        image.laterality = dataset.string(tags::IMAGE_LATERALITY);
        image.view_position = dataset.string(tags::VIEW_POSITION);
        Ok(image)
    }

    pub fn width(&self) -> i32 {
        self.columns as i32
    }

    pub fn height(&self) -> i32 {
        self.rows as i32
    }

    pub fn pixels(&self) -> &[i32] {
        &self.pixels
    }

    /// Stored value at (x, y); `None` outside the image.
    pub fn pixel(&self, x: u16, y: u16) -> Option<i32> {
        if x >= self.columns || y >= self.rows {
            return None;
        }
        self.pixels
            .get(y as usize * self.columns as usize + x as usize)
            .copied()
    }

    /// Stored value mapped through the modality rescale.
    pub fn modality_value(&self, stored: i32) -> f64 {
        stored as f64 * self.slope + self.intercept
    }

    /// "`<laterality>-<view>`" with "Unknown" for missing parts.
    pub fn formatted_tags(&self) -> String {
        view::formatted_tags(self.laterality.as_deref(), self.view_position.as_deref())
    }

    /// Thumbnail container for this image's anatomical view.
    pub fn container(&self) -> ViewContainer {
        ViewContainer::from_formatted(&self.formatted_tags())
    }
}

fn decode_pixels(
    data: &[u8],
    count: usize,
    bits_allocated: u16,
    signed: bool,
) -> Result<Vec<i32>, DicomError> {
    let bytes_per_pixel = match bits_allocated {
        8 => 1,
        16 => 2,
        other => return Err(DicomError::UnsupportedBitsAllocated(other)),
    };
    let expected = count * bytes_per_pixel;
    if data.len() < expected {
        return Err(DicomError::TruncatedPixelData {
            expected,
            actual: data.len(),
        });
    }

    let pixels = match (bytes_per_pixel, signed) {
        (1, false) => data[..count].iter().map(|&b| b as i32).collect(),
        (1, true) => data[..count].iter().map(|&b| b as i8 as i32).collect(),
        (_, false) => data[..expected]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]) as i32)
            .collect(),
        (_, true) => data[..expected]
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as i32)
            .collect(),
    };
    Ok(pixels)
}
