#![allow(dead_code)]

use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::InMemDicomObject;
use dicom_object::meta::FileMetaTableBuilder;
use std::path::Path;

/// Writes an 8-bit MONOCHROME2 image whose value ramps left to right.
pub fn write_gradient_dicom(
    path: &Path,
    columns: u16,
    rows: u16,
    laterality: Option<&str>,
    view_position: Option<&str>,
) {
    let pixels: Vec<u8> = (0..rows as usize * columns as usize)
        .map(|i| ((i % columns as usize) * 255 / columns.max(1) as usize) as u8)
        .collect();

    let mut obj = InMemDicomObject::new_empty();
    put(
        &mut obj,
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    );
    put(
        &mut obj,
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from("1.2.826.0.1.3680043.2.1125.1"),
    );
    put(&mut obj, tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16));
    put(&mut obj, tags::PHOTOMETRIC_INTERPRETATION, VR::CS, PrimitiveValue::from("MONOCHROME2"));
    put(&mut obj, tags::ROWS, VR::US, PrimitiveValue::from(rows));
    put(&mut obj, tags::COLUMNS, VR::US, PrimitiveValue::from(columns));
    put(&mut obj, tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(8_u16));
    put(&mut obj, tags::BITS_STORED, VR::US, PrimitiveValue::from(8_u16));
    put(&mut obj, tags::HIGH_BIT, VR::US, PrimitiveValue::from(7_u16));
    put(&mut obj, tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16));
    if let Some(laterality) = laterality {
        put(&mut obj, tags::IMAGE_LATERALITY, VR::CS, PrimitiveValue::from(laterality));
    }
    if let Some(view) = view_position {
        put(&mut obj, tags::VIEW_POSITION, VR::CS, PrimitiveValue::from(view));
    }
    put(&mut obj, tags::PIXEL_DATA, VR::OB, PrimitiveValue::U8(pixels.into()));

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.1"),
        )
        .expect("valid file meta");
    file.write_to_file(path).expect("write DICOM file");
}

fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: PrimitiveValue) {
    obj.put(DataElement::new(tag, vr, value));
}
