//! Source decoding: pixel buffer plus EXIF orientation.
//!
//! The fetch layer hands over encoded bytes. Pixels are decoded as stored
//! and the orientation tag is read separately, so the crop path can work
//! on the raw buffer and re-orient only the result.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;

use super::{DecodeError, DecodedImage};
use crate::orientation::{fix_orientation, Orientation, OrientedImage};

/// Decode JPEG or PNG bytes without applying the orientation tag.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be guessed
/// and `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_oriented(bytes: &[u8]) -> Result<OrientedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let image = DecodedImage::from_rgb_image(img.into_rgb8());
    image.validate()?;

    let orientation = read_orientation(bytes);
    log::debug!(
        "decoded {}x{} source, orientation {:?}",
        image.width,
        image.height,
        orientation
    );
    Ok(OrientedImage::new(image, orientation))
}

/// Decode and re-orient so the buffer matches its visual appearance.
pub fn decode_upright(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let oriented = decode_oriented(bytes)?;
    Ok(fix_orientation(oriented)?.image)
}

/// Read the EXIF orientation tag.
///
/// Missing or unreadable EXIF data yields `Orientation::Up`.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}
