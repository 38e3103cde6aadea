//! JPEG encoding of the finished crop.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::{DecodeError, DecodedImage};

/// Quality used when the host does not ask for one.
pub const DEFAULT_QUALITY: u8 = 90;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The image buffer is empty or inconsistent with its dimensions.
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] DecodeError),

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGB image to JPEG bytes.
///
/// `quality` is clamped to 1..=100.
pub fn encode_jpeg(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    image.validate()?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    log::debug!(
        "encoded {}x{} crop at quality {} ({} bytes)",
        image.width,
        image.height,
        quality,
        buffer.len()
    );
    Ok(buffer)
}
