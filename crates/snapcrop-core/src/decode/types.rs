//! Pixel buffer types shared by decoding, normalization and extraction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for reading a source image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte stream is not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image data is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image has a zero dimension.
    #[error("Image has no pixels")]
    EmptyImage,

    /// Pixel buffer length disagrees with the stated dimensions.
    #[error("Malformed pixel buffer: {width}x{height} with {len} bytes")]
    MalformedBuffer { width: u32, height: u32, len: usize },
}

/// Filter type for preview resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    ///
    /// No validation happens here; buffers arriving from a host are checked
    /// with [`DecodedImage::validate`] before any pixel access.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a DecodedImage from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Consume into an image::RgbImage without copying the buffer.
    pub fn into_rgb_image(self) -> Result<image::RgbImage, DecodeError> {
        self.validate()?;
        let (width, height, len) = (self.width, self.height, self.pixels.len());
        image::RgbImage::from_raw(self.width, self.height, self.pixels)
            .ok_or(DecodeError::MalformedBuffer { width, height, len })
    }

    /// Expected buffer length for the stated dimensions.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(3)
    }

    /// Check that the buffer is non-empty and matches its dimensions.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.width == 0 || self.height == 0 {
            return Err(DecodeError::EmptyImage);
        }
        if self.expected_len() != Some(self.pixels.len()) {
            return Err(DecodeError::MalformedBuffer {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Read the RGB triple at `(x, y)`. Caller guarantees bounds.
    #[inline]
    pub(crate) fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y as usize * self.width as usize) + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_validate_accepts_consistent_buffer() {
        let img = DecodedImage::new(4, 2, vec![0; 24]);
        assert_eq!(img.validate(), Ok(()));
        assert_eq!(img.pixel_count(), 8);
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let img = DecodedImage::new(0, 10, vec![]);
        assert_eq!(img.validate(), Err(DecodeError::EmptyImage));
        assert!(img.is_empty());
    }

    #[test]
    fn test_validate_rejects_short_buffer() {
        let img = DecodedImage::new(4, 4, vec![0; 10]);
        assert_eq!(
            img.validate(),
            Err(DecodeError::MalformedBuffer {
                width: 4,
                height: 4,
                len: 10
            })
        );
    }

    #[test]
    fn test_into_rgb_image_round_trip() {
        let pixels: Vec<u8> = (0..12).collect();
        let img = DecodedImage::new(2, 2, pixels.clone());
        let rgb = img.into_rgb_image().unwrap();
        assert_eq!(rgb.get_pixel(1, 0).0, [3, 4, 5]);
        assert_eq!(DecodedImage::from_rgb_image(rgb).pixels, pixels);
    }

    #[test]
    fn test_rgb_at_indexes_row_major() {
        let pixels: Vec<u8> = (0..18).collect();
        let img = DecodedImage::new(3, 2, pixels);
        assert_eq!(img.rgb_at(0, 1), [9, 10, 11]);
        assert_eq!(img.rgb_at(2, 1), [15, 16, 17]);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::InvalidFormat;
        assert_eq!(err.to_string(), "Invalid or unsupported image format");

        let err = DecodeError::MalformedBuffer {
            width: 2,
            height: 3,
            len: 7,
        };
        assert_eq!(err.to_string(), "Malformed pixel buffer: 2x3 with 7 bytes");
    }
}
