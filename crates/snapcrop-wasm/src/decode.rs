//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_oriented`] - Decode JPEG/PNG bytes, keeping the EXIF orientation
//! - [`preview_for_display`] - Downscale to a viewport at a device pixel ratio
//! - [`resize_to_fit`] - Downscale to fit a box with a chosen filter
//!
//! # Example
//!
//! ```typescript
//! const source = decode_oriented(bytes);
//! console.log(`raw ${source.width}x${source.height}, EXIF ${source.orientation}`);
//! const preview = preview_for_display(source.upright(), 390, 844, devicePixelRatio);
//! ```

use crate::types::{filter_from_u8, js_error, JsDecodedImage};
use snapcrop_core::decode;
use snapcrop_core::orientation::{
    fix_mirrored_orientation, fix_orientation, Orientation, OrientedImage,
};
use wasm_bindgen::prelude::*;

/// A raw pixel buffer together with its orientation tag.
#[wasm_bindgen]
pub struct JsOrientedImage {
    inner: OrientedImage,
}

#[wasm_bindgen]
impl JsOrientedImage {
    /// Wrap raw pixels with an EXIF orientation value (1..=8; others mean "up").
    #[wasm_bindgen(constructor)]
    pub fn new(image: &JsDecodedImage, exif_orientation: u32) -> JsOrientedImage {
        JsOrientedImage {
            inner: OrientedImage::new(image.to_decoded(), Orientation::from(exif_orientation)),
        }
    }

    /// EXIF orientation value (1..=8)
    #[wasm_bindgen(getter)]
    pub fn orientation(&self) -> u32 {
        self.inner.orientation.to_exif()
    }

    /// Raw buffer width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.image.width
    }

    /// Raw buffer height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.image.height
    }

    /// Width once displayed upright
    #[wasm_bindgen(getter)]
    pub fn upright_width(&self) -> u32 {
        self.inner.upright_dimensions().0
    }

    /// Height once displayed upright
    #[wasm_bindgen(getter)]
    pub fn upright_height(&self) -> u32 {
        self.inner.upright_dimensions().1
    }

    /// Copy of the raw, not re-oriented pixels.
    pub fn raw(&self) -> JsDecodedImage {
        JsDecodedImage::from_decoded(self.inner.image.clone())
    }

    /// Pixels resampled so the orientation is "up".
    pub fn upright(&self) -> Result<JsDecodedImage, JsValue> {
        fix_orientation(self.inner.clone())
            .map(|oriented| JsDecodedImage::from_decoded(oriented.image))
            .map_err(js_error)
    }

    /// Same pixels relabeled with the horizontally mirrored orientation,
    /// as needed for front-camera captures.
    pub fn mirrored(&self) -> Result<JsOrientedImage, JsValue> {
        fix_mirrored_orientation(self.inner.clone())
            .map(|inner| JsOrientedImage { inner })
            .map_err(js_error)
    }
}

/// Decode JPEG or PNG bytes without applying the orientation tag.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is
/// corrupted or truncated.
#[wasm_bindgen]
pub fn decode_oriented(bytes: &[u8]) -> Result<JsOrientedImage, JsValue> {
    decode::decode_oriented(bytes)
        .map(|inner| JsOrientedImage { inner })
        .map_err(js_error)
}

/// Downscale `image` for a viewport of `viewport_width x viewport_height`
/// points at `pixel_ratio` device pixels per point. Never upscales.
#[wasm_bindgen]
pub fn preview_for_display(
    image: &JsDecodedImage,
    viewport_width: f64,
    viewport_height: f64,
    pixel_ratio: f64,
) -> Result<JsDecodedImage, JsValue> {
    decode::preview_for_display(
        &image.to_decoded(),
        viewport_width,
        viewport_height,
        pixel_ratio,
    )
    .map(JsDecodedImage::from_decoded)
    .map_err(js_error)
}

/// Fit `image` within `max_width x max_height`, preserving aspect ratio.
///
/// `filter`: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsDecodedImage,
    max_width: u32,
    max_height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize_to_fit(&image.to_decoded(), max_width, max_height, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oriented_image_dimensions() {
        let raw = JsDecodedImage::new(6, 4, vec![0u8; 6 * 4 * 3]);
        let oriented = JsOrientedImage::new(&raw, 6);
        assert_eq!(oriented.orientation(), 6);
        assert_eq!((oriented.width(), oriented.height()), (6, 4));
        assert_eq!((oriented.upright_width(), oriented.upright_height()), (4, 6));
        assert_eq!(oriented.raw().byte_length(), 72);
    }

    #[test]
    fn test_unknown_exif_value_is_up() {
        let raw = JsDecodedImage::new(2, 2, vec![0u8; 12]);
        assert_eq!(JsOrientedImage::new(&raw, 42).orientation(), 1);
    }

    #[test]
    fn test_upright_rotates_pixels() {
        let raw = JsDecodedImage::new(3, 2, vec![9u8; 3 * 2 * 3]);
        let upright = JsOrientedImage::new(&raw, 8).upright().unwrap();
        assert_eq!((upright.width(), upright.height()), (2, 3));
    }

    #[test]
    fn test_mirrored_relabels() {
        let raw = JsDecodedImage::new(2, 2, vec![0u8; 12]);
        let mirrored = JsOrientedImage::new(&raw, 6).mirrored().unwrap();
        // Right <-> LeftMirrored
        assert_eq!(mirrored.orientation(), 5);
    }
}
