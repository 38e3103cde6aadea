//! Image encoding WASM bindings.
//!
//! ```typescript
//! import { encode_jpeg } from '@snapcrop/wasm';
//!
//! const jpegBytes = encode_jpeg(cropped, 90);
//! ```

use crate::types::{js_error, JsDecodedImage};
use snapcrop_core::encode;
use wasm_bindgen::prelude::*;

/// Encode a finished crop to JPEG bytes.
///
/// `quality` is clamped to 1-100; 90 is a good default.
///
/// # Errors
///
/// Returns an error if the pixel data length doesn't match
/// width * height * 3, a dimension is zero, or encoding fails.
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsDecodedImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(&image.to_decoded(), quality).map_err(js_error)
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_basic() {
        let img = JsDecodedImage::new(50, 50, vec![128u8; 50 * 50 * 3]);
        let jpeg = encode_jpeg(&img, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let img = JsDecodedImage::new(100, 100, vec![128u8; 50 * 50 * 3]);
        assert!(encode_jpeg(&img, 90).is_err());
    }
}
