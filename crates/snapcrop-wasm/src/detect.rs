//! Rectangle detection binding.

use crate::types::{from_js_or_default, to_js, JsDecodedImage};
use snapcrop_core::detect::{self, ContourRectangleDetector, DetectorConfig};
use wasm_bindgen::prelude::*;

/// Find the most confident rectangle in `image`.
///
/// `config` is an optional `DetectorConfig` object (`blurSigma`,
/// `minAreaRatio`, `polyEpsilon`, `minConfidence`); missing fields take
/// their defaults. Returns `{ corners, confidence }` in processing space
/// (origin bottom-left) or `null` when nothing was found.
#[wasm_bindgen]
pub fn detect_quad(image: &JsDecodedImage, config: JsValue) -> Result<JsValue, JsValue> {
    let config: DetectorConfig = from_js_or_default(config)?;
    let detector = ContourRectangleDetector::new(config);
    match detect::detect_quad(&image.to_decoded(), &detector) {
        Some(found) => to_js(&found),
        None => Ok(JsValue::NULL),
    }
}
