//! WASM bindings for crop, extraction and orientation operations.

use crate::types::{from_js, interpolation, js_error, to_js, JsDecodedImage};
use snapcrop_core::geometry::{Quad, Rect, Size};
use snapcrop_core::orientation::{self, Orientation, OrientedImage};
use snapcrop_core::transform::{apply_crop as core_crop, extract_with_filter};
use wasm_bindgen::prelude::*;

/// Extract the region under four display-space corners and rectify it.
///
/// `corners` is `{ topLeft, topRight, bottomLeft, bottomRight }` with
/// `{ x, y }` points, relative to a view of `display_width x display_height`
/// showing the whole image.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const page = extract_perspective(upright, overlay.corners(), 390, 520, false);
/// ```
#[wasm_bindgen]
pub fn extract_perspective(
    image: &JsDecodedImage,
    corners: JsValue,
    display_width: f64,
    display_height: f64,
    use_lanczos: bool,
) -> Result<JsDecodedImage, JsValue> {
    let corners: Quad = from_js(corners)?;
    extract_with_filter(
        &image.to_decoded(),
        &corners,
        Size::new(display_width, display_height),
        interpolation(use_lanczos),
    )
    .map(JsDecodedImage::from_decoded)
    .map_err(js_error)
}

/// Map a normalized upright crop rect onto the raw buffer for an EXIF
/// orientation. Returns `{ origin: { x, y }, size: { width, height } }`.
#[wasm_bindgen]
pub fn normalize_crop_rect(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    exif_orientation: u32,
) -> Result<JsValue, JsValue> {
    let rect = orientation::normalize_crop_rect(
        &Rect::new(x, y, width, height),
        Orientation::from(exif_orientation),
    );
    to_js(&rect)
}

/// Resample raw pixels tagged with `exif_orientation` so they display
/// upright.
#[wasm_bindgen]
pub fn fix_orientation(
    image: &JsDecodedImage,
    exif_orientation: u32,
) -> Result<JsDecodedImage, JsValue> {
    let oriented = OrientedImage::new(image.to_decoded(), Orientation::from(exif_orientation));
    orientation::fix_orientation(oriented)
        .map(|fixed| JsDecodedImage::from_decoded(fixed.image))
        .map_err(js_error)
}

/// Apply crop to an image using normalized coordinates.
///
/// (0, 0) is the top-left corner and (1, 1) the bottom-right corner.
///
/// ```typescript
/// // Crop the center 50% of the image
/// const cropped = apply_crop(sourceImage, 0.25, 0.25, 0.5, 0.5);
/// ```
#[wasm_bindgen]
pub fn apply_crop(
    image: &JsDecodedImage,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> JsDecodedImage {
    let result = core_crop(&image.to_decoded(), &Rect::new(left, top, width, height));
    JsDecodedImage::from_decoded(result)
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use snapcrop_core::geometry::Point;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_extract_perspective_aligned_square() {
        let src = JsDecodedImage::new(40, 40, vec![90u8; 40 * 40 * 3]);
        let corners = Quad::from_rect(&Rect::new(10.0, 10.0, 20.0, 20.0));
        let js_corners = serde_wasm_bindgen::to_value(&corners).unwrap();
        let out = extract_perspective(&src, js_corners, 40.0, 40.0, false).unwrap();
        assert_eq!((out.width(), out.height()), (20, 20));
    }

    #[wasm_bindgen_test]
    fn test_extract_perspective_rejects_degenerate() {
        let src = JsDecodedImage::new(10, 10, vec![0u8; 300]);
        let p = Point::new(1.0, 1.0);
        let js_corners = serde_wasm_bindgen::to_value(&Quad::new(p, p, p, p)).unwrap();
        assert!(extract_perspective(&src, js_corners, 10.0, 10.0, false).is_err());
    }

    #[wasm_bindgen_test]
    fn test_extract_perspective_rejects_bad_json() {
        let src = JsDecodedImage::new(10, 10, vec![0u8; 300]);
        let bad = serde_wasm_bindgen::to_value(&"corners").unwrap();
        assert!(extract_perspective(&src, bad, 10.0, 10.0, false).is_err());
    }

    #[wasm_bindgen_test]
    fn test_normalize_crop_rect_down() {
        let value = normalize_crop_rect(0.1, 0.2, 0.3, 0.4, 3).unwrap();
        let rect: Rect = serde_wasm_bindgen::from_value(value).unwrap();
        assert!((rect.origin.x - 0.6).abs() < 1e-9);
        assert!((rect.origin.y - 0.4).abs() < 1e-9);
    }
}
