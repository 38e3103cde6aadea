//! Axis-aligned cropping with normalized coordinates.
//!
//! Crop rects are expressed in the 0.0..1.0 range relative to the buffer
//! they are applied to, with the origin at the top-left pixel. A rect
//! produced by [`crate::orientation::raw_crop_rect`] can be applied to a
//! raw, not yet re-oriented buffer.

use crate::decode::DecodedImage;
use crate::geometry::Rect;

/// Cut a normalized rect out of `image`.
///
/// - Coordinates outside 0..1 are clamped to the image.
/// - The output is at least 1x1 pixels.
/// - The full rect `(0, 0, 1, 1)` returns a copy of the source.
/// - Non-finite fields are treated as the full extent.
pub fn apply_crop(image: &DecodedImage, rect: &Rect) -> DecodedImage {
    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let left = finite_or(rect.origin.x, 0.0);
    let top = finite_or(rect.origin.y, 0.0);
    let width = finite_or(rect.width(), 1.0);
    let height = finite_or(rect.height(), 1.0);

    if image.is_empty() || (left <= 0.0 && top <= 0.0 && width >= 1.0 && height >= 1.0) {
        return image.clone();
    }

    let src_w = image.width as f64;
    let src_h = image.height as f64;

    let px_left = (left.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_top = (top.clamp(0.0, 1.0) * src_h).round() as u32;
    let px_width = (width.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_height = (height.clamp(0.0, 1.0) * src_h).round() as u32;

    let px_left = px_left.min(image.width.saturating_sub(1));
    let px_top = px_top.min(image.height.saturating_sub(1));
    let px_right = (px_left + px_width).min(image.width);
    let px_bottom = (px_top + px_height).min(image.height);

    let out_width = px_right.saturating_sub(px_left).max(1);
    let out_height = px_bottom.saturating_sub(px_top).max(1);

    let row_bytes = (out_width * 3) as usize;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);
    for y in px_top..px_top + out_height {
        let start = ((y * image.width + px_left) * 3) as usize;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage::new(out_width, out_height, output)
}
