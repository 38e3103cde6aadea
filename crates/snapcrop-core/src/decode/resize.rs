//! Preview downscaling.
//!
//! The crop screen shows a preview no larger than the host viewport in
//! device pixels. Cropping and extraction always run against the full
//! resolution source, so these helpers only feed the display path.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` for a zero target dimension and
/// `DecodeError::MalformedBuffer` if the source buffer is inconsistent.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage);
    }
    image.validate()?;

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image.to_rgb_image().ok_or(DecodeError::MalformedBuffer {
        width: image.width,
        height: image.height,
        len: image.pixels.len(),
    })?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Scale an image down so it fits inside `max_width x max_height`,
/// preserving aspect ratio. Images that already fit are returned unchanged.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_width == 0 || max_height == 0 {
        return Err(DecodeError::EmptyImage);
    }
    image.validate()?;

    if image.width <= max_width && image.height <= max_height {
        return Ok(image.clone());
    }

    let (new_width, new_height) =
        calculate_fit_dimensions(image.width, image.height, max_width, max_height);
    log::debug!(
        "downscaling preview {}x{} -> {}x{}",
        image.width,
        image.height,
        new_width,
        new_height
    );

    resize(image, new_width, new_height, filter)
}

/// Preview for a viewport of `viewport_width x viewport_height` points at
/// `pixel_ratio` device pixels per point.
pub fn preview_for_display(
    image: &DecodedImage,
    viewport_width: f64,
    viewport_height: f64,
    pixel_ratio: f64,
) -> Result<DecodedImage, DecodeError> {
    let scale = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    };
    let to_px = |v: f64| {
        if v.is_finite() && v > 0.0 {
            (v * scale).floor().min(u32::MAX as f64) as u32
        } else {
            0
        }
    };
    resize_to_fit(
        image,
        to_px(viewport_width),
        to_px(viewport_height),
        FilterType::Bilinear,
    )
}

/// Largest dimensions with the source aspect ratio fitting in the box.
fn calculate_fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (new_width, new_height)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: fitted dimensions stay inside the box and are never zero.
        #[test]
        fn prop_fit_within_box(
            w in 1u32..10_000,
            h in 1u32..10_000,
            mw in 1u32..4_000,
            mh in 1u32..4_000,
        ) {
            let (fw, fh) = calculate_fit_dimensions(w, h, mw, mh);
            prop_assert!(fw >= 1 && fw <= mw);
            prop_assert!(fh >= 1 && fh <= mh);
        }
    }
}
