//! Perspective-corrected extraction of a quadrilateral region.
//!
//! # Algorithm
//!
//! 1. Convert the display-space corners to processing space and scale
//!    them to native pixels.
//! 2. Reject degenerate quads and outputs larger than
//!    [`MAX_OUTPUT_SCALE`] times the source's pixel count.
//! 3. Solve the homography taking the quad onto an axis-aligned
//!    rectangle the size of the quad's bounding box.
//! 4. For every output pixel, map its center through the inverse
//!    homography and sample the source there.
//!
//! Corners are used in the order given. Supplying them mirrored or
//! rotated (with consistent winding) produces a mirrored or rotated
//! result, not an error.

use image::{Rgb, RgbImage};
use thiserror::Error;

use super::InterpolationFilter;
use crate::decode::{DecodeError, DecodedImage};
use crate::geometry::{
    apply_projective, to_processing_space, DegenerateReason, Point, ProjectiveTransform, Quad, Size,
};

/// Error types for crop and extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CropError {
    /// The corners do not describe a usable region.
    #[error("Degenerate crop quad: {0}")]
    DegenerateQuad(#[from] DegenerateReason),

    /// The displayed size has a zero or non-finite dimension.
    #[error("Display size must be positive and finite")]
    InvalidDisplaySize,

    /// The quad reaches so far past the source that the output buffer
    /// would be unreasonably large.
    #[error("Output of {pixels} pixels exceeds the limit of {limit}")]
    OutputTooLarge { pixels: u64, limit: u64 },

    /// The source buffer is unusable.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Largest output allowed, as a multiple of the source's pixel count.
pub const MAX_OUTPUT_SCALE: u64 = 4;

/// Extract the region under `corners` with bilinear sampling.
///
/// `corners` are in display space relative to a view of `display_size`
/// showing the whole of `image`.
pub fn extract(
    image: &DecodedImage,
    corners: &Quad,
    display_size: Size,
) -> Result<DecodedImage, CropError> {
    extract_with_filter(image, corners, display_size, InterpolationFilter::Bilinear)
}

/// [`extract`] with an explicit interpolation filter.
pub fn extract_with_filter(
    image: &DecodedImage,
    corners: &Quad,
    display_size: Size,
    filter: InterpolationFilter,
) -> Result<DecodedImage, CropError> {
    image.validate()?;
    let quad = to_image_processing_space(corners, display_size, image)?;
    quad.validate()?;

    let bounds = quad.bounding_box();
    let (out_w, out_h) = output_dimensions(bounds.width(), bounds.height(), image)?;
    let (w, h) = (out_w as f64, out_h as f64);

    // Processing space: the output's top edge sits at y = h.
    let target = [
        Point::new(0.0, h),
        Point::new(w, h),
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
    ];
    let forward = ProjectiveTransform::from_quad_to_quad(quad.corners(), target)
        .ok_or(DegenerateReason::Collinear)?;
    let inverse = forward.invert().ok_or(DegenerateReason::Collinear)?;

    log::debug!(
        "extracting {}x{} region from {}x{} source",
        out_w,
        out_h,
        image.width,
        image.height
    );

    let src_h = image.height as f64;
    let output = RgbImage::from_fn(out_w, out_h, |i, j| {
        let center = Point::new(i as f64 + 0.5, h - (j as f64 + 0.5));
        let pixel = match apply_projective(center, &inverse) {
            // Back to buffer rows, then to pixel-center coordinates.
            Some(src) => filter.sample(image, src.x - 0.5, (src_h - src.y) - 0.5),
            None => [0, 0, 0],
        };
        Rgb(pixel)
    });

    Ok(DecodedImage::from_rgb_image(output))
}

/// Output size for a bounding box of `width x height` native pixels.
fn output_dimensions(
    width: f64,
    height: f64,
    image: &DecodedImage,
) -> Result<(u32, u32), CropError> {
    let limit = (image.width as u64 * image.height as u64).saturating_mul(MAX_OUTPUT_SCALE);
    let w = width.round().max(1.0);
    let h = height.round().max(1.0);
    // Float-to-int casts saturate, so oversized extents stay oversized.
    let pixels = (w * h) as u64;
    let too_large = CropError::OutputTooLarge { pixels, limit };

    if !w.is_finite() || !h.is_finite() || pixels > limit {
        return Err(too_large);
    }
    if w > u32::MAX as f64 || h > u32::MAX as f64 {
        return Err(too_large);
    }
    let (out_w, out_h) = (w as u32, h as u32);
    (out_w as usize)
        .checked_mul(out_h as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(too_large)?;
    Ok((out_w, out_h))
}

/// Display-space corners to processing space in native pixel units.
fn to_image_processing_space(
    corners: &Quad,
    display_size: Size,
    image: &DecodedImage,
) -> Result<Quad, CropError> {
    if display_size.is_empty() {
        return Err(CropError::InvalidDisplaySize);
    }
    let sx = image.width as f64 / display_size.width;
    let sy = image.height as f64 / display_size.height;

    let mut out = *corners;
    for corner in crate::geometry::Corner::ALL {
        let p = to_processing_space(corners.corner(corner), display_size)
            .ok_or(CropError::InvalidDisplaySize)?;
        out.set_corner(corner, Point::new(p.x * sx, p.y * sy));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::transform::apply_crop;

    fn coded_image(width: u32, height: u32) -> DecodedImage {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 3) as u8, (y * 3) as u8, 50]));
        DecodedImage::from_rgb_image(img)
    }

    #[test]
    fn test_aligned_square_matches_plain_crop() {
        let img = coded_image(80, 80);
        let quad = Quad::from_rect(&Rect::new(10.0, 20.0, 40.0, 40.0));
        let out = extract(&img, &quad, Size::new(80.0, 80.0)).unwrap();

        assert_eq!((out.width, out.height), (40, 40));
        let expected = apply_crop(&img, &Rect::new(0.125, 0.25, 0.5, 0.5));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_display_scale_is_applied() {
        let img = coded_image(80, 80);
        // Same region, shown at half size
        let quad = Quad::from_rect(&Rect::new(5.0, 10.0, 20.0, 20.0));
        let out = extract(&img, &quad, Size::new(40.0, 40.0)).unwrap();

        assert_eq!((out.width, out.height), (40, 40));
        assert_eq!(out.rgb_at(0, 0), img.rgb_at(10, 20));
        assert_eq!(out.rgb_at(39, 39), img.rgb_at(49, 59));
    }

    #[test]
    fn test_full_image_quad_is_identity() {
        let img = coded_image(30, 20);
        let quad = Quad::from_rect(&Rect::new(0.0, 0.0, 300.0, 200.0));
        let out = extract(&img, &quad, Size::new(300.0, 200.0)).unwrap();

        assert_eq!((out.width, out.height), (30, 20));
        for (a, b) in out.pixels.iter().zip(img.pixels.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_trapezoid_output_is_bounding_box() {
        let img = coded_image(100, 100);
        let quad = Quad::new(
            Point::new(30.0, 10.0),
            Point::new(70.0, 10.0),
            Point::new(10.0, 90.0),
            Point::new(90.0, 90.0),
        );
        let out = extract(&img, &quad, Size::new(100.0, 100.0)).unwrap();
        assert_eq!((out.width, out.height), (80, 80));
        assert!(out.validate().is_ok());
        // Top edge is stretched from a 40px span, so its first pixel comes
        // from near (30, 10).
        let [r, g, _] = out.rgb_at(0, 0);
        assert!((r as i32 - 90).abs() <= 3, "r = {}", r);
        assert!((g as i32 - 30).abs() <= 3, "g = {}", g);
    }

    #[test]
    fn test_mirrored_corner_order_flips_output() {
        let img = coded_image(4, 4);
        let quad = Quad::new(
            Point::new(4.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        );
        let out = extract(&img, &quad, Size::new(4.0, 4.0)).unwrap();
        let flipped = image::imageops::flip_horizontal(&img.to_rgb_image().unwrap());
        assert_eq!(out, DecodedImage::from_rgb_image(flipped));
    }

    #[test]
    fn test_degenerate_quad_is_rejected() {
        let img = coded_image(10, 10);
        let p = Point::new(5.0, 5.0);
        let err = extract(&img, &Quad::new(p, p, p, p), Size::new(10.0, 10.0)).unwrap_err();
        assert_eq!(err, CropError::DegenerateQuad(DegenerateReason::CoincidentCorners));

        let collinear = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(2.0, 2.0),
            Point::new(9.0, 9.0),
        );
        assert!(matches!(
            extract(&img, &collinear, Size::new(10.0, 10.0)),
            Err(CropError::DegenerateQuad(_))
        ));
    }

    #[test]
    fn test_bow_tie_is_rejected() {
        let img = coded_image(10, 10);
        let quad = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(1.0, 9.0),
        );
        assert!(matches!(
            extract(&img, &quad, Size::new(10.0, 10.0)),
            Err(CropError::DegenerateQuad(DegenerateReason::SelfIntersecting))
        ));
    }

    #[test]
    fn test_empty_display_size() {
        let img = coded_image(10, 10);
        let quad = Quad::from_rect(&Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(
            extract(&img, &quad, Size::new(0.0, 10.0)),
            Err(CropError::InvalidDisplaySize)
        );
    }

    #[test]
    fn test_malformed_source() {
        let img = DecodedImage::new(10, 10, vec![0; 4]);
        let quad = Quad::from_rect(&Rect::new(0.0, 0.0, 5.0, 5.0));
        assert!(matches!(
            extract(&img, &quad, Size::new(10.0, 10.0)),
            Err(CropError::Decode(DecodeError::MalformedBuffer { .. }))
        ));
    }

    #[test]
    fn test_huge_quad_is_rejected() {
        let img = coded_image(10, 10);
        let quad = Quad::from_rect(&Rect::new(0.0, 0.0, 1e12, 1e12));
        let err = extract(&img, &quad, Size::new(10.0, 10.0)).unwrap_err();
        assert!(
            matches!(err, CropError::OutputTooLarge { limit: 400, .. }),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_overshoot_within_limit_is_extracted() {
        let img = coded_image(10, 10);
        // Twice the source on each side: exactly the limit
        let quad = Quad::from_rect(&Rect::new(-5.0, -5.0, 20.0, 20.0));
        let out = extract(&img, &quad, Size::new(10.0, 10.0)).unwrap();
        assert_eq!((out.width, out.height), (20, 20));

        let wider = Quad::from_rect(&Rect::new(-5.0, -5.0, 21.0, 20.0));
        assert!(matches!(
            extract(&img, &wider, Size::new(10.0, 10.0)),
            Err(CropError::OutputTooLarge { pixels: 420, limit: 400 })
        ));
    }

    #[test]
    fn test_lanczos_filter_same_size() {
        let img = coded_image(40, 40);
        let quad = Quad::from_rect(&Rect::new(5.0, 5.0, 20.0, 30.0));
        let out =
            extract_with_filter(&img, &quad, Size::new(40.0, 40.0), InterpolationFilter::Lanczos3)
                .unwrap();
        assert_eq!((out.width, out.height), (20, 30));
    }
}
