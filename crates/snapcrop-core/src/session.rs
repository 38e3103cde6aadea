//! Host-facing glue for a confirm/crop screen.
//!
//! A [`CropSession`] keeps the raw capture, its upright rendition and the
//! overlay the user drags over it. Confirming turns the overlay into a
//! finished, upright image:
//!
//! - rectangle mode maps the frame back onto the raw buffer, cuts it there
//!   and re-orients only the cut;
//! - free-form mode runs perspective extraction on the upright image.
//!
//! Extraction failures fall back to the unmodified upright image.

use crate::decode::{decode_oriented, DecodedImage};
use crate::detect::{detect_quad, DetectedQuad, RectangleDetector};
use crate::geometry::{Quad, Size};
use crate::orientation::{fix_orientation, raw_crop_rect, OrientedImage};
use crate::overlay::{CornerMode, CropOverlay};
use crate::transform::{apply_crop, extract, CropError};
use crate::CroppingParameters;

/// One crop screen worth of state.
#[derive(Debug)]
pub struct CropSession {
    params: CroppingParameters,
    source: OrientedImage,
    upright: DecodedImage,
    display_size: Size,
    overlay: Option<CropOverlay>,
}

impl CropSession {
    /// Start a session for `source` shown at `display_size`.
    ///
    /// The overlay is only created when cropping is enabled; it starts as
    /// the default centered frame.
    pub fn new(
        source: OrientedImage,
        display_size: Size,
        params: CroppingParameters,
    ) -> Result<Self, CropError> {
        if display_size.is_empty() {
            return Err(CropError::InvalidDisplaySize);
        }
        let upright = fix_orientation(source.clone())?.image;
        let overlay = params.is_enabled.then(|| {
            let frame = CropOverlay::default_frame(display_size, params.minimum_size);
            CropOverlay::from_params(frame, &params)
        });

        log::debug!(
            "crop session for {}x{} {:?} source at {}x{}",
            source.image.width,
            source.image.height,
            source.orientation,
            display_size.width,
            display_size.height
        );

        Ok(Self {
            params,
            source,
            upright,
            display_size,
            overlay,
        })
    }

    /// Decode `bytes` (with their orientation tag) and start a session.
    pub fn from_bytes(
        bytes: &[u8],
        display_size: Size,
        params: CroppingParameters,
    ) -> Result<Self, CropError> {
        let source = decode_oriented(bytes)?;
        Self::new(source, display_size, params)
    }

    pub fn params(&self) -> &CroppingParameters {
        &self.params
    }

    pub fn source(&self) -> &OrientedImage {
        &self.source
    }

    /// The source as it is displayed.
    pub fn upright(&self) -> &DecodedImage {
        &self.upright
    }

    pub fn display_size(&self) -> Size {
        self.display_size
    }

    pub fn overlay(&self) -> Option<&CropOverlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut CropOverlay> {
        self.overlay.as_mut()
    }

    /// Run `detector` on the upright image and snap the overlay to the
    /// result. Returns the detection whether or not the snap succeeded.
    pub fn detect_and_snap<D>(&mut self, detector: &D) -> Option<DetectedQuad>
    where
        D: RectangleDetector + ?Sized,
    {
        let detected = detect_quad(&self.upright, detector)?;
        self.apply_detection(&detected);
        Some(detected)
    }

    /// Snap the overlay to a detection made on the upright image, e.g. one
    /// delivered by a [`crate::worker::CropWorker`]. Returns whether the
    /// overlay changed.
    pub fn apply_detection(&mut self, detected: &DetectedQuad) -> bool {
        let image_size = Size::from_pixels(self.upright.width, self.upright.height);
        let display_size = self.display_size;
        match self.overlay.as_mut() {
            Some(overlay) => overlay
                .snap_to_detected_quad(detected, image_size, display_size)
                .is_ok(),
            None => false,
        }
    }

    /// Produce the finished image for the current overlay.
    pub fn confirm(&self) -> DecodedImage {
        let Some(overlay) = self.overlay.as_ref() else {
            return self.upright.clone();
        };
        match overlay.mode() {
            CornerMode::Rectangle => self.crop_frame(overlay),
            CornerMode::FreeForm => self.extract_or_fallback(&overlay.corners()),
        }
    }

    fn crop_frame(&self, overlay: &CropOverlay) -> DecodedImage {
        let Some(normalized) = overlay.frame().normalized_in(self.display_size) else {
            return self.upright.clone();
        };
        let orientation = self.source.orientation;
        let raw_rect = raw_crop_rect(&normalized, orientation);
        let cut = apply_crop(&self.source.image, &raw_rect);

        match fix_orientation(OrientedImage::new(cut, orientation)) {
            Ok(oriented) => oriented.image,
            Err(e) => {
                log::warn!("crop re-orientation failed, using full image: {}", e);
                self.upright.clone()
            }
        }
    }

    fn extract_or_fallback(&self, corners: &Quad) -> DecodedImage {
        match extract(&self.upright, corners, self.display_size) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("perspective extraction failed, using full image: {}", e);
                self.upright.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ContourRectangleDetector;
    use crate::geometry::{Point, Rect};
    use crate::orientation::Orientation;
    use image::{ImageEncoder, Rgb, RgbImage};

    fn enabled() -> CroppingParameters {
        CroppingParameters {
            is_enabled: true,
            minimum_size: Size::new(1.0, 1.0),
            ..CroppingParameters::default()
        }
    }

    fn numbered(width: u32, height: u32) -> DecodedImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 20) as u8, (y * 20) as u8, (x + y * width) as u8])
        });
        DecodedImage::from_rgb_image(img)
    }

    #[test]
    fn test_disabled_session_returns_upright() {
        let source = OrientedImage::new(numbered(6, 4), Orientation::Right);
        let session =
            CropSession::new(source, Size::new(4.0, 6.0), CroppingParameters::default()).unwrap();
        assert!(session.overlay().is_none());

        let out = session.confirm();
        assert_eq!((out.width, out.height), (4, 6));
        assert_eq!(&out, session.upright());
    }

    #[test]
    fn test_invalid_display_size() {
        let source = OrientedImage::new(numbered(4, 4), Orientation::Up);
        let result = CropSession::new(source, Size::new(0.0, 4.0), enabled());
        assert!(matches!(result, Err(CropError::InvalidDisplaySize)));
    }

    #[test]
    fn test_malformed_source_is_rejected() {
        let source = OrientedImage::new(DecodedImage::new(4, 4, vec![0; 3]), Orientation::Up);
        let result = CropSession::new(source, Size::new(4.0, 4.0), enabled());
        assert!(matches!(result, Err(CropError::Decode(_))));
    }

    #[test]
    fn test_default_overlay_frame() {
        let source = OrientedImage::new(numbered(8, 8), Orientation::Up);
        let params = CroppingParameters {
            is_enabled: true,
            ..CroppingParameters::default()
        };
        let session = CropSession::new(source, Size::new(240.0, 200.0), params).unwrap();
        let overlay = session.overlay().unwrap();
        assert_eq!(overlay.frame(), Rect::new(30.0, 30.0, 180.0, 140.0));
        assert!(overlay.is_movable());
    }

    #[test]
    fn test_rectangle_confirm_matches_upright_crop() {
        for orientation in Orientation::ALL {
            let source = OrientedImage::new(numbered(6, 4), orientation);
            let (w, h) = source.upright_dimensions();
            let display = Size::from_pixels(w, h);
            let mut session = CropSession::new(source, display, enabled()).unwrap();

            let frame = Rect::new(1.0, 1.0, 2.0, 2.0);
            assert!(session.overlay_mut().unwrap().reset_to_frame(frame));

            let expected = apply_crop(
                session.upright(),
                &frame.normalized_in(display).unwrap(),
            );
            assert_eq!(session.confirm(), expected, "{:?}", orientation);
        }
    }

    #[test]
    fn test_free_form_confirm_extracts() {
        let source = OrientedImage::new(numbered(10, 10), Orientation::Up);
        let mut session = CropSession::new(source, Size::new(20.0, 20.0), enabled()).unwrap();
        let overlay = session.overlay_mut().unwrap();
        overlay
            .snap_to_quad(Quad::from_rect(&Rect::new(4.0, 4.0, 12.0, 8.0)))
            .unwrap();

        let out = session.confirm();
        assert_eq!((out.width, out.height), (6, 4));
    }

    #[test]
    fn test_extraction_failure_falls_back_to_upright() {
        let source = OrientedImage::new(numbered(5, 5), Orientation::Down);
        let session = CropSession::new(source, Size::new(5.0, 5.0), enabled()).unwrap();
        let p = Point::new(2.0, 2.0);
        let out = session.extract_or_fallback(&Quad::new(p, p, p, p));
        assert_eq!(&out, session.upright());
    }

    #[test]
    fn test_oversized_free_form_confirm_falls_back() {
        let source = OrientedImage::new(numbered(10, 10), Orientation::Up);
        let mut session = CropSession::new(source, Size::new(10.0, 10.0), enabled()).unwrap();
        let overlay = session.overlay_mut().unwrap();
        overlay
            .snap_to_quad(Quad::from_rect(&Rect::new(0.0, 0.0, 1e12, 1e12)))
            .unwrap();
        assert_eq!(overlay.mode(), CornerMode::FreeForm);

        assert_eq!(&session.confirm(), session.upright());
    }

    #[test]
    fn test_detect_and_snap_moves_overlay() {
        let img = RgbImage::from_fn(120, 100, |x, y| {
            if (20..100).contains(&x) && (15..85).contains(&y) {
                Rgb([230, 230, 225])
            } else {
                Rgb([30, 35, 40])
            }
        });
        let source = OrientedImage::new(DecodedImage::from_rgb_image(img), Orientation::Up);
        let mut session = CropSession::new(source, Size::new(240.0, 200.0), enabled()).unwrap();

        let detected = session
            .detect_and_snap(&ContourRectangleDetector::default())
            .expect("card should be detected");
        assert!(detected.confidence >= 0.8);

        let overlay = session.overlay().unwrap();
        assert_eq!(overlay.mode(), CornerMode::FreeForm);
        let frame = overlay.frame();
        assert!((frame.min_x() - 40.0).abs() <= 5.0, "{:?}", frame);
        assert!((frame.min_y() - 30.0).abs() <= 5.0, "{:?}", frame);
        assert!((frame.max_x() - 198.0).abs() <= 5.0, "{:?}", frame);
        assert!((frame.max_y() - 168.0).abs() <= 5.0, "{:?}", frame);
    }

    #[test]
    fn test_apply_detection_without_overlay() {
        let source = OrientedImage::new(numbered(4, 4), Orientation::Up);
        let mut session =
            CropSession::new(source, Size::new(4.0, 4.0), CroppingParameters::default()).unwrap();
        let detected = DetectedQuad::from_points(
            [
                Point::new(0.0, 0.0),
                Point::new(3.0, 0.0),
                Point::new(0.0, 3.0),
                Point::new(3.0, 3.0),
            ],
            1.0,
        );
        assert!(!session.apply_detection(&detected));
    }

    #[test]
    fn test_from_bytes_decodes_source() {
        let img = RgbImage::from_pixel(6, 3, Rgb([10, 20, 30]));
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(img.as_raw(), 6, 3, image::ExtendedColorType::Rgb8)
            .unwrap();

        let session = CropSession::from_bytes(&png, Size::new(60.0, 30.0), enabled()).unwrap();
        assert_eq!(session.source().orientation, Orientation::Up);
        assert_eq!((session.upright().width, session.upright().height), (6, 3));

        assert!(matches!(
            CropSession::from_bytes(b"not an image", Size::new(1.0, 1.0), enabled()),
            Err(CropError::Decode(_))
        ));
    }
}
