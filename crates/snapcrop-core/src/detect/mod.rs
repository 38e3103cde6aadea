//! Rectangle detection.
//!
//! A detector proposes candidate quads in processing space (origin
//! bottom-left, y up) together with a confidence score. [`detect_quad`]
//! keeps the best candidate above the detector's floor and fixes its
//! corner roles by geometric position, since detectors make no promise
//! about the order in which they report corners.

mod contour;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::geometry::{Point, Quad};

pub use contour::{ContourRectangleDetector, DetectorConfig};

/// A rectangle found in an image, in processing-space pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedQuad {
    pub corners: Quad,
    /// Detector-specific score in 0..=1.
    pub confidence: f64,
}

impl DetectedQuad {
    /// Assign corner roles by position to points given in any order.
    ///
    /// Points are in processing space, so "top" means the larger y.
    pub fn from_points(points: [Point; 4], confidence: f64) -> Self {
        Self {
            corners: Quad::from_unordered(points).flip_vertical_roles(),
            confidence,
        }
    }
}

/// Source of candidate rectangles.
pub trait RectangleDetector {
    /// Every rectangle the detector can find, in no particular order.
    fn candidates(&self, image: &DecodedImage) -> Vec<DetectedQuad>;

    /// Candidates scoring below this are ignored.
    fn confidence_floor(&self) -> f64;
}

/// Run one detection pass and keep the most confident usable candidate.
///
/// Returns `None` when nothing clears the confidence floor; an empty
/// result is not an error.
pub fn detect_quad<D>(image: &DecodedImage, detector: &D) -> Option<DetectedQuad>
where
    D: RectangleDetector + ?Sized,
{
    if let Err(e) = image.validate() {
        log::warn!("skipping detection on unusable image: {}", e);
        return None;
    }

    let floor = detector.confidence_floor();
    let best = detector
        .candidates(image)
        .into_iter()
        .filter(|c| c.confidence.is_finite() && c.confidence >= floor)
        .map(|c| DetectedQuad::from_points(c.corners.corners(), c.confidence))
        .filter(|c| !c.corners.is_degenerate())
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence));

    match &best {
        Some(quad) => log::debug!("detected quad with confidence {:.3}", quad.confidence),
        None => log::debug!("no rectangle above confidence {:.2}", floor),
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDetector {
        found: Vec<DetectedQuad>,
        floor: f64,
    }

    impl RectangleDetector for FixedDetector {
        fn candidates(&self, _image: &DecodedImage) -> Vec<DetectedQuad> {
            self.found.clone()
        }

        fn confidence_floor(&self) -> f64 {
            self.floor
        }
    }

    fn candidate(x: f64, confidence: f64) -> DetectedQuad {
        // Deliberately scrambled corner order
        DetectedQuad {
            corners: Quad::new(
                Point::new(x + 10.0, 0.0),
                Point::new(x, 10.0),
                Point::new(x + 10.0, 10.0),
                Point::new(x, 0.0),
            ),
            confidence,
        }
    }

    fn image() -> DecodedImage {
        DecodedImage::new(4, 4, vec![0; 48])
    }

    #[test]
    fn test_from_points_uses_y_up_roles() {
        let q = DetectedQuad::from_points(
            [
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 0.0),
            ],
            1.0,
        );
        assert_eq!(q.corners.top_left, Point::new(0.0, 10.0));
        assert_eq!(q.corners.top_right, Point::new(10.0, 10.0));
        assert_eq!(q.corners.bottom_left, Point::new(0.0, 0.0));
        assert_eq!(q.corners.bottom_right, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_highest_confidence_wins() {
        let detector = FixedDetector {
            found: vec![candidate(0.0, 0.85), candidate(50.0, 0.95), candidate(100.0, 0.9)],
            floor: 0.8,
        };
        let best = detect_quad(&image(), &detector).unwrap();
        assert_eq!(best.confidence, 0.95);
        assert_eq!(best.corners.top_left, Point::new(50.0, 10.0));
    }

    #[test]
    fn test_below_floor_is_none() {
        let detector = FixedDetector {
            found: vec![candidate(0.0, 0.5)],
            floor: 0.8,
        };
        assert!(detect_quad(&image(), &detector).is_none());
    }

    #[test]
    fn test_degenerate_candidates_are_skipped() {
        let p = Point::new(1.0, 1.0);
        let detector = FixedDetector {
            found: vec![DetectedQuad {
                corners: Quad::new(p, p, p, p),
                confidence: 1.0,
            }],
            floor: 0.0,
        };
        assert!(detect_quad(&image(), &detector).is_none());
    }

    #[test]
    fn test_malformed_image_is_none() {
        let detector = FixedDetector {
            found: vec![candidate(0.0, 1.0)],
            floor: 0.0,
        };
        let bad = DecodedImage::new(4, 4, vec![]);
        assert!(detect_quad(&bad, &detector).is_none());
    }
}
