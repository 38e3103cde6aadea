//! Contour-based document/photo boundary detection.
//!
//! Pipeline: luma -> gaussian blur -> Otsu binarization -> outer contours
//! -> Douglas-Peucker polygon approximation. A contour qualifies when it
//! approximates to exactly four points and covers enough of the image.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use serde::{Deserialize, Serialize};

use super::{DetectedQuad, RectangleDetector};
use crate::decode::DecodedImage;
use crate::geometry::Point;

/// Tuning for [`ContourRectangleDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorConfig {
    /// Gaussian sigma applied before thresholding; 0 disables blurring.
    pub blur_sigma: f32,
    /// Smallest accepted quad area as a share of the image area.
    pub min_area_ratio: f64,
    /// Douglas-Peucker tolerance as a share of the contour perimeter.
    pub poly_epsilon: f64,
    /// Candidates below this confidence are discarded.
    pub min_confidence: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            min_area_ratio: 0.10,
            poly_epsilon: 0.02,
            min_confidence: 0.8,
        }
    }
}

/// Finds bright (or dark) quadrilateral regions separated from their
/// background by a global threshold.
#[derive(Debug, Clone, Default)]
pub struct ContourRectangleDetector {
    config: DetectorConfig,
}

impl ContourRectangleDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn binarize(&self, image: &DecodedImage) -> Option<GrayImage> {
        let rgb = image.to_rgb_image()?;
        let mut gray = image::imageops::grayscale(&rgb);
        if self.config.blur_sigma > 0.0 {
            gray = gaussian_blur_f32(&gray, self.config.blur_sigma);
        }
        let level = otsu_level(&gray);
        let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] > level {
                Luma([255])
            } else {
                Luma([0])
            }
        });

        // A single-valued result has no boundary to trace.
        let foreground = binary.pixels().filter(|p| p[0] > 0).count();
        let total = (binary.width() * binary.height()) as usize;
        (foreground > 0 && foreground < total).then_some(binary)
    }
}

impl RectangleDetector for ContourRectangleDetector {
    fn candidates(&self, image: &DecodedImage) -> Vec<DetectedQuad> {
        let Some(binary) = self.binarize(image) else {
            return Vec::new();
        };
        let image_area = image.width as f64 * image.height as f64;
        let min_area = image_area * self.config.min_area_ratio;
        let height = image.height as f64;

        find_contours::<i32>(&binary)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.points.len() >= 4)
            .filter_map(|contour| {
                let epsilon = arc_length(&contour.points, true) * self.config.poly_epsilon;
                if !(epsilon > 0.0) {
                    return None;
                }
                let approx = approximate_polygon_dp(&contour.points, epsilon, true);
                if approx.len() != 4 {
                    return None;
                }

                let quad_area = polygon_area(&approx);
                if quad_area < min_area {
                    return None;
                }
                let contour_area = polygon_area(&contour.points);
                let confidence = quad_area.min(contour_area) / quad_area.max(contour_area);

                // Pixel rows run downward; flip into processing space.
                let to_processing =
                    |p: &PixelPoint<i32>| Point::new(p.x as f64, height - p.y as f64);
                let points = [
                    to_processing(&approx[0]),
                    to_processing(&approx[1]),
                    to_processing(&approx[2]),
                    to_processing(&approx[3]),
                ];
                Some(DetectedQuad::from_points(points, confidence))
            })
            .collect()
    }

    fn confidence_floor(&self) -> f64 {
        self.config.min_confidence
    }
}

/// Unsigned shoelace area of a closed pixel polygon.
fn polygon_area(points: &[PixelPoint<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
        })
        .sum();
    twice.abs() / 2.0
}
