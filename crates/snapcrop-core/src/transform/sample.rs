//! Pixel samplers used by inverse-mapped resampling.
//!
//! Coordinates are in buffer pixel units with pixel centers at integer
//! positions. Samples falling outside the buffer are clamped to the
//! nearest edge pixel, so a quad that slightly overhangs the image edge
//! repeats the border instead of bleeding black into the result.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Interpolation filter for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation, used for interactive previews.
    #[default]
    Bilinear,
    /// Lanczos3 interpolation, used when quality matters more than speed.
    Lanczos3,
}

impl InterpolationFilter {
    pub(crate) fn sample(self, image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
        match self {
            InterpolationFilter::Bilinear => sample_bilinear(image, x, y),
            InterpolationFilter::Lanczos3 => sample_lanczos3(image, x, y),
        }
    }
}

#[inline]
fn clamp_index(v: i64, len: u32) -> usize {
    v.clamp(0, len as i64 - 1) as usize
}

#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Weighted average of the four nearest pixels.
pub(crate) fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let x = x.clamp(0.0, (image.width - 1) as f64);
    let y = y.clamp(0.0, (image.height - 1) as f64);

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let (cx0, cx1) = (clamp_index(x0, image.width), clamp_index(x0 + 1, image.width));
    let (cy0, cy1) = (clamp_index(y0, image.height), clamp_index(y0 + 1, image.height));

    let p00 = get_pixel_f64(image, cx0, cy0);
    let p10 = get_pixel_f64(image, cx1, cy0);
    let p01 = get_pixel_f64(image, cx0, cy1);
    let p11 = get_pixel_f64(image, cx1, cy1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Lanczos3 over a 6x6 neighborhood, edge pixels repeated.
pub(crate) fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let x = x.clamp(0.0, (image.width - 1) as f64);
    let y = y.clamp(0.0, (image.height - 1) as f64);
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = get_pixel_f64(image, clamp_index(px, image.width), clamp_index(py, image.height));
            sum[0] += pixel[0] * weight;
            sum[1] += pixel[1] * weight;
            sum[2] += pixel[2] * weight;
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return sample_bilinear(image, x, y);
    }

    let mut result = [0u8; 3];
    for i in 0..3 {
        result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
    }
    result
}

/// `sinc(x) * sinc(x / a)` for `|x| < a`, zero outside.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
