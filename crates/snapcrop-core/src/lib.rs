//! Snapcrop Core - crop overlay and photo geometry library
//!
//! This crate provides the reusable core of a camera/photo-picker crop
//! screen: the interactive crop-overlay geometry, EXIF-orientation
//! normalization, rectangle detection and perspective-corrected
//! extraction, plus decode/encode helpers around them.

pub mod decode;
pub mod detect;
pub mod encode;
pub mod geometry;
pub mod orientation;
pub mod overlay;
pub mod session;
pub mod transform;
pub mod worker;

pub use detect::{detect_quad, DetectedQuad, RectangleDetector};
pub use geometry::{Point, Quad, Rect, Size};
pub use orientation::{Orientation, OrientedImage};
pub use overlay::{CropOverlay, OverlayObserver};
pub use session::CropSession;
pub use transform::{apply_crop, extract, CropError, InterpolationFilter};

/// Host configuration for the crop screen
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CroppingParameters {
    /// Show the crop screen after capture
    pub is_enabled: bool,
    /// Let the user drag corner handles
    pub allow_resizing: bool,
    /// Let the user drag the whole overlay
    pub allow_moving: bool,
    /// Smallest crop, in display points
    pub minimum_size: Size,
}

impl Default for CroppingParameters {
    fn default() -> Self {
        Self {
            is_enabled: false,
            allow_resizing: true,
            allow_moving: true,
            minimum_size: Size::new(60.0, 60.0),
        }
    }
}

impl CroppingParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
