//! Pixel-producing crop operations.
//!
//! Two paths produce the final image on confirmation:
//!
//! - **Axis-aligned crop**: a normalized rect cut from a buffer. Used when
//!   the overlay is still a plain rectangle, applied to the raw buffer
//!   before re-orientation.
//! - **Perspective extraction**: four arbitrary corners mapped onto an
//!   upright rectangle through a homography. Used once the overlay has
//!   been snapped to a detected quad.
//!
//! # Coordinate System
//!
//! - Crop rects are normalized (0.0 to 1.0), origin top-left
//! - Extraction corners are in display space, scaled to the source by the
//!   ratio between the source and the displayed size

mod crop;
mod perspective;
mod sample;

pub use crop::apply_crop;
pub use perspective::{extract, extract_with_filter, CropError, MAX_OUTPUT_SCALE};
pub use sample::InterpolationFilter;
