//! Geometry primitives shared by the overlay, the orientation normalizer
//! and the perspective extractor.
//!
//! # Coordinate Spaces
//!
//! Two coordinate spaces are used throughout the crate:
//!
//! - **Display space**: origin top-left, y grows downward. Overlay corners,
//!   gesture deltas and decoded pixel rows live here.
//! - **Processing space**: origin bottom-left, y grows upward. Detector
//!   output and the perspective solve live here.
//!
//! Converting between them is a reflection about the container height
//! (`y' = height - y`). Points carry no space tag at runtime, so every
//! crossing must go through [`to_processing_space`] or [`to_display_space`].

mod point;
mod quad;
mod transform;

pub use point::{distance, to_display_space, to_processing_space, translate, Point, Rect, Size};
pub use quad::{Corner, DegenerateReason, Quad};
pub use transform::{apply_affine, apply_projective, AffineTransform, ProjectiveTransform};
