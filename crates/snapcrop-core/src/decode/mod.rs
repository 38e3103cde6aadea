//! Source image decoding.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG bytes into an RGB buffer
//! - Reading the EXIF orientation tag alongside the pixels
//! - Downscaling previews for the crop screen
//!
//! # Examples
//!
//! ```ignore
//! use snapcrop_core::decode::decode_oriented;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let source = decode_oriented(&bytes).unwrap();
//! println!("{:?} {}x{}", source.orientation, source.image.width, source.image.height);
//! ```

mod resize;
mod source;
mod types;

pub use resize::{preview_for_display, resize, resize_to_fit};
pub use source::{decode_oriented, decode_upright, read_orientation};
pub use types::{DecodeError, DecodedImage, FilterType};
