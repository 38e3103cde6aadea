//! Encoding of the confirmed crop for hand-off to persistence.
//!
//! # Examples
//!
//! ```ignore
//! use snapcrop_core::encode::{encode_jpeg, DEFAULT_QUALITY};
//!
//! let bytes = encode_jpeg(&cropped, DEFAULT_QUALITY).unwrap();
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, DEFAULT_QUALITY};
