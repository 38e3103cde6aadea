//! Snapcrop WASM - WebAssembly bindings for snapcrop
//!
//! This crate exposes the snapcrop-core crop screen building blocks to
//! JavaScript/TypeScript hosts.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Decoding with EXIF orientation, preview downscaling
//! - `overlay` - The interactive crop overlay
//! - `detect` - Rectangle detection
//! - `transform` - Perspective extraction and orientation normalization
//! - `encode` - JPEG encoding of the finished crop
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_oriented, JsCropOverlay, extract_perspective } from '@snapcrop/wasm';
//!
//! await init();
//!
//! const source = decode_oriented(new Uint8Array(await file.arrayBuffer()));
//! const upright = source.upright();
//! const overlay = JsCropOverlay.centered(viewWidth, viewHeight, { isEnabled: true });
//! overlay.set_observer((frame, corners) => redraw(frame, corners));
//! // ... drag handlers call overlay.begin_resize / drag / end_gesture ...
//! const cropped = extract_perspective(upright, overlay.corners(), viewWidth, viewHeight);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod detect;
mod encode;
mod overlay;
mod transform;
mod types;

// Re-export public types
pub use decode::{decode_oriented, preview_for_display, JsOrientedImage};
pub use detect::detect_quad;
pub use encode::encode_jpeg;
pub use overlay::JsCropOverlay;
pub use transform::{apply_crop, extract_perspective, fix_orientation, normalize_crop_rect};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
