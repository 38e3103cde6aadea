//! Crop overlay binding.
//!
//! JavaScript drives the overlay with one pointer at a time, so the
//! binding keeps the active gesture token itself: `begin_resize` or
//! `begin_move`, any number of `drag` calls, then `end_gesture`.

use std::rc::Rc;

use crate::types::{corner_from_u8, from_js, from_js_or_default, js_error, to_js};
use snapcrop_core::detect::DetectedQuad;
use snapcrop_core::geometry::{Quad, Rect, Size};
use snapcrop_core::overlay::{
    CornerMode, CropOverlay, GestureState, GestureToken, OverlayObserver,
};
use snapcrop_core::CroppingParameters;
use wasm_bindgen::prelude::*;

/// Forwards overlay changes to a JS callback `(frame, corners) => void`.
struct JsObserver {
    callback: js_sys::Function,
}

impl OverlayObserver for JsObserver {
    fn on_overlay_frame_changed(&self, frame: Rect, corners: Quad) {
        let args = to_js(&frame).and_then(|f| to_js(&corners).map(|c| (f, c)));
        let outcome = args.and_then(|(f, c)| self.callback.call2(&JsValue::NULL, &f, &c));
        if let Err(e) = outcome {
            log::warn!("overlay observer failed: {:?}", e);
        }
    }
}

#[wasm_bindgen]
pub struct JsCropOverlay {
    overlay: CropOverlay,
    active: Option<GestureToken>,
    // Keeps the callback alive; the overlay only holds a weak reference.
    observer: Option<Rc<JsObserver>>,
}

#[wasm_bindgen]
impl JsCropOverlay {
    /// Overlay seeded with the given frame. `params` is an optional
    /// `CroppingParameters` object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        params: JsValue,
    ) -> Result<JsCropOverlay, JsValue> {
        let params: CroppingParameters = from_js_or_default(params)?;
        Ok(Self::from_core(CropOverlay::from_params(
            Rect::new(x, y, width, height),
            &params,
        )))
    }

    /// Overlay with the default frame centered in a display of the given size.
    pub fn centered(
        display_width: f64,
        display_height: f64,
        params: JsValue,
    ) -> Result<JsCropOverlay, JsValue> {
        let params: CroppingParameters = from_js_or_default(params)?;
        let frame = CropOverlay::default_frame(
            Size::new(display_width, display_height),
            params.minimum_size,
        );
        Ok(Self::from_core(CropOverlay::from_params(frame, &params)))
    }

    /// Register `callback(frame, corners)`, called after every change.
    ///
    /// The callback runs while this overlay is still borrowed by the call
    /// that changed it, so it must work from its arguments alone. Calling
    /// back into the overlay (`frame()`, `corners()`, `drag()`, ...) from
    /// inside it throws "recursive use of an object".
    pub fn set_observer(&mut self, callback: js_sys::Function) {
        let observer = Rc::new(JsObserver { callback });
        let shared: Rc<dyn OverlayObserver> = observer.clone();
        self.overlay.set_observer(Rc::downgrade(&shared));
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.overlay.clear_observer();
        self.observer = None;
    }

    /// Bounding frame as `{ origin, size }`.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        to_js(&self.overlay.frame())
    }

    /// Corners as `{ topLeft, topRight, bottomLeft, bottomRight }`.
    pub fn corners(&self) -> Result<JsValue, JsValue> {
        to_js(&self.overlay.corners())
    }

    /// True once the overlay snapped to a detected quad.
    #[wasm_bindgen(getter)]
    pub fn is_free_form(&self) -> bool {
        self.overlay.mode() == CornerMode::FreeForm
    }

    #[wasm_bindgen(getter)]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Start dragging corner 0..=3 (top-left, top-right, bottom-left,
    /// bottom-right). Returns false if the drag cannot start.
    pub fn begin_resize(&mut self, corner: u8) -> bool {
        let Some(corner) = corner_from_u8(corner) else {
            return false;
        };
        self.active = self.overlay.begin_resize(corner);
        self.active.is_some()
    }

    pub fn begin_move(&mut self) -> bool {
        self.active = self.overlay.begin_move();
        self.active.is_some()
    }

    /// Feed a pointer delta to the active gesture. Returns whether the
    /// overlay changed.
    pub fn drag(&mut self, dx: f64, dy: f64) -> bool {
        let Some(token) = self.active else {
            return false;
        };
        match self.overlay.state() {
            GestureState::DraggingCorner { .. } => self.overlay.continue_resize(token, dx, dy),
            GestureState::DraggingBody { .. } => self.overlay.continue_move(token, dx, dy),
            GestureState::Idle => {
                self.active = None;
                false
            }
        }
    }

    pub fn end_gesture(&mut self) {
        if let Some(token) = self.active.take() {
            self.overlay.end_gesture(token);
        }
    }

    pub fn cancel_gesture(&mut self) {
        self.active = None;
        self.overlay.cancel_gesture();
    }

    /// Snap to display-space corners given in any order.
    pub fn snap_to_corners(&mut self, corners: JsValue) -> Result<(), JsValue> {
        let quad: Quad = from_js(corners)?;
        self.overlay.snap_to_quad(quad).map_err(js_error)
    }

    /// Snap to a `detect_quad` result computed on an image of
    /// `image_width x image_height` pixels shown at the display size.
    pub fn snap_to_detected(
        &mut self,
        detected: JsValue,
        image_width: f64,
        image_height: f64,
        display_width: f64,
        display_height: f64,
    ) -> Result<(), JsValue> {
        let detected: DetectedQuad = from_js(detected)?;
        self.overlay
            .snap_to_detected_quad(
                &detected,
                Size::new(image_width, image_height),
                Size::new(display_width, display_height),
            )
            .map_err(js_error)
    }

    /// Re-seed with an axis-aligned frame; cancels any drag.
    pub fn reset_to_frame(&mut self, x: f64, y: f64, width: f64, height: f64) -> bool {
        self.active = None;
        self.overlay.reset_to_frame(Rect::new(x, y, width, height))
    }
}

impl JsCropOverlay {
    fn from_core(overlay: CropOverlay) -> Self {
        Self {
            overlay,
            active: None,
            observer: None,
        }
    }
}
