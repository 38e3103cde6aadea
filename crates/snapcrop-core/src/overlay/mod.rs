//! Interactive crop overlay.
//!
//! A [`CropOverlay`] owns four corner positions in display space and
//! mutates them only in response to gesture deltas or explicit re-seeding.
//! Gestures follow a small state machine:
//!
//! ```text
//! Idle --begin_resize(corner)--> DraggingCorner --end_gesture--> Idle
//! Idle --begin_move()----------> DraggingBody   --end_gesture--> Idle
//! ```
//!
//! Every successful mutation notifies the registered observer exactly
//! once. Rejected or no-op mutations are silent.

mod gesture;

use std::rc::Weak;

use thiserror::Error;

use crate::detect::DetectedQuad;
use crate::geometry::{to_display_space, Corner, DegenerateReason, Point, Quad, Rect, Size};
use crate::CroppingParameters;

pub use gesture::{CornerMode, GestureState, GestureToken};

use gesture::{clamp_axes, move_corner, resize_rect, sanitize_delta};

/// Default distance between the visible frame and the corner handles.
pub const DEFAULT_HANDLE_INSET: f64 = 50.0 / 3.0;

/// Margin between the display edges and a freshly seeded frame.
const DEFAULT_FRAME_MARGIN: f64 = 30.0;

/// Receives overlay changes. Held weakly by the overlay.
pub trait OverlayObserver {
    fn on_overlay_frame_changed(&self, frame: Rect, corners: Quad);
}

/// Why a snap request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapError {
    #[error("degenerate quad: {0}")]
    Degenerate(#[from] DegenerateReason),

    #[error("image or display size is empty")]
    InvalidSize,

    #[error("a gesture is in progress")]
    Busy,
}

/// Quadrilateral crop overlay with draggable corners.
pub struct CropOverlay {
    corners: Quad,
    mode: CornerMode,
    is_resizable: bool,
    is_movable: bool,
    minimum_size: Size,
    handle_inset: f64,
    state: GestureState,
    next_token: u64,
    observer: Option<Weak<dyn OverlayObserver>>,
}

impl std::fmt::Debug for CropOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropOverlay")
            .field("corners", &self.corners)
            .field("mode", &self.mode)
            .field("is_resizable", &self.is_resizable)
            .field("is_movable", &self.is_movable)
            .field("minimum_size", &self.minimum_size)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CropOverlay {
    pub fn new(frame: Rect, is_resizable: bool, is_movable: bool, minimum_size: Size) -> Self {
        Self {
            corners: Quad::from_rect(&frame),
            mode: CornerMode::Rectangle,
            is_resizable,
            is_movable,
            minimum_size,
            handle_inset: DEFAULT_HANDLE_INSET,
            state: GestureState::Idle,
            next_token: 1,
            observer: None,
        }
    }

    /// Overlay configured from host cropping parameters.
    pub fn from_params(frame: Rect, params: &CroppingParameters) -> Self {
        Self::new(
            frame,
            params.allow_resizing,
            params.allow_moving,
            params.minimum_size,
        )
    }

    pub fn with_handle_inset(mut self, inset: f64) -> Self {
        self.handle_inset = if inset.is_finite() { inset.max(0.0) } else { 0.0 };
        self
    }

    /// Frame centered in `display`, 30 points in from each edge and never
    /// smaller than `minimum_size`.
    pub fn default_frame(display: Size, minimum_size: Size) -> Rect {
        let width = (display.width - 2.0 * DEFAULT_FRAME_MARGIN).max(minimum_size.width);
        let height = (display.height - 2.0 * DEFAULT_FRAME_MARGIN).max(minimum_size.height);
        Rect::from_center(
            Point::new(display.width / 2.0, display.height / 2.0),
            Size::new(width, height),
        )
    }

    pub fn set_observer(&mut self, observer: Weak<dyn OverlayObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Bounding box of the corners.
    pub fn frame(&self) -> Rect {
        self.corners.bounding_box()
    }

    pub fn corners(&self) -> Quad {
        self.corners
    }

    pub fn mode(&self) -> CornerMode {
        self.mode
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_resizable(&self) -> bool {
        self.is_resizable
    }

    pub fn is_movable(&self) -> bool {
        self.is_movable
    }

    pub fn minimum_size(&self) -> Size {
        self.minimum_size
    }

    pub fn handle_inset(&self) -> f64 {
        self.handle_inset
    }

    /// Start dragging `corner`. `None` if resizing is disabled or another
    /// gesture is active.
    pub fn begin_resize(&mut self, corner: Corner) -> Option<GestureToken> {
        if !self.is_resizable || !self.state.is_idle() {
            return None;
        }
        let token = self.issue_token();
        self.state = GestureState::DraggingCorner { corner, token };
        Some(token)
    }

    /// Apply a drag delta to the active corner. Returns whether the
    /// corners changed.
    pub fn continue_resize(&mut self, token: GestureToken, dx: f64, dy: f64) -> bool {
        let corner = match self.state {
            GestureState::DraggingCorner { corner, token: active } if active == token => corner,
            _ => return false,
        };
        let (dx, dy) = sanitize_delta(dx, dy);
        let min = self.clamp_floor();

        let next = match self.mode {
            CornerMode::Rectangle => {
                let frame = self.frame();
                let proposed = resize_rect(&frame, corner, dx, dy);
                let (dx, dy) = clamp_axes((dx, dy), frame.size, proposed.size, min);
                Quad::from_rect(&resize_rect(&frame, corner, dx, dy))
            }
            CornerMode::FreeForm => {
                let current = self.corners.bounding_box().size;
                let proposed = move_corner(&self.corners, corner, dx, dy)
                    .bounding_box()
                    .size;
                let (dx, dy) = clamp_axes((dx, dy), current, proposed, min);
                let next = move_corner(&self.corners, corner, dx, dy);
                if let Err(reason) = next.validate() {
                    log::debug!("ignoring corner drag: {}", reason);
                    return false;
                }
                next
            }
        };
        self.replace_corners(next)
    }

    /// Start dragging the whole overlay. `None` if moving is disabled or
    /// another gesture is active.
    pub fn begin_move(&mut self) -> Option<GestureToken> {
        if !self.is_movable || !self.state.is_idle() {
            return None;
        }
        let token = self.issue_token();
        self.state = GestureState::DraggingBody { token };
        Some(token)
    }

    pub fn continue_move(&mut self, token: GestureToken, dx: f64, dy: f64) -> bool {
        match self.state {
            GestureState::DraggingBody { token: active } if active == token => {}
            _ => return false,
        }
        let (dx, dy) = sanitize_delta(dx, dy);
        let next = self.corners.translate(dx, dy);
        self.replace_corners(next)
    }

    /// Finish the active gesture. A stale token leaves the state alone.
    pub fn end_gesture(&mut self, token: GestureToken) -> bool {
        if self.state.token() == Some(token) {
            self.state = GestureState::Idle;
            true
        } else {
            false
        }
    }

    pub fn cancel_gesture(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Replace all four corners with a display-space quad.
    ///
    /// The quad is re-ordered by position first. On success the overlay
    /// switches to free-form corners.
    pub fn snap_to_quad(&mut self, quad: Quad) -> Result<(), SnapError> {
        if !self.state.is_idle() {
            log::warn!("snap rejected: gesture in progress");
            return Err(SnapError::Busy);
        }
        if !quad.is_finite() {
            log::warn!("snap rejected: {}", DegenerateReason::NonFinite);
            return Err(SnapError::Degenerate(DegenerateReason::NonFinite));
        }
        let ordered = Quad::from_unordered(quad.corners());
        if let Err(reason) = ordered.validate() {
            log::warn!("snap rejected: {}", reason);
            return Err(reason.into());
        }
        self.mode = CornerMode::FreeForm;
        self.replace_corners(ordered);
        Ok(())
    }

    /// Snap to a detector result given in image-pixel processing space.
    ///
    /// `image_size` is the pixel size the detector ran on and
    /// `display_size` the size the image is shown at.
    pub fn snap_to_detected_quad(
        &mut self,
        detected: &DetectedQuad,
        image_size: Size,
        display_size: Size,
    ) -> Result<(), SnapError> {
        if image_size.is_empty() || display_size.is_empty() {
            log::warn!("snap rejected: {}", SnapError::InvalidSize);
            return Err(SnapError::InvalidSize);
        }
        let sx = display_size.width / image_size.width;
        let sy = display_size.height / image_size.height;

        let mut points = [Point::ZERO; 4];
        for (slot, p) in points.iter_mut().zip(detected.corners.corners()) {
            let scaled = Point::new(p.x * sx, p.y * sy);
            *slot = to_display_space(scaled, display_size).ok_or(SnapError::InvalidSize)?;
        }
        let [a, b, c, d] = points;
        self.snap_to_quad(Quad::new(a, b, c, d))
    }

    /// Re-seed the overlay with an axis-aligned rectangle.
    ///
    /// Any active gesture is cancelled and the overlay returns to
    /// rectangle mode.
    pub fn reset_to_frame(&mut self, frame: Rect) -> bool {
        let next = Quad::from_rect(&frame);
        if !next.is_finite() {
            return false;
        }
        self.state = GestureState::Idle;
        self.mode = CornerMode::Rectangle;
        self.replace_corners(next)
    }

    fn issue_token(&mut self) -> GestureToken {
        let token = GestureToken::new(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        token
    }

    fn clamp_floor(&self) -> Size {
        Size::new(
            self.minimum_size.width + 2.0 * self.handle_inset,
            self.minimum_size.height + 2.0 * self.handle_inset,
        )
    }

    fn replace_corners(&mut self, next: Quad) -> bool {
        if next == self.corners {
            return false;
        }
        self.corners = next;
        self.notify();
        true
    }

    fn notify(&self) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.on_overlay_frame_changed(self.frame(), self.corners);
        }
    }
}
