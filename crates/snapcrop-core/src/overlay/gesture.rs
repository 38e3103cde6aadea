//! Gesture bookkeeping and the per-axis minimum-size clamp.

use crate::geometry::{Corner, Point, Quad, Rect, Size};

/// Proof that the holder started the active gesture.
///
/// Issued by `begin_*` and checked by every `continue_*` and
/// `end_gesture` call. Tokens are never reused within one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureToken(u64);

impl GestureToken {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Interaction state of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    DraggingCorner { corner: Corner, token: GestureToken },
    DraggingBody { token: GestureToken },
}

impl GestureState {
    pub fn is_idle(self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub(crate) fn token(self) -> Option<GestureToken> {
        match self {
            GestureState::Idle => None,
            GestureState::DraggingCorner { token, .. } | GestureState::DraggingBody { token } => {
                Some(token)
            }
        }
    }
}

/// How a corner drag reshapes the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerMode {
    /// Corners stay an axis-aligned rectangle; a drag moves two edges.
    #[default]
    Rectangle,
    /// Corners move independently, as after snapping to a detected quad.
    FreeForm,
}

/// Gesture delta with malformed samples replaced by zero.
pub(crate) fn sanitize_delta(dx: f64, dy: f64) -> (f64, f64) {
    if dx.is_finite() && dy.is_finite() {
        (dx, dy)
    } else {
        (0.0, 0.0)
    }
}

/// Zero out each delta component whose axis would shrink below `min`.
///
/// `current` and `proposed` are the bounding dimensions before and after
/// applying the full delta. Growth is always allowed, even while below
/// the minimum, so an undersized overlay can recover.
pub(crate) fn clamp_axes(
    (dx, dy): (f64, f64),
    current: Size,
    proposed: Size,
    min: Size,
) -> (f64, f64) {
    let shrinks_below = |now: f64, next: f64, floor: f64| next < floor && next < now;
    let dx = if shrinks_below(current.width, proposed.width, min.width) {
        0.0
    } else {
        dx
    };
    let dy = if shrinks_below(current.height, proposed.height, min.height) {
        0.0
    } else {
        dy
    };
    (dx, dy)
}

/// Rectangle after dragging `corner` by `(dx, dy)`.
///
/// The two edges adjacent to `corner` move; the opposite corner stays put.
pub(crate) fn resize_rect(frame: &Rect, corner: Corner, dx: f64, dy: f64) -> Rect {
    let (x, w) = if corner.on_left_edge() {
        (frame.origin.x + dx, frame.width() - dx)
    } else {
        (frame.origin.x, frame.width() + dx)
    };
    let (y, h) = if corner.on_top_edge() {
        (frame.origin.y + dy, frame.height() - dy)
    } else {
        (frame.origin.y, frame.height() + dy)
    };
    Rect::new(x, y, w, h)
}

/// Quad after moving only `corner` by `(dx, dy)`.
pub(crate) fn move_corner(quad: &Quad, corner: Corner, dx: f64, dy: f64) -> Quad {
    let mut out = *quad;
    let p = quad.corner(corner);
    out.set_corner(corner, Point::new(p.x + dx, p.y + dy));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_rect_keeps_opposite_corner() {
        let frame = Rect::new(10.0, 10.0, 100.0, 80.0);
        for corner in Corner::ALL {
            let resized = resize_rect(&frame, corner, 7.0, -5.0);
            let anchor = corner.opposite();
            assert_eq!(
                Quad::from_rect(&resized).corner(anchor),
                Quad::from_rect(&frame).corner(anchor),
                "{:?}",
                corner
            );
            assert_eq!(
                Quad::from_rect(&resized).corner(corner),
                Quad::from_rect(&frame).corner(corner).translate(7.0, -5.0)
            );
        }
    }

    #[test]
    fn test_clamp_axes_is_independent() {
        let min = Size::new(60.0, 60.0);
        let current = Size::new(100.0, 100.0);
        // x would shrink to 30, y grows to 120
        let out = clamp_axes((70.0, -20.0), current, Size::new(30.0, 120.0), min);
        assert_eq!(out, (0.0, -20.0));
    }

    #[test]
    fn test_clamp_axes_allows_growth_below_minimum() {
        let min = Size::new(60.0, 60.0);
        let current = Size::new(20.0, 20.0);
        let out = clamp_axes((-5.0, -5.0), current, Size::new(25.0, 25.0), min);
        assert_eq!(out, (-5.0, -5.0));
    }

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(1.0, 2.0), (1.0, 2.0));
        assert_eq!(sanitize_delta(f64::NAN, 2.0), (0.0, 0.0));
        assert_eq!(sanitize_delta(1.0, f64::NEG_INFINITY), (0.0, 0.0));
    }

    #[test]
    fn test_state_token() {
        let token = GestureToken::new(3);
        assert_eq!(GestureState::Idle.token(), None);
        assert_eq!(GestureState::DraggingBody { token }.token(), Some(token));
        assert!(!GestureState::DraggingBody { token }.is_idle());
    }
}
