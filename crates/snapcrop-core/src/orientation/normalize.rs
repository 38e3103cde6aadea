//! Crop rect remapping and pixel re-orientation.

use image::{Rgb, RgbImage};

use super::{AxisMap, Orientation, OrientedImage};
use crate::decode::{DecodeError, DecodedImage};
use crate::geometry::Rect;

/// Push a normalized rect through an axis map.
fn remap_rect(rect: &Rect, map: AxisMap) -> Rect {
    let (mut x, mut y, mut w, mut h) = (rect.origin.x, rect.origin.y, rect.width(), rect.height());
    if map.swap_axes {
        (x, y, w, h) = (y, x, h, w);
    }
    if map.flip_x {
        x = 1.0 - x - w;
    }
    if map.flip_y {
        y = 1.0 - y - h;
    }
    Rect::new(x, y, w, h)
}

/// Map a normalized upright crop rect onto the raw buffer, rotation only.
///
/// Mirrored orientations are treated like their base rotation:
/// `Up`/`UpMirrored` pass through, `Down`/`DownMirrored` reflect both
/// axes, `Left`/`LeftMirrored` give `(1-y-h, x, h, w)` and
/// `Right`/`RightMirrored` give `(y, 1-x-w, h, w)`.
///
/// Use [`raw_crop_rect`] when the horizontal mirror must be honored too.
pub fn normalize_crop_rect(rect: &Rect, orientation: Orientation) -> Rect {
    remap_rect(rect, orientation.rotation_map())
}

/// Map a normalized upright crop rect onto the raw buffer, mirror included.
///
/// Cropping the raw buffer with this rect and then calling
/// [`fix_orientation`] yields the same pixels as cropping the upright
/// image with `rect`.
pub fn raw_crop_rect(rect: &Rect, orientation: Orientation) -> Rect {
    remap_rect(rect, orientation.pixel_map())
}

/// Resample so the stored orientation becomes [`Orientation::Up`].
///
/// An image that is already `Up` is moved through untouched.
pub fn fix_orientation(image: OrientedImage) -> Result<OrientedImage, DecodeError> {
    image.image.validate()?;
    if image.orientation == Orientation::Up {
        return Ok(image);
    }

    let map = image.orientation.pixel_map();
    let raw = &image.image;
    let (out_w, out_h) = if map.swap_axes {
        (raw.height, raw.width)
    } else {
        (raw.width, raw.height)
    };
    log::debug!(
        "re-orienting {}x{} buffer from {:?}",
        raw.width,
        raw.height,
        image.orientation
    );

    let upright = RgbImage::from_fn(out_w, out_h, |x, y| {
        let (mut a, mut b) = if map.swap_axes { (y, x) } else { (x, y) };
        if map.flip_x {
            a = raw.width - 1 - a;
        }
        if map.flip_y {
            b = raw.height - 1 - b;
        }
        Rgb(raw.rgb_at(a, b))
    });

    Ok(OrientedImage::new(
        DecodedImage::from_rgb_image(upright),
        Orientation::Up,
    ))
}

/// Relabel a front-camera capture as mirrored. Pixels are untouched.
pub fn fix_mirrored_orientation(image: OrientedImage) -> Result<OrientedImage, DecodeError> {
    image.image.validate()?;
    let orientation = image.orientation.mirrored();
    Ok(OrientedImage::new(image.image, orientation))
}
