//! EXIF orientation handling.
//!
//! Every orientation is described by one row of a lookup table: how the
//! upright picture's axes map onto the raw buffer's axes. Crop rect
//! remapping, pixel re-orientation and mirror relabeling are all derived
//! from that table.
//!
//! # Table semantics
//!
//! For an [`AxisMap`] `m` and an upright normalized point `(u, v)`:
//!
//! 1. if `m.swap_axes`, `(u, v) = (v, u)`
//! 2. if `m.flip_x`, `u = 1 - u`
//! 3. if `m.flip_y`, `v = 1 - v`
//!
//! and `(u, v)` is then the matching normalized point in the raw buffer.

mod normalize;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

pub use normalize::{fix_mirrored_orientation, fix_orientation, normalize_crop_rect, raw_crop_rect};

/// The eight EXIF orientation states.
///
/// Names describe where the top of the upright picture ended up in the
/// stored buffer, mirrored variants additionally flipped horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    Left,
    LeftMirrored,
    Right,
    RightMirrored,
}

/// Axis relationship between an upright picture and its raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    pub swap_axes: bool,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl AxisMap {
    const fn new(swap_axes: bool, flip_x: bool, flip_y: bool) -> Self {
        Self {
            swap_axes,
            flip_x,
            flip_y,
        }
    }
}

/// Rotation component and mirror flag, indexed by `Orientation as usize`.
///
/// Mirrored variants share the rotation of their base orientation.
const ROTATION_TABLE: [(AxisMap, bool); 8] = [
    (AxisMap::new(false, false, false), false), // Up
    (AxisMap::new(false, false, false), true),  // UpMirrored
    (AxisMap::new(false, true, true), false),   // Down
    (AxisMap::new(false, true, true), true),    // DownMirrored
    (AxisMap::new(true, true, false), false),   // Left
    (AxisMap::new(true, true, false), true),    // LeftMirrored
    (AxisMap::new(true, false, true), false),   // Right
    (AxisMap::new(true, false, true), true),    // RightMirrored
];

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Up,
        Orientation::UpMirrored,
        Orientation::Down,
        Orientation::DownMirrored,
        Orientation::Left,
        Orientation::LeftMirrored,
        Orientation::Right,
        Orientation::RightMirrored,
    ];

    fn row(self) -> (AxisMap, bool) {
        ROTATION_TABLE[self as usize]
    }

    /// Rotation part of this orientation.
    pub fn rotation_map(self) -> AxisMap {
        self.row().0
    }

    pub fn is_mirrored(self) -> bool {
        self.row().1
    }

    /// Full pixel mapping including the horizontal mirror.
    pub fn pixel_map(self) -> AxisMap {
        let (mut map, mirrored) = self.row();
        map.flip_x ^= mirrored;
        map
    }

    /// Orientation whose pixel map equals `map`, if any.
    pub fn from_pixel_map(map: AxisMap) -> Option<Orientation> {
        Self::ALL.into_iter().find(|o| o.pixel_map() == map)
    }

    /// Same buffer reinterpreted as horizontally mirrored.
    ///
    /// `Up <-> UpMirrored`, `Down <-> DownMirrored`,
    /// `Left <-> RightMirrored`, `Right <-> LeftMirrored`.
    pub fn mirrored(self) -> Orientation {
        let map = self.pixel_map();
        // Mirroring the upright picture flips the raw axis that upright x
        // lands on: raw x without a swap, raw y with one.
        let relabeled = AxisMap::new(
            map.swap_axes,
            map.flip_x ^ !map.swap_axes,
            map.flip_y ^ map.swap_axes,
        );
        Self::from_pixel_map(relabeled).unwrap_or(self)
    }

    /// Whether the upright picture has width and height swapped.
    pub fn swaps_dimensions(self) -> bool {
        self.rotation_map().swap_axes
    }

    /// EXIF orientation tag value (1..=8).
    pub fn to_exif(self) -> u32 {
        match self {
            Orientation::Up => 1,
            Orientation::UpMirrored => 2,
            Orientation::Down => 3,
            Orientation::DownMirrored => 4,
            Orientation::LeftMirrored => 5,
            Orientation::Right => 6,
            Orientation::RightMirrored => 7,
            Orientation::Left => 8,
        }
    }
}

impl From<u32> for Orientation {
    /// Unknown tag values fall back to `Up`.
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Up,
            2 => Orientation::UpMirrored,
            3 => Orientation::Down,
            4 => Orientation::DownMirrored,
            5 => Orientation::LeftMirrored,
            6 => Orientation::Right,
            7 => Orientation::RightMirrored,
            8 => Orientation::Left,
            _ => Orientation::Up,
        }
    }
}

/// Raw pixel buffer plus the orientation it was stored with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientedImage {
    pub image: DecodedImage,
    pub orientation: Orientation,
}

impl OrientedImage {
    pub fn new(image: DecodedImage, orientation: Orientation) -> Self {
        Self { image, orientation }
    }

    /// Dimensions of the picture as it should be displayed.
    pub fn upright_dimensions(&self) -> (u32, u32) {
        if self.orientation.swaps_dimensions() {
            (self.image.height, self.image.width)
        } else {
            (self.image.width, self.image.height)
        }
    }
}
