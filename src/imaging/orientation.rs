//! EXIF orientation and autorotation.
//!
//! Cameras store pixels in sensor order and record how to display them in the
//! EXIF orientation tag. Autorotation reads that tag once at load time and
//! applies the quarter turns and mirror that bring the pixels upright.
//!
//! ```text
//!     1: Normal      2: FlipH       3: Rotate180   4: FlipV
//!     5: Transpose   6: Rotate90    7: Transverse  8: Rotate270
//! ```
//!
//! | EXIF | Correction |
//! |------|------------|
//! | 1 | none |
//! | 2 | flop |
//! | 3 | turn 2 |
//! | 4 | flip |
//! | 5 | turn 1, then flop |
//! | 6 | turn 1 |
//! | 7 | turn 3, then flop |
//! | 8 | turn 3 |

use super::backend::PixelEngine;
use super::image::Image;
use std::path::Path;
use tracing::{debug, trace};

/// Stored pixel orientation, one of the eight EXIF values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

/// Mirror axis applied after the quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    /// Left ↔ right ([`Image::flop`]).
    Horizontal,
    /// Top ↔ bottom ([`Image::flip`]).
    Vertical,
}

/// Primitive operations that undo an [`Orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    /// Clockwise quarter turns, `0..4`.
    pub turns: u8,
    pub mirror: Option<Mirror>,
}

impl Correction {
    pub fn is_identity(&self) -> bool {
        self.turns == 0 && self.mirror.is_none()
    }
}

impl Orientation {
    /// Map an EXIF orientation value. Values outside `1..=8` yield `None`.
    pub fn from_exif(code: u16) -> Option<Self> {
        Some(match code {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => return None,
        })
    }

    pub fn to_exif(self) -> u16 {
        match self {
            Orientation::Normal => 1,
            Orientation::FlipHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::FlipVertical => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    pub fn correction(self) -> Correction {
        let (turns, mirror) = match self {
            Orientation::Normal => (0, None),
            Orientation::FlipHorizontal => (0, Some(Mirror::Horizontal)),
            Orientation::Rotate180 => (2, None),
            Orientation::FlipVertical => (0, Some(Mirror::Vertical)),
            Orientation::Transpose => (1, Some(Mirror::Horizontal)),
            Orientation::Rotate90 => (1, None),
            Orientation::Transverse => (3, Some(Mirror::Horizontal)),
            Orientation::Rotate270 => (3, None),
        };
        Correction { turns, mirror }
    }

    /// True when correcting swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        self.correction().turns % 2 == 1
    }
}

/// Bring `image` upright according to the EXIF orientation of `source`.
///
/// Missing EXIF data, a missing tag, or an out-of-range value are all a
/// silent no-op. Returns the orientation that was applied, if any.
pub fn apply_autorotate<E: PixelEngine>(image: &mut Image<E>, source: &Path) -> Option<Orientation> {
    let Some(code) = image.engine().read_orientation(source) else {
        trace!("No EXIF orientation in {}", source.display());
        return None;
    };
    let Some(orientation) = Orientation::from_exif(code) else {
        debug!(
            "Ignoring out-of-range EXIF orientation {} in {}",
            code,
            source.display()
        );
        return None;
    };

    let correction = orientation.correction();
    if correction.is_identity() {
        return Some(orientation);
    }

    debug!(
        "Autorotating {} ({:?}): {:?}",
        source.display(),
        orientation,
        correction
    );
    if correction.turns != 0 {
        image.turn(correction.turns as i32);
    }
    match correction.mirror {
        Some(Mirror::Horizontal) => {
            image.flop();
        }
        Some(Mirror::Vertical) => {
            image.flip();
        }
        None => {}
    }
    Some(orientation)
}
