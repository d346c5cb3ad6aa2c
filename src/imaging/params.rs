//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the [`Image`](super::Image) facade (which validates
//! caller intent) and the [`backend`](super::backend) (which does the pixel
//! work). Everything here is validated on construction, so a value that exists
//! is a value the planner and the engine can act on.
//!
//! ## Types
//!
//! - [`Quality`] — Encoding quality (0–100). Rejected, not clamped, when out of range.
//! - [`Extent`] — One side of a fit box: a pixel count or `Auto`.
//! - [`Gravity`] — Where the crop window sits when a fit box is filled by cropping.
//! - [`ResizeIntent`] — A scale factor or a fit box, plus the `skew`/`crop`/`background` modifiers.
//! - [`SizePlan`] — Concrete source rectangle and target size, produced by the planner.
//! - [`LoadOptions`] / [`SaveOptions`] — Per-call overrides for load and save.

use crate::error::{Error, Result};
use image::Rgba;
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Result<Self> {
        if value > 100 {
            return Err(Error::invalid(format!(
                "invalid quality {value} (must be 0-100)"
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Validate an optional quality argument.
pub fn resolve_quality(quality: Option<u32>) -> Result<Option<Quality>> {
    quality.map(Quality::new).transpose()
}

/// One side of a fit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    Px(u32),
    /// Derived from the other side and the original aspect ratio.
    Auto,
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Px(n) => write!(f, "{n}"),
            Extent::Auto => f.write_str("auto"),
        }
    }
}

impl FromStr for Extent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Extent::Auto);
        }
        s.parse::<u32>()
            .map(Extent::Px)
            .map_err(|_| Error::invalid(format!("invalid extent {s:?} (pixels or \"auto\")")))
    }
}

impl From<u32> for Extent {
    fn from(px: u32) -> Self {
        Extent::Px(px)
    }
}

/// Where to position the crop window when filling a box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Gravity {
    /// Center on both axes.
    #[default]
    Center,
    /// Position by fraction of the free space. `(0.0, 0.0)` = top-left,
    /// `(1.0, 1.0)` = bottom-right.
    Percentage(f32, f32),
}

impl FromStr for Gravity {
    type Err = Error;

    /// Accepts `center`, a `<vertical>_<horizontal>` anchor such as
    /// `top_left` or `center_middle`, or a fraction pair like `0.5,0.25`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "center" || s == "center_middle" {
            return Ok(Gravity::Center);
        }
        if let Some((x, y)) = s.split_once(',') {
            let parse = |v: &str| {
                v.trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|p| (0.0..=1.0).contains(p))
            };
            return match (parse(x), parse(y)) {
                (Some(x), Some(y)) => Ok(Gravity::Percentage(x, y)),
                _ => Err(Error::invalid(format!("invalid gravity {s:?}"))),
            };
        }
        let (vertical, horizontal) = s
            .split_once('_')
            .ok_or_else(|| Error::invalid(format!("invalid gravity {s:?}")))?;
        let y = match vertical {
            "top" => 0.0,
            "center" => 0.5,
            "bottom" => 1.0,
            _ => return Err(Error::invalid(format!("invalid gravity {s:?}"))),
        };
        let x = match horizontal {
            "left" => 0.0,
            "middle" => 0.5,
            "right" => 1.0,
            _ => return Err(Error::invalid(format!("invalid gravity {s:?}"))),
        };
        Ok(Gravity::Percentage(x, y))
    }
}

/// How the target size is expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Uniform scale factor, strictly between 0 and 1.
    Scale(f64),
    /// Fit box; at most one side may be [`Extent::Auto`].
    Box { width: Extent, height: Extent },
}

/// A validated resize request.
///
/// Build one with [`ResizeIntent::scale`], [`ResizeIntent::fit`],
/// [`ResizeIntent::width`] or [`ResizeIntent::height`], then add modifiers.
///
/// ```
/// # use pixmill::imaging::{ResizeIntent, Gravity};
/// let thumb = ResizeIntent::fit(400, 300)?.crop(Gravity::Center)?;
/// let half = ResizeIntent::scale(0.5)?;
/// let banner = ResizeIntent::width(1200)?;
/// # Ok::<(), pixmill::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeIntent {
    sizing: Sizing,
    skew: bool,
    crop: Option<Gravity>,
    background: Option<Rgba<u8>>,
}

impl ResizeIntent {
    /// Scale both axes by `factor`, which must satisfy `0 < factor < 1`.
    pub fn scale(factor: f64) -> Result<Self> {
        if !(factor > 0.0 && factor < 1.0) {
            return Err(Error::invalid(format!(
                "scale factor {factor} out of range (must be between 0 and 1, exclusive)"
            )));
        }
        Ok(Self::from_sizing(Sizing::Scale(factor)))
    }

    /// Fit inside a `width` x `height` box.
    pub fn fit(width: impl Into<Extent>, height: impl Into<Extent>) -> Result<Self> {
        Self::boxed(width.into(), height.into())
    }

    /// Fixed width, height follows the aspect ratio.
    pub fn width(width: u32) -> Result<Self> {
        Self::boxed(Extent::Px(width), Extent::Auto)
    }

    /// Fixed height, width follows the aspect ratio.
    pub fn height(height: u32) -> Result<Self> {
        Self::boxed(Extent::Auto, Extent::Px(height))
    }

    fn boxed(width: Extent, height: Extent) -> Result<Self> {
        match (width, height) {
            (Extent::Auto, Extent::Auto) => Err(Error::invalid(
                "inconclusive box auto x auto (at most one side may be auto)",
            )),
            (Extent::Px(0), _) | (_, Extent::Px(0)) => Err(Error::invalid(format!(
                "box {width} x {height} must not have a zero side"
            ))),
            _ => Ok(Self::from_sizing(Sizing::Box { width, height })),
        }
    }

    fn from_sizing(sizing: Sizing) -> Self {
        Self {
            sizing,
            skew: false,
            crop: None,
            background: None,
        }
    }

    /// Stretch to the exact box, disregarding the original aspect ratio.
    pub fn skew(mut self) -> Result<Self> {
        self.require_full_box("skew")?;
        if self.crop.is_some() {
            return Err(Error::invalid("skew and crop cannot be combined"));
        }
        self.skew = true;
        Ok(self)
    }

    /// Fill the exact box, cropping the overflow at `gravity`.
    pub fn crop(mut self, gravity: Gravity) -> Result<Self> {
        self.require_full_box("crop")?;
        if self.skew {
            return Err(Error::invalid("skew and crop cannot be combined"));
        }
        self.crop = Some(gravity);
        Ok(self)
    }

    /// Flatten transparency onto `color` after resizing.
    pub fn background(mut self, color: Rgba<u8>) -> Self {
        self.background = Some(color);
        self
    }

    fn require_full_box(&self, modifier: &str) -> Result<()> {
        match self.sizing {
            Sizing::Box {
                width: Extent::Px(_),
                height: Extent::Px(_),
            } => Ok(()),
            other => Err(Error::invalid(format!(
                "{modifier} requires a box with both sides given, got {other:?}"
            ))),
        }
    }

    pub fn sizing(&self) -> Sizing {
        self.sizing
    }

    pub fn is_skew(&self) -> bool {
        self.skew
    }

    pub fn crop_gravity(&self) -> Option<Gravity> {
        self.crop
    }

    pub fn background_color(&self) -> Option<Rgba<u8>> {
        self.background
    }
}

/// Concrete pixel-space resize: which source rectangle maps to which target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePlan {
    pub origin_x: u32,
    pub origin_y: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub target_width: u32,
    pub target_height: u32,
}

impl SizePlan {
    /// True when the source rectangle is the whole original image.
    pub fn is_full_source(&self, width: u32, height: u32) -> bool {
        self.origin_x == 0
            && self.origin_y == 0
            && self.source_width == width
            && self.source_height == height
    }
}

/// Per-call load options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Overrides the loader's autorotate setting when present.
    pub autorotate: Option<bool>,
}

impl LoadOptions {
    pub fn autorotate(value: bool) -> Self {
        Self {
            autorotate: Some(value),
        }
    }
}

/// Per-call save options. Unset fields are negotiated, see [`format`](super::format).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub format: Option<String>,
    pub quality: Option<u32>,
}

impl SaveOptions {
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }
}
