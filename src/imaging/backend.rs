//! Pixel engine trait and shared types.
//!
//! The [`PixelEngine`] trait is the boundary between the facade and whatever
//! does the pixel work. The facade plans geometry, validates arguments and
//! negotiates formats; the engine decodes, encodes and runs the kernels.
//!
//! The production implementation is
//! [`RustEngine`](super::rust_backend::RustEngine): the `image` crate for
//! codecs and kernels, `imageproc` for free rotation, `rexif` for EXIF.
//!
//! Engine primitives always operate on the buffer they are given. Whether the
//! caller's image is mutated or a copy is made is decided by the facade.

use super::params::{Quality, SizePlan};
use image::{DynamicImage, Rgba};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Filter error: {0}")]
    Filter(String),
}

/// A freshly decoded image and the short codec name the engine detected.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub raster: DynamicImage,
    /// Lower-case codec name as the engine spells it (`"jpg"`, `"png"`, ...).
    pub format: Option<String>,
}

/// Trait for pixel engines.
///
/// Every engine must implement all primitives so the facade stays
/// engine-agnostic. Engines are cheap handles (`Clone`); an [`Image`] carries
/// one so its operations can dispatch without extra arguments.
///
/// [`Image`]: super::Image
pub trait PixelEngine: Clone + Send + Sync {
    /// Decode the file at `path`.
    fn decode(&self, path: &Path) -> Result<Decoded, EngineError>;

    /// Encode `raster` to `path` using the codec named `format`.
    fn encode(
        &self,
        raster: &DynamicImage,
        path: &Path,
        format: &str,
        quality: Option<Quality>,
    ) -> Result<(), EngineError>;

    /// Sniff the codec of in-memory data from its magic bytes.
    fn identify(&self, data: &[u8]) -> Option<String>;

    /// Read the raw EXIF orientation tag. `None` when there is no EXIF data or
    /// no orientation tag.
    fn read_orientation(&self, path: &Path) -> Option<u16>;

    /// Crop `plan`'s source rectangle and scale it to the target size.
    fn resize(&self, raster: &mut DynamicImage, plan: &SizePlan);

    /// Composite the raster over a solid color, dropping transparency.
    fn flatten(&self, raster: &mut DynamicImage, background: Rgba<u8>);

    fn crop(&self, raster: &mut DynamicImage, x: u32, y: u32, width: u32, height: u32);

    /// Rotate by `steps` quarter turns clockwise, `steps` in `0..4`.
    fn turn(&self, raster: &mut DynamicImage, steps: u8);

    /// Free rotation; the canvas grows to the rotated bounding box.
    fn rotate(&self, raster: &mut DynamicImage, radians: f64);

    /// Mirror vertically (top ↔ bottom).
    fn flip(&self, raster: &mut DynamicImage);

    /// Mirror horizontally (left ↔ right).
    fn flop(&self, raster: &mut DynamicImage);

    /// Sharpen for positive `radius`, blur for negative.
    fn sharpen(&self, raster: &mut DynamicImage, radius: f64);

    /// Run a filter expression in the engine's filter language.
    fn apply_filter(&self, raster: &mut DynamicImage, expression: &str)
    -> Result<(), EngineError>;
}
