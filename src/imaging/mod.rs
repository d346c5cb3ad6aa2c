//! Image handling on top of a pluggable pixel engine.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image::ImageReader`, `JpegEncoder`, `AvifEncoder` |
//! | **Resize** | `crop_imm` + `resize_exact` (Lanczos3) |
//! | **Rotate** | `imageproc::geometric_transformations::rotate_about_center` |
//! | **Sharpen / blur** | `unsharpen` / `blur` |
//! | **Color filters** | `colormod(...)` lookup tables |
//! | **EXIF orientation** | `rexif` |
//!
//! The module is split into:
//! - **Parameters**: resize intents, size plans and save/load options
//! - **Calculations**: pure dimension math (unit testable)
//! - **Backend**: the [`PixelEngine`] trait + [`RustEngine`]
//! - **Image**: the [`Image`] handle with paired in-place / copy operations
//! - **Lifecycle**: [`Loader`] and saving, including in-memory data
//! - **Format** and **Orientation**: save-codec negotiation and EXIF autorotation

pub mod backend;
mod calculations;
pub mod colormod;
pub mod format;
mod image;
pub mod lifecycle;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{Decoded, EngineError, PixelEngine};
pub use calculations::{crop_source_rect, normalize_turns, plan};
pub use colormod::ColorAdjustment;
pub use self::image::Image;
pub use lifecycle::Loader;
pub use orientation::{Correction, Mirror, Orientation};
pub use params::{
    Extent, Gravity, LoadOptions, Quality, ResizeIntent, SaveOptions, SizePlan, Sizing,
    resolve_quality,
};
pub use rust_backend::RustEngine;
