//! # pixmill
//!
//! An image-handle library over a pluggable pixel engine, plus a small CLI.
//!
//! Load a file or a byte buffer into an [`Image`], transform it in place or
//! into an independent copy, and save it back with the codec negotiated from
//! an explicit format, the destination filename, or the image's own format.
//!
//! ```no_run
//! use pixmill::config::Config;
//! use pixmill::imaging::{Extent, LoadOptions, Loader, ResizeIntent, SaveOptions};
//!
//! # fn main() -> pixmill::Result<()> {
//! let loader = Loader::from_config(&Config::default());
//! let mut photo = loader.load("photo.jpg", LoadOptions::autorotate(true))?;
//!
//! let thumb = photo.resized(&ResizeIntent::fit(400, Extent::Auto)?)?;
//! thumb.save("thumb.png", &SaveOptions::default())?;
//!
//! photo.turn(1).sharpen(1.5)?;
//! photo.save("upright.jpg", &SaveOptions::default().quality(85))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The [`Image`] handle, size planning, format negotiation, EXIF autorotation, and the [`PixelEngine`](imaging::PixelEngine) boundary |
//! | [`config`] | `pixmill.toml` loading and validation |
//! | [`error`] | The crate-wide [`Error`] taxonomy |
//!
//! # Design Decisions
//!
//! ## Engine Behind a Trait
//!
//! All pixel work goes through [`imaging::PixelEngine`]. The production engine,
//! [`imaging::RustEngine`], is built on the `image` crate and is pure Rust.
//! Tests run the whole facade against a recording mock, so argument
//! normalization and dimension bookkeeping are checked without decoding a
//! single pixel.
//!
//! ## Paired Operations
//!
//! Every transformation exists as an in-place form taking `&mut self` and a
//! copy form taking `&self`. The borrow checker makes the contract explicit:
//! a copy form can never mutate its receiver.
//!
//! ## No Global State
//!
//! Autorotation is a property of a [`Loader`](imaging::Loader) built from
//! [`Config`](config::Config), overridable per call. Nothing in the crate is
//! process-wide.

pub mod config;
pub mod error;
pub mod imaging;

pub use error::{Error, Result};
pub use imaging::Image;
