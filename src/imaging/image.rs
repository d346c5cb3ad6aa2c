//! The [`Image`] handle and its transformations.
//!
//! Every transformation comes as a pair:
//!
//! | In place (`&mut self`) | Copy (`&self`) |
//! |---|---|
//! | [`resize`](Image::resize) | [`resized`](Image::resized) |
//! | [`crop`](Image::crop) | [`cropped`](Image::cropped) |
//! | [`turn`](Image::turn) | [`turned`](Image::turned) |
//! | [`rotate`](Image::rotate) | [`rotated`](Image::rotated) |
//! | [`flip`](Image::flip) / [`flop`](Image::flop) | [`flipped`](Image::flipped) / [`flopped`](Image::flopped) |
//! | [`sharpen`](Image::sharpen) / [`blur`](Image::blur) | [`sharpened`](Image::sharpened) / [`blurred`](Image::blurred) |
//! | [`filter`](Image::filter) | [`filtered`](Image::filtered) |
//! | [`brighten`](Image::brighten) / [`contrast`](Image::contrast) / [`gamma`](Image::gamma) | [`brightened`](Image::brightened) / [`contrasted`](Image::contrasted) / [`gamma_corrected`](Image::gamma_corrected) |
//!
//! In-place forms validate, mutate the receiver and return it for chaining.
//! Copy forms duplicate the pixel buffer, run the in-place form on the
//! duplicate and return it; the receiver is never touched.
//!
//! An `Image` is not synchronized. Mutating one handle from several threads
//! needs external locking; copies are independent and can be processed
//! concurrently.

use super::backend::{Decoded, PixelEngine};
use super::calculations::{normalize_turns, plan};
use super::colormod::ColorAdjustment;
use super::format::normalize_format;
use super::params::ResizeIntent;
use super::rust_backend::RustEngine;
use crate::error::{Error, Result};
use image::DynamicImage;
use std::fmt;
use tracing::{debug, trace};

/// A decoded image bound to the engine that produced it.
///
/// `Clone` is a deep copy of the pixel buffer.
#[derive(Clone)]
pub struct Image<E: PixelEngine = RustEngine> {
    engine: E,
    raster: DynamicImage,
    /// Codec name as the engine spells it.
    format: Option<String>,
}

impl<E: PixelEngine> Image<E> {
    pub(crate) fn from_decoded(engine: E, decoded: Decoded) -> Self {
        Self {
            engine,
            raster: decoded.raster,
            format: decoded.format,
        }
    }

    /// Wrap an existing buffer, e.g. one built in memory.
    pub fn from_raster(engine: E, raster: DynamicImage) -> Self {
        Self {
            engine,
            raster,
            format: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Short codec name, with `jpg` reported as `jpeg`.
    pub fn format(&self) -> Option<String> {
        self.format.as_deref().map(normalize_format)
    }

    /// Codec name exactly as stored by the engine.
    pub(crate) fn raw_format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = Some(format.into());
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn raster(&self) -> &DynamicImage {
        &self.raster
    }

    pub fn into_raster(self) -> DynamicImage {
        self.raster
    }

    /// Duplicate, then apply `op` to the duplicate.
    fn copy_with<F>(&self, op: F) -> Result<Self>
    where
        F: FnOnce(&mut Self) -> Result<&mut Self>,
    {
        let mut copy = self.clone();
        op(&mut copy)?;
        Ok(copy)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn resize(&mut self, intent: &ResizeIntent) -> Result<&mut Self> {
        let plan = plan(self.dimensions(), intent)?;
        if plan.target_width == 0 || plan.target_height == 0 {
            return Err(Error::invalid(format!(
                "resize of {}x{} to {}x{} would produce an empty image",
                self.width(),
                self.height(),
                plan.target_width,
                plan.target_height
            )));
        }
        trace!("resize {:?}", plan);
        self.engine.resize(&mut self.raster, &plan);
        if let Some(background) = intent.background_color() {
            self.engine.flatten(&mut self.raster, background);
        }
        Ok(self)
    }

    pub fn resized(&self, intent: &ResizeIntent) -> Result<Self> {
        self.copy_with(|img| img.resize(intent))
    }

    /// Keep the `width` x `height` rectangle at `(x, y)`.
    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<&mut Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!(
                "crop size {width}x{height} must not be empty"
            )));
        }
        if x >= self.width() || y >= self.height() {
            return Err(Error::invalid(format!(
                "crop origin ({x}, {y}) outside {}x{} image",
                self.width(),
                self.height()
            )));
        }
        self.engine.crop(&mut self.raster, x, y, width, height);
        Ok(self)
    }

    pub fn cropped(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        self.copy_with(|img| img.crop(x, y, width, height))
    }

    /// Rotate by quarter turns, clockwise. Negative counts turn the other way.
    pub fn turn(&mut self, steps: i32) -> &mut Self {
        let steps = normalize_turns(steps);
        if steps != 0 {
            self.engine.turn(&mut self.raster, steps);
        }
        self
    }

    pub fn turned(&self, steps: i32) -> Self {
        let mut copy = self.clone();
        copy.turn(steps);
        copy
    }

    /// Rotate by an arbitrary angle in degrees. NaN and infinite angles
    /// leave the image as it is.
    pub fn rotate(&mut self, degrees: f64) -> &mut Self {
        if !degrees.is_finite() {
            debug!("Ignoring rotation by {} degrees", degrees);
            return self;
        }
        self.engine
            .rotate(&mut self.raster, degrees * std::f64::consts::PI / 180.0);
        self
    }

    pub fn rotated(&self, degrees: f64) -> Self {
        let mut copy = self.clone();
        copy.rotate(degrees);
        copy
    }

    /// Mirror top ↔ bottom.
    pub fn flip(&mut self) -> &mut Self {
        self.engine.flip(&mut self.raster);
        self
    }

    pub fn flipped(&self) -> Self {
        let mut copy = self.clone();
        copy.flip();
        copy
    }

    /// Mirror left ↔ right.
    pub fn flop(&mut self) -> &mut Self {
        self.engine.flop(&mut self.raster);
        self
    }

    pub fn flopped(&self) -> Self {
        let mut copy = self.clone();
        copy.flop();
        copy
    }

    // =========================================================================
    // Sharpness
    // =========================================================================

    pub fn sharpen(&mut self, radius: f64) -> Result<&mut Self> {
        check_radius(radius)?;
        self.engine.sharpen(&mut self.raster, radius);
        Ok(self)
    }

    pub fn sharpened(&self, radius: f64) -> Result<Self> {
        self.copy_with(|img| img.sharpen(radius))
    }

    /// Blur shares the engine's sharpen primitive with a negated radius.
    pub fn blur(&mut self, radius: f64) -> Result<&mut Self> {
        check_radius(radius)?;
        self.engine.sharpen(&mut self.raster, -radius);
        Ok(self)
    }

    pub fn blurred(&self, radius: f64) -> Result<Self> {
        self.copy_with(|img| img.blur(radius))
    }

    // =========================================================================
    // Color
    // =========================================================================

    /// Run a raw engine filter expression. The expression is not inspected
    /// here; the engine reports anything it cannot understand.
    pub fn filter(&mut self, expression: &str) -> Result<&mut Self> {
        self.engine.apply_filter(&mut self.raster, expression)?;
        Ok(self)
    }

    pub fn filtered(&self, expression: &str) -> Result<Self> {
        self.copy_with(|img| img.filter(expression))
    }

    fn adjust(&mut self, adjustment: ColorAdjustment) -> Result<&mut Self> {
        self.filter(&adjustment.to_expression())
    }

    /// Shift brightness by `value` in `-1.0..=1.0`.
    pub fn brighten(&mut self, value: f64) -> Result<&mut Self> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(Error::invalid(format!(
                "illegal brightness {value} (must be between -1 and 1)"
            )));
        }
        self.adjust(ColorAdjustment::Brightness(value))
    }

    pub fn brightened(&self, value: f64) -> Result<Self> {
        self.copy_with(|img| img.brighten(value))
    }

    /// Scale contrast by `value`, which must not be negative. `1.0` is identity.
    pub fn contrast(&mut self, value: f64) -> Result<&mut Self> {
        if value.is_nan() || value < 0.0 {
            return Err(Error::invalid(format!(
                "illegal contrast {value} (must be >= 0)"
            )));
        }
        self.adjust(ColorAdjustment::Contrast(value))
    }

    pub fn contrasted(&self, value: f64) -> Result<Self> {
        self.copy_with(|img| img.contrast(value))
    }

    /// Apply a gamma curve. Any value is forwarded to the engine as is.
    pub fn gamma(&mut self, value: f64) -> Result<&mut Self> {
        self.adjust(ColorAdjustment::Gamma(value))
    }

    pub fn gamma_corrected(&self, value: f64) -> Result<Self> {
        self.copy_with(|img| img.gamma(value))
    }
}

fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(Error::invalid(format!(
            "illegal radius {radius} (must be finite and >= 0)"
        )));
    }
    Ok(())
}

impl<E: PixelEngine> fmt::Debug for Image<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({}x{}", self.width(), self.height())?;
        if let Some(format) = self.format() {
            write!(f, " {}", format.to_uppercase())?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockEngine, RecordedOp};
    use crate::imaging::params::{Extent, Gravity, SizePlan};
    use image::Rgba;

    fn image_800x600() -> (MockEngine, Image<MockEngine>) {
        let engine = MockEngine::new();
        let image = Image::from_decoded(
            engine.clone(),
            Decoded {
                raster: DynamicImage::new_rgb8(800, 600),
                format: Some("jpg".to_string()),
            },
        );
        (engine, image)
    }

    #[test]
    fn format_normalizes_jpg() {
        let (_, mut image) = image_800x600();
        assert_eq!(image.format().as_deref(), Some("jpeg"));
        assert_eq!(image.raw_format(), Some("jpg"));

        image.set_format("png");
        assert_eq!(image.format().as_deref(), Some("png"));
    }

    #[test]
    fn debug_shows_size_and_format() {
        let (_, image) = image_800x600();
        assert_eq!(format!("{image:?}"), "Image(800x600 JPEG)");

        let bare = Image::from_raster(MockEngine::new(), DynamicImage::new_rgb8(3, 2));
        assert_eq!(format!("{bare:?}"), "Image(3x2)");
    }

    // =========================================================================
    // Resize
    // =========================================================================

    #[test]
    fn resize_forwards_plan() {
        let (engine, mut image) = image_800x600();

        image.resize(&ResizeIntent::width(400).unwrap()).unwrap();

        assert_eq!(image.dimensions(), (400, 300));
        assert_eq!(
            engine.get_operations(),
            vec![RecordedOp::Resize(SizePlan {
                origin_x: 0,
                origin_y: 0,
                source_width: 800,
                source_height: 600,
                target_width: 400,
                target_height: 300,
            })]
        );
    }

    #[test]
    fn resize_end_to_end_shapes() {
        let (_, image) = image_800x600();
        let auto_w = image
            .resized(&ResizeIntent::fit(Extent::Auto, 150).unwrap())
            .unwrap();
        assert_eq!(auto_w.dimensions(), (200, 150));

        let boxed = image.resized(&ResizeIntent::fit(400, 400).unwrap()).unwrap();
        assert_eq!(boxed.dimensions(), (400, 300));
    }

    #[test]
    fn resized_leaves_receiver_untouched() {
        let (_, image) = image_800x600();

        let copy = image.resized(&ResizeIntent::scale(0.5).unwrap()).unwrap();

        assert_eq!(copy.dimensions(), (400, 300));
        assert_eq!(image.dimensions(), (800, 600));
        assert_eq!(copy.format().as_deref(), Some("jpeg"));
    }

    #[test]
    fn resize_to_empty_rejected_before_engine() {
        let engine = MockEngine::new();
        let mut image = Image::from_raster(engine.clone(), DynamicImage::new_rgb8(1000, 1));

        let err = image.resize(&ResizeIntent::width(10).unwrap()).unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(engine.get_operations().is_empty());
        assert_eq!(image.dimensions(), (1000, 1));
    }

    #[test]
    fn resize_with_crop_and_background() {
        let (engine, mut image) = image_800x600();
        let intent = ResizeIntent::fit(200, 200)
            .unwrap()
            .crop(Gravity::Center)
            .unwrap()
            .background(Rgba([255, 255, 255, 255]));

        image.resize(&intent).unwrap();

        assert_eq!(image.dimensions(), (200, 200));
        let ops = engine.get_operations();
        assert!(matches!(
            ops[0],
            RecordedOp::Resize(SizePlan {
                origin_x: 100,
                source_width: 600,
                ..
            })
        ));
        assert_eq!(ops[1], RecordedOp::Flatten([255, 255, 255, 255]));
    }

    // =========================================================================
    // Crop, turn, rotate, mirror
    // =========================================================================

    #[test]
    fn crop_forwards_verbatim() {
        let (engine, image) = image_800x600();
        let copy = image.cropped(10, 20, 100, 50).unwrap();
        assert_eq!(copy.dimensions(), (100, 50));
        assert_eq!(image.dimensions(), (800, 600));
        assert_eq!(engine.get_operations(), vec![RecordedOp::Crop(10, 20, 100, 50)]);
    }

    #[test]
    fn crop_rejects_empty_or_outside() {
        let (engine, mut image) = image_800x600();
        assert!(image.crop(0, 0, 0, 10).is_err());
        assert!(image.crop(800, 0, 10, 10).is_err());
        assert!(engine.get_operations().is_empty());
    }

    #[test]
    fn turn_normalizes_steps() {
        for (steps, expected) in [(-1, 3), (-2, 2), (-3, 1), (1, 1), (2, 2), (3, 3), (5, 1)] {
            let (engine, mut image) = image_800x600();
            image.turn(steps);
            assert_eq!(engine.get_operations(), vec![RecordedOp::Turn(expected)]);
        }
    }

    #[test]
    fn full_turns_skip_engine() {
        for steps in [0, 4, -4, 8] {
            let (engine, image) = image_800x600();
            let turned = image.turned(steps);
            assert_eq!(turned.dimensions(), (800, 600));
            assert!(engine.get_operations().is_empty());
        }
    }

    #[test]
    fn rotate_converts_degrees_to_radians() {
        let (engine, mut image) = image_800x600();
        image.rotate(90.0).rotate(-45.0);
        let radians: Vec<f64> = engine
            .get_operations()
            .into_iter()
            .map(|op| match op {
                RecordedOp::Rotate(r) => r,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert!((radians[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((radians[1] + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn rotate_by_non_finite_angle_skips_engine() {
        let (engine, mut image) = image_800x600();
        image.rotate(f64::NAN).rotate(f64::INFINITY);
        let copy = image.rotated(f64::NEG_INFINITY);
        assert_eq!(copy.dimensions(), (800, 600));
        assert!(engine.get_operations().is_empty());
    }

    #[test]
    fn flip_and_flop_dispatch() {
        let (engine, image) = image_800x600();
        let _ = image.flipped();
        let _ = image.flopped();
        assert_eq!(engine.get_operations(), vec![RecordedOp::Flip, RecordedOp::Flop]);
    }

    // =========================================================================
    // Sharpen / blur
    // =========================================================================

    #[test]
    fn blur_negates_radius() {
        let (engine, mut image) = image_800x600();
        image.sharpen(1.5).unwrap().blur(2.0).unwrap();
        assert_eq!(
            engine.get_operations(),
            vec![RecordedOp::Sharpen(1.5), RecordedOp::Sharpen(-2.0)]
        );
    }

    #[test]
    fn negative_radius_rejected() {
        let (engine, mut image) = image_800x600();
        assert!(matches!(image.sharpen(-0.1), Err(Error::InvalidArgument(_))));
        assert!(image.blurred(-1.0).is_err());
        assert!(image.blur(f64::NAN).is_err());
        assert!(matches!(
            image.sharpen(f64::INFINITY),
            Err(Error::InvalidArgument(_))
        ));
        assert!(image.blurred(f64::INFINITY).is_err());
        assert!(engine.get_operations().is_empty());
    }

    // =========================================================================
    // Color
    // =========================================================================

    #[test]
    fn color_adjustments_render_filter_expressions() {
        let (engine, mut image) = image_800x600();
        image
            .brighten(0.5)
            .unwrap()
            .contrast(1.2)
            .unwrap()
            .gamma(2.2)
            .unwrap();
        assert_eq!(
            engine.get_operations(),
            vec![
                RecordedOp::Filter("colormod(brightness=0.5);".to_string()),
                RecordedOp::Filter("colormod(contrast=1.2);".to_string()),
                RecordedOp::Filter("colormod(gamma=2.2);".to_string()),
            ]
        );
    }

    #[test]
    fn brightness_bounds() {
        let (_, mut image) = image_800x600();
        assert!(image.brighten(1.01).is_err());
        assert!(image.brighten(-1.01).is_err());
        assert!(image.brighten(1.0).is_ok());
        assert!(image.brighten(-1.0).is_ok());
    }

    #[test]
    fn contrast_must_not_be_negative() {
        let (_, mut image) = image_800x600();
        assert!(image.contrast(-0.5).is_err());
        assert!(image.contrast(0.0).is_ok());
    }

    #[test]
    fn gamma_is_unvalidated() {
        let (engine, image) = image_800x600();
        image.gamma_corrected(-3.0).unwrap();
        assert_eq!(
            engine.get_operations(),
            vec![RecordedOp::Filter("colormod(gamma=-3.0);".to_string())]
        );
    }

    #[test]
    fn filter_passes_expression_through() {
        let (engine, image) = image_800x600();
        image.filtered("anything the engine understands").unwrap();
        assert_eq!(
            engine.get_operations(),
            vec![RecordedOp::Filter("anything the engine understands".to_string())]
        );
    }
}
