//! Pure Rust pixel engine.
//!
//! ## Crate mapping
//!
//! | Primitive | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality-aware) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6, quality-aware) |
//! | Encode → others | `DynamicImage::write_to` |
//! | Identify in-memory data | `image::guess_format` |
//! | EXIF orientation | `rexif::parse_file` |
//! | Resize | `DynamicImage::crop_imm` + `resize_exact` with `Lanczos3` |
//! | Quarter turns / mirrors | `rotate90/180/270`, `flipv`, `fliph` |
//! | Free rotation | `imageproc::geometric_transformations::rotate_about_center` |
//! | Sharpen / blur | `unsharpen` / `blur` |
//! | Filters | `colormod(...)` lookup tables, see [`colormod`](super::colormod) |

use super::backend::{Decoded, EngineError, PixelEngine};
use super::colormod::{lookup_table, parse_expression};
use super::params::{Quality, SizePlan};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Pixel, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::io::Write;
use std::path::Path;
use tracing::trace;

/// Quality used by lossy encoders when the caller gives none.
pub const DEFAULT_QUALITY: u8 = 90;

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-primitive mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Short codec name for an `image` format, e.g. `jpg` for JPEG.
pub fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| format!("{format:?}").to_lowercase())
}

fn apply_lut(raster: &mut DynamicImage, lut: &[u8; 256]) {
    let map = |c: u8| lut[c as usize];
    match raster {
        DynamicImage::ImageLuma8(buf) => buf.pixels_mut().for_each(|p| p.apply_without_alpha(map)),
        DynamicImage::ImageLumaA8(buf) => buf.pixels_mut().for_each(|p| p.apply_without_alpha(map)),
        DynamicImage::ImageRgb8(buf) => buf.pixels_mut().for_each(|p| p.apply_without_alpha(map)),
        DynamicImage::ImageRgba8(buf) => buf.pixels_mut().for_each(|p| p.apply_without_alpha(map)),
        other => {
            let mut rgba = other.to_rgba8();
            rgba.pixels_mut().for_each(|p| p.apply_without_alpha(map));
            *other = DynamicImage::ImageRgba8(rgba);
        }
    }
}

/// JPEG carries no alpha and only 8-bit samples.
fn jpeg_compatible(raster: &DynamicImage) -> Option<DynamicImage> {
    match raster {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => None,
        other => Some(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

impl PixelEngine for RustEngine {
    fn decode(&self, path: &Path) -> Result<Decoded, EngineError> {
        let unreadable =
            |e: std::io::Error| EngineError::Decode(format!("{}: {}", path.display(), e));
        let reader = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(unreadable)?;
        let format = reader.format().map(format_name);
        let raster = reader.decode().map_err(|e| {
            EngineError::Decode(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        trace!(
            "decoded {} ({}x{}, {:?})",
            path.display(),
            raster.width(),
            raster.height(),
            format
        );
        Ok(Decoded { raster, format })
    }

    fn encode(
        &self,
        raster: &DynamicImage,
        path: &Path,
        format: &str,
        quality: Option<Quality>,
    ) -> Result<(), EngineError> {
        let image_format = ImageFormat::from_extension(format)
            .filter(|f| f.writing_enabled())
            .ok_or_else(|| EngineError::Unsupported(format!("no encoder for format {format:?}")))?;
        let quality = quality.map_or(DEFAULT_QUALITY, Quality::value).max(1);

        let file = std::fs::File::create(path)
            .map_err(|e| EngineError::Encode(format!("{}: {}", path.display(), e)))?;
        let mut writer = std::io::BufWriter::new(file);

        let result = match image_format {
            ImageFormat::Jpeg => {
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
                match jpeg_compatible(raster) {
                    Some(converted) => converted.write_with_encoder(encoder),
                    None => raster.write_with_encoder(encoder),
                }
            }
            ImageFormat::Avif => {
                let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                    &mut writer,
                    6,
                    quality,
                );
                raster.write_with_encoder(encoder)
            }
            other => raster.write_to(&mut writer, other),
        };
        result.map_err(|e| {
            EngineError::Encode(format!("{} encode of {} failed: {}", format, path.display(), e))
        })?;
        writer
            .flush()
            .map_err(|e| EngineError::Encode(format!("{}: {}", path.display(), e)))?;
        trace!("encoded {} as {}", path.display(), format);
        Ok(())
    }

    fn identify(&self, data: &[u8]) -> Option<String> {
        image::guess_format(data).ok().map(format_name)
    }

    fn read_orientation(&self, path: &Path) -> Option<u16> {
        let exif = match rexif::parse_file(path) {
            Ok(exif) => exif,
            Err(e) => {
                trace!("No EXIF data for {}: {}", path.display(), e);
                return None;
            }
        };
        exif.entries
            .iter()
            .find(|e| e.tag == rexif::ExifTag::Orientation)
            .and_then(|e| match &e.value {
                rexif::TagValue::U16(values) => values.first().copied(),
                _ => None,
            })
    }

    fn resize(&self, raster: &mut DynamicImage, plan: &SizePlan) {
        if !plan.is_full_source(raster.width(), raster.height()) {
            *raster = raster.crop_imm(
                plan.origin_x,
                plan.origin_y,
                plan.source_width,
                plan.source_height,
            );
        }
        *raster = raster.resize_exact(plan.target_width, plan.target_height, FilterType::Lanczos3);
    }

    fn flatten(&self, raster: &mut DynamicImage, background: Rgba<u8>) {
        if !raster.color().has_alpha() {
            return;
        }
        let mut canvas = RgbaImage::from_pixel(raster.width(), raster.height(), background);
        image::imageops::overlay(&mut canvas, &raster.to_rgba8(), 0, 0);
        *raster = if background.0[3] == u8::MAX {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
        } else {
            DynamicImage::ImageRgba8(canvas)
        };
    }

    fn crop(&self, raster: &mut DynamicImage, x: u32, y: u32, width: u32, height: u32) {
        *raster = raster.crop_imm(x, y, width, height);
    }

    fn turn(&self, raster: &mut DynamicImage, steps: u8) {
        *raster = match steps {
            1 => raster.rotate90(),
            2 => raster.rotate180(),
            3 => raster.rotate270(),
            _ => return,
        };
    }

    fn rotate(&self, raster: &mut DynamicImage, radians: f64) {
        if !radians.is_finite() || radians.rem_euclid(std::f64::consts::TAU) == 0.0 {
            return;
        }
        let (w, h) = (raster.width() as f64, raster.height() as f64);
        let (sin, cos) = radians.sin_cos();
        let bound_w = (w * cos.abs() + h * sin.abs()).round().max(1.0) as u32;
        let bound_h = (w * sin.abs() + h * cos.abs()).round().max(1.0) as u32;

        // Pad to the diagonal so nothing is clipped while rotating about the center
        let side = (w * w + h * h).sqrt().ceil() as u32;
        let mut canvas = RgbaImage::new(side, side);
        image::imageops::overlay(
            &mut canvas,
            &raster.to_rgba8(),
            ((side - raster.width()) / 2) as i64,
            ((side - raster.height()) / 2) as i64,
        );
        let rotated = rotate_about_center(
            &canvas,
            radians as f32,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
        );
        *raster = DynamicImage::ImageRgba8(rotated).crop_imm(
            (side - bound_w.min(side)) / 2,
            (side - bound_h.min(side)) / 2,
            bound_w,
            bound_h,
        );
    }

    fn flip(&self, raster: &mut DynamicImage) {
        *raster = raster.flipv();
    }

    fn flop(&self, raster: &mut DynamicImage) {
        *raster = raster.fliph();
    }

    fn sharpen(&self, raster: &mut DynamicImage, radius: f64) {
        // The gaussian kernel needs a normal f32 sigma
        let sigma = radius.abs() as f32;
        if !sigma.is_normal() {
            trace!("sharpen radius {} too small or large for a kernel, skipped", radius);
            return;
        }
        let sigma = sigma.min(raster.width().max(raster.height()) as f32);
        if radius > 0.0 {
            *raster = raster.unsharpen(sigma, 0);
        } else {
            *raster = raster.blur(sigma);
        }
    }

    fn apply_filter(
        &self,
        raster: &mut DynamicImage,
        expression: &str,
    ) -> Result<(), EngineError> {
        let adjustments = parse_expression(expression)?;
        if !adjustments.is_empty() {
            apply_lut(raster, &lookup_table(&adjustments));
        }
        Ok(())
    }
}
