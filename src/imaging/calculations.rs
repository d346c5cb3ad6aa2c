//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Target sides are rounded independently, so the final aspect ratio may
//! drift from the original by up to one pixel per axis.

use super::params::{Extent, Gravity, ResizeIntent, SizePlan, Sizing};
use crate::error::{Error, Result};

/// Turn a resize intent into a concrete source rectangle and target size.
///
/// # Arguments
/// * `original` - Original image dimensions (width, height)
/// * `intent` - Validated resize request
///
/// # Examples
/// ```
/// # use pixmill::imaging::{plan, Extent, ResizeIntent};
/// // 800x600 into a 400x400 box → wider than the box, width matches
/// let p = plan((800, 600), &ResizeIntent::fit(400, 400)?)?;
/// assert_eq!((p.target_width, p.target_height), (400, 300));
///
/// // Auto width from a fixed height
/// let p = plan((800, 600), &ResizeIntent::fit(Extent::Auto, 150)?)?;
/// assert_eq!((p.target_width, p.target_height), (200, 150));
/// # Ok::<(), pixmill::Error>(())
/// ```
pub fn plan(original: (u32, u32), intent: &ResizeIntent) -> Result<SizePlan> {
    let (orig_w, orig_h) = original;
    if orig_w == 0 || orig_h == 0 {
        return Err(Error::invalid(format!(
            "cannot plan a resize of an empty {orig_w}x{orig_h} image"
        )));
    }

    let full = |width: f64, height: f64| SizePlan {
        origin_x: 0,
        origin_y: 0,
        source_width: orig_w,
        source_height: orig_h,
        target_width: width.round() as u32,
        target_height: height.round() as u32,
    };

    let (ow, oh) = (orig_w as f64, orig_h as f64);

    match intent.sizing() {
        Sizing::Scale(factor) => {
            if !(factor > 0.0 && factor < 1.0) {
                return Err(Error::invalid(format!(
                    "scale factor {factor} out of range"
                )));
            }
            Ok(full(ow * factor, oh * factor))
        }
        Sizing::Box {
            width: Extent::Auto,
            height: Extent::Px(h),
        } => Ok(full(h as f64 / oh * ow, h as f64)),
        Sizing::Box {
            width: Extent::Px(w),
            height: Extent::Auto,
        } => Ok(full(w as f64, w as f64 / ow * oh)),
        Sizing::Box {
            width: Extent::Px(w),
            height: Extent::Px(h),
        } => {
            if intent.is_skew() {
                return Ok(full(w as f64, h as f64));
            }
            if let Some(gravity) = intent.crop_gravity() {
                let (origin_x, origin_y, source_width, source_height) =
                    crop_source_rect(original, (w, h), gravity);
                return Ok(SizePlan {
                    origin_x,
                    origin_y,
                    source_width,
                    source_height,
                    target_width: w,
                    target_height: h,
                });
            }

            let (bw, bh) = (w as f64, h as f64);
            if ow / oh >= bw / bh {
                // Wider than (or as wide as) the box: width matches
                Ok(full(bw, oh * bw / ow))
            } else {
                // Narrower: height matches
                Ok(full(ow * bh / oh, bh))
            }
        }
        Sizing::Box {
            width: Extent::Auto,
            height: Extent::Auto,
        } => Err(Error::invalid("inconclusive box auto x auto")),
    }
}

/// Largest rectangle of the box's aspect ratio that fits inside the original,
/// positioned by `gravity`.
///
/// Returns `(x, y, width, height)` in original pixel space. One side always
/// spans the full original; the other is trimmed.
pub fn crop_source_rect(
    original: (u32, u32),
    target: (u32, u32),
    gravity: Gravity,
) -> (u32, u32, u32, u32) {
    let (orig_w, orig_h) = original;
    let (tgt_w, tgt_h) = target;

    let src_aspect = orig_w as f64 / orig_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    let (crop_w, crop_h) = if src_aspect > tgt_aspect {
        // Source is wider: keep full height, trim width
        let w = ((orig_h as f64 * tgt_aspect).round() as u32).clamp(1, orig_w);
        (w, orig_h)
    } else {
        // Source is taller: keep full width, trim height
        let h = ((orig_w as f64 / tgt_aspect).round() as u32).clamp(1, orig_h);
        (orig_w, h)
    };

    let x = gravity_offset(orig_w - crop_w, gravity, true);
    let y = gravity_offset(orig_h - crop_h, gravity, false);
    (x, y, crop_w, crop_h)
}

fn gravity_offset(space: u32, gravity: Gravity, horizontal: bool) -> u32 {
    if space == 0 {
        return 0;
    }
    match gravity {
        Gravity::Center => space / 2,
        Gravity::Percentage(x, y) => {
            let pct = if horizontal { x } else { y };
            (space as f64 * pct.clamp(0.0, 1.0) as f64).round() as u32
        }
    }
}

/// Normalize a quarter-turn count into `0..4`.
///
/// Negative counts turn counter-clockwise: `-1` is three clockwise turns.
pub fn normalize_turns(steps: i32) -> u8 {
    steps.rem_euclid(4) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(original: (u32, u32), intent: ResizeIntent) -> (u32, u32) {
        let p = plan(original, &intent).unwrap();
        (p.target_width, p.target_height)
    }

    // =========================================================================
    // Scale factor
    // =========================================================================

    #[test]
    fn scale_rounds_each_axis() {
        assert_eq!(targets((800, 600), ResizeIntent::scale(0.5).unwrap()), (400, 300));
        // 333 * 0.5 = 166.5 → 167, 101 * 0.5 = 50.5 → 51
        assert_eq!(targets((333, 101), ResizeIntent::scale(0.5).unwrap()), (167, 51));
        // 1000 * 0.3333 = 333.3 → 333
        assert_eq!(targets((1000, 10), ResizeIntent::scale(0.3333).unwrap()), (333, 3));
    }

    #[test]
    fn scale_keeps_full_source() {
        let p = plan((640, 480), &ResizeIntent::scale(0.25).unwrap()).unwrap();
        assert!(p.is_full_source(640, 480));
    }

    // =========================================================================
    // Auto sides
    // =========================================================================

    #[test]
    fn auto_height_from_width() {
        assert_eq!(targets((800, 600), ResizeIntent::width(400).unwrap()), (400, 300));
    }

    #[test]
    fn auto_width_from_height() {
        assert_eq!(
            targets((800, 600), ResizeIntent::fit(Extent::Auto, 150).unwrap()),
            (200, 150)
        );
    }

    #[test]
    fn auto_can_upscale() {
        assert_eq!(targets((100, 50), ResizeIntent::width(300).unwrap()), (300, 150));
    }

    // =========================================================================
    // Fit box
    // =========================================================================

    #[test]
    fn fit_wider_source_matches_width() {
        assert_eq!(targets((800, 600), ResizeIntent::fit(400, 400).unwrap()), (400, 300));
    }

    #[test]
    fn fit_narrower_source_matches_height() {
        assert_eq!(targets((600, 800), ResizeIntent::fit(400, 400).unwrap()), (300, 400));
    }

    #[test]
    fn fit_same_aspect_takes_box() {
        assert_eq!(targets((800, 600), ResizeIntent::fit(400, 300).unwrap()), (400, 300));
    }

    #[test]
    fn fit_touches_box_and_keeps_aspect() {
        let originals = [(800, 600), (600, 800), (1920, 1080), (37, 911), (1000, 1)];
        let boxes = [(400, 400), (100, 300), (1024, 768), (5, 7), (3000, 2000)];
        for &(ow, oh) in &originals {
            for &(bw, bh) in &boxes {
                let (tw, th) = targets((ow, oh), ResizeIntent::fit(bw, bh).unwrap());
                assert!(tw == bw || th == bh, "{ow}x{oh} in {bw}x{bh} → {tw}x{th}");
                assert!(tw <= bw && th <= bh, "{ow}x{oh} in {bw}x{bh} → {tw}x{th}");
                // Off by at most one pixel from the exact proportional side
                if tw == bw {
                    let exact = oh as f64 * bw as f64 / ow as f64;
                    assert!((th as f64 - exact).abs() <= 1.0);
                } else {
                    let exact = ow as f64 * bh as f64 / oh as f64;
                    assert!((tw as f64 - exact).abs() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn skew_takes_box_verbatim() {
        let intent = ResizeIntent::fit(123, 456).unwrap().skew().unwrap();
        assert_eq!(targets((800, 600), intent), (123, 456));
        assert_eq!(targets((10, 1000), intent), (123, 456));
    }

    // =========================================================================
    // Fit box with crop
    // =========================================================================

    #[test]
    fn crop_center_trims_wider_source() {
        let intent = ResizeIntent::fit(400, 400)
            .unwrap()
            .crop(Gravity::Center)
            .unwrap();
        let p = plan((800, 600), &intent).unwrap();
        assert_eq!(
            p,
            SizePlan {
                origin_x: 100,
                origin_y: 0,
                source_width: 600,
                source_height: 600,
                target_width: 400,
                target_height: 400,
            }
        );
    }

    #[test]
    fn crop_center_trims_taller_source() {
        let intent = ResizeIntent::fit(400, 200)
            .unwrap()
            .crop(Gravity::Center)
            .unwrap();
        let p = plan((600, 800), &intent).unwrap();
        assert_eq!((p.origin_x, p.origin_y), (0, 250));
        assert_eq!((p.source_width, p.source_height), (600, 300));
        assert_eq!((p.target_width, p.target_height), (400, 200));
    }

    #[test]
    fn crop_gravity_moves_window() {
        let top_left = crop_source_rect((800, 600), (1, 1), Gravity::Percentage(0.0, 0.0));
        assert_eq!(top_left, (0, 0, 600, 600));
        let right = crop_source_rect((800, 600), (1, 1), Gravity::Percentage(1.0, 0.5));
        assert_eq!(right, (200, 0, 600, 600));
    }

    #[test]
    fn crop_same_aspect_is_full_source() {
        assert_eq!(
            crop_source_rect((800, 600), (400, 300), Gravity::Center),
            (0, 0, 800, 600)
        );
    }

    #[test]
    fn empty_original_rejected() {
        let intent = ResizeIntent::scale(0.5).unwrap();
        assert!(matches!(
            plan((0, 600), &intent),
            Err(Error::InvalidArgument(_))
        ));
    }

    // =========================================================================
    // Turns
    // =========================================================================

    #[test]
    fn negative_turns_wrap() {
        assert_eq!(normalize_turns(-1), 3);
        assert_eq!(normalize_turns(-2), 2);
        assert_eq!(normalize_turns(-3), 1);
        assert_eq!(normalize_turns(-4), 0);
        assert_eq!(normalize_turns(-5), 3);
    }

    #[test]
    fn positive_turns_pass_through_mod_four() {
        for steps in 0..4 {
            assert_eq!(normalize_turns(steps), steps as u8);
        }
        assert_eq!(normalize_turns(6), 2);
    }
}
