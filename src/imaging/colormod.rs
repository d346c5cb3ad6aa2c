//! Color adjustments and the `colormod(...)` filter language.
//!
//! The facade exposes brightness, contrast and gamma as typed operations and
//! only renders them to text at the engine boundary:
//!
//! ```text
//! colormod(brightness=0.2);
//! colormod(contrast=1.5);colormod(gamma=2.2);
//! ```
//!
//! [`RustEngine`](super::RustEngine) parses these expressions back with
//! [`parse_expression`] and applies each adjustment as a per-channel lookup
//! table. Alpha is never modified.

use super::backend::EngineError;

/// A single per-channel color adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorAdjustment {
    /// Additive shift, as a fraction of full range.
    Brightness(f64),
    /// Scale around mid-gray; `1.0` is identity.
    Contrast(f64),
    /// Power curve `v^(1/gamma)`; `1.0` is identity.
    Gamma(f64),
}

impl ColorAdjustment {
    fn key(&self) -> &'static str {
        match self {
            ColorAdjustment::Brightness(_) => "brightness",
            ColorAdjustment::Contrast(_) => "contrast",
            ColorAdjustment::Gamma(_) => "gamma",
        }
    }

    fn value(&self) -> f64 {
        match *self {
            ColorAdjustment::Brightness(v)
            | ColorAdjustment::Contrast(v)
            | ColorAdjustment::Gamma(v) => v,
        }
    }

    /// Render as a filter expression, e.g. `colormod(brightness=0.5);`.
    pub fn to_expression(&self) -> String {
        format!("colormod({}={:?});", self.key(), self.value())
    }

    /// Map one 8-bit channel value.
    pub fn map(&self, channel: u8) -> u8 {
        let v = channel as f64;
        let out = match *self {
            ColorAdjustment::Brightness(b) => v + b * 256.0,
            ColorAdjustment::Contrast(c) => (v - 127.0) * c + 127.0,
            ColorAdjustment::Gamma(g) => (v / 255.0).powf(1.0 / g) * 255.0,
        };
        // NaN saturates to 0
        out.round().clamp(0.0, 255.0) as u8
    }
}

/// Compose a lookup table applying `adjustments` in order.
pub fn lookup_table(adjustments: &[ColorAdjustment]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = adjustments
            .iter()
            .fold(i as u8, |v, adjustment| adjustment.map(v));
    }
    lut
}

/// Parse a filter expression into its adjustments.
///
/// Statements are `;`-separated; only `colormod` is understood. A `colormod`
/// statement may set several keys: `colormod(brightness=0.1,gamma=1.2);`.
pub fn parse_expression(expression: &str) -> Result<Vec<ColorAdjustment>, EngineError> {
    let mut adjustments = Vec::new();

    for statement in expression.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let args = statement
            .strip_prefix("colormod(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| EngineError::Filter(format!("unknown filter statement {statement:?}")))?;

        for arg in args.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| EngineError::Filter(format!("expected key=value, got {arg:?}")))?;
            let value: f64 = value.trim().parse().map_err(|_| {
                EngineError::Filter(format!("invalid number {value:?} for {}", key.trim()))
            })?;
            let adjustment = match key.trim() {
                "brightness" => ColorAdjustment::Brightness(value),
                "contrast" => ColorAdjustment::Contrast(value),
                "gamma" => ColorAdjustment::Gamma(value),
                other => {
                    return Err(EngineError::Filter(format!(
                        "unknown colormod key {other:?}"
                    )));
                }
            };
            adjustments.push(adjustment);
        }
    }

    Ok(adjustments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_render_as_floats() {
        assert_eq!(
            ColorAdjustment::Brightness(1.0).to_expression(),
            "colormod(brightness=1.0);"
        );
        assert_eq!(
            ColorAdjustment::Contrast(0.5).to_expression(),
            "colormod(contrast=0.5);"
        );
        assert_eq!(
            ColorAdjustment::Gamma(2.2).to_expression(),
            "colormod(gamma=2.2);"
        );
    }

    #[test]
    fn rendered_expression_parses_back() {
        let adjustment = ColorAdjustment::Brightness(-0.25);
        let parsed = parse_expression(&adjustment.to_expression()).unwrap();
        assert_eq!(parsed, vec![adjustment]);
    }

    #[test]
    fn parses_multiple_statements_and_keys() {
        let parsed =
            parse_expression("colormod(brightness=0.1, gamma=1.2); colormod(contrast=2);")
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                ColorAdjustment::Brightness(0.1),
                ColorAdjustment::Gamma(1.2),
                ColorAdjustment::Contrast(2.0),
            ]
        );
    }

    #[test]
    fn rejects_unknown_statements_and_keys() {
        assert!(matches!(
            parse_expression("bump_map(map=x);"),
            Err(EngineError::Filter(_))
        ));
        assert!(parse_expression("colormod(saturation=1);").is_err());
        assert!(parse_expression("colormod(brightness=lots);").is_err());
        assert!(parse_expression("colormod(brightness);").is_err());
    }

    #[test]
    fn empty_expression_is_no_op() {
        assert!(parse_expression("").unwrap().is_empty());
        assert!(parse_expression(" ; ;").unwrap().is_empty());
    }

    #[test]
    fn identity_adjustments_leave_values() {
        let lut = lookup_table(&[
            ColorAdjustment::Brightness(0.0),
            ColorAdjustment::Contrast(1.0),
            ColorAdjustment::Gamma(1.0),
        ]);
        for (i, v) in lut.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn brightness_saturates() {
        assert_eq!(ColorAdjustment::Brightness(1.0).map(0), 255);
        assert_eq!(ColorAdjustment::Brightness(-1.0).map(255), 0);
        assert_eq!(ColorAdjustment::Brightness(0.5).map(10), 138);
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        assert_eq!(ColorAdjustment::Contrast(0.0).map(0), 127);
        assert_eq!(ColorAdjustment::Contrast(0.0).map(255), 127);
        assert_eq!(ColorAdjustment::Contrast(2.0).map(127), 127);
        assert_eq!(ColorAdjustment::Contrast(2.0).map(200), 255);
    }

    #[test]
    fn degenerate_gamma_does_not_panic() {
        // gamma 0 → exponent infinity
        assert_eq!(ColorAdjustment::Gamma(0.0).map(128), 0);
        assert_eq!(ColorAdjustment::Gamma(0.0).map(255), 255);
        let _ = ColorAdjustment::Gamma(-1.0).map(0);
    }
}
