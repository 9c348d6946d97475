//! Floating point precision handling for linear records
//!
//! Physical values computed as `raw * factor + offset` are rounded to the
//! number of decimal places the factor can produce, so a factor of 0.1 never
//! yields values like 1.4000000000000001.

/// Most decimal places a factor may imply; finer factors are not rounded
pub const MAX_PRECISION: u8 = 9;

/// Determine appropriate decimal places from a linear factor
///
/// Returns `None` when the factor needs more than [`MAX_PRECISION`] places
/// or is not finite.
///
/// # Examples
/// - factor 1.0 → 0 decimal places
/// - factor 0.1 → 1 decimal place
/// - factor 0.25 → 2 decimal places
pub fn precision_from_factor(factor: f64) -> Option<u8> {
    let abs_factor = factor.abs();
    if !abs_factor.is_finite() {
        return None;
    }

    let mut scaled = abs_factor;
    for precision in 0..=MAX_PRECISION {
        let nearest = scaled.round();
        if nearest != 0.0 && (scaled - nearest).abs() < 1e-9 {
            return Some(precision);
        }
        scaled *= 10.0;
    }
    None
}

/// Round a value to the specified number of decimal places
pub fn round_to_precision(value: f64, precision: u8) -> f64 {
    if precision == 0 {
        value.round()
    } else {
        let scale = 10_f64.powi(precision as i32);
        (value * scale).round() / scale
    }
}

/// Round a value based on the factor (and offset) used to produce it
///
/// The value is returned unchanged when either needs more than
/// [`MAX_PRECISION`] decimal places.
pub fn round_for_factor(value: f64, factor: f64, offset: f64) -> f64 {
    let precision = if offset != 0.0 {
        precision_from_factor(factor).zip(precision_from_factor(offset)).map(|(f, o)| f.max(o))
    } else {
        precision_from_factor(factor)
    };
    match precision {
        Some(precision) => round_to_precision(value, precision),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_from_factor() {
        assert_eq!(precision_from_factor(1.0), Some(0));
        assert_eq!(precision_from_factor(10.0), Some(0));
        assert_eq!(precision_from_factor(0.5), Some(1));
        assert_eq!(precision_from_factor(0.1), Some(1));
        assert_eq!(precision_from_factor(0.25), Some(2));
        assert_eq!(precision_from_factor(1.5), Some(1));
        assert_eq!(precision_from_factor(-0.01), Some(2));
        assert_eq!(precision_from_factor(1e-7), Some(7));
        assert_eq!(precision_from_factor(1e-12), None);
        assert_eq!(precision_from_factor(f64::NAN), None);
    }

    #[test]
    fn test_round_for_factor() {
        assert_eq!(round_for_factor(140.0 * 0.01, 0.01, 0.0), 1.4);
        assert_eq!(round_for_factor(92.0000001, 1.0, -40.0), 92.0);
        assert_eq!(round_for_factor(1.45000001, 0.1, 0.0), 1.5);
        assert_eq!(round_for_factor(3.0 * 0.1 + 0.5, 0.1, 0.5), 0.8);
    }

    #[test]
    fn test_fine_factors_keep_value() {
        assert_eq!(round_for_factor(5.0 * 1e-7, 1e-7, 0.0), 5e-7);
        assert_eq!(round_for_factor(5.0 * 1e-12, 1e-12, 0.0), 5.0 * 1e-12);
        assert_eq!(round_for_factor(1.0 + 5e-12, 0.5, 1e-12), 1.0 + 5e-12);
    }
}
