//! Numeric helpers centralizing clamping, rounding and safe casts.

use num_traits::cast::cast;

/// Clamp `value` into `[lower, upper]` as `max(lower, min(upper, value))`.
///
/// Non-finite input collapses to `lower` so a NaN can never leak into state.
#[must_use]
pub fn clamp_range(value: f64, lower: f64, upper: f64) -> f64 {
    if value.is_nan() {
        return lower;
    }
    lower.max(upper.min(value))
}

/// Round to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX).min(12));
    (value * factor).round() / factor
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Convert u32 to f64 in one place.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Treat negative, NaN or infinite readings as zero.
#[must_use]
pub fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_range_bounds_and_nan() {
        assert!((clamp_range(120.0, 0.0, 100.0) - 100.0).abs() < f64::EPSILON);
        assert!((clamp_range(-3.0, 0.0, 100.0) - 0.0).abs() < f64::EPSILON);
        assert!((clamp_range(f64::NAN, 0.8, 1.5) - 0.8).abs() < f64::EPSILON);
        assert!((clamp_range(42.5, 0.0, 100.0) - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn round_to_decimals() {
        assert!((round_to(1.23456, 2) - 1.23).abs() < 1e-12);
        assert!((round_to(2.675_01, 2) - 2.68).abs() < 1e-12);
        assert!((round_to(f64::INFINITY, 2) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn negative_readings_become_zero() {
        assert!((non_negative_or_zero(-1.0)).abs() < f64::EPSILON);
        assert!((non_negative_or_zero(f64::NAN)).abs() < f64::EPSILON);
        assert!((non_negative_or_zero(3.5) - 3.5).abs() < f64::EPSILON);
    }
}
