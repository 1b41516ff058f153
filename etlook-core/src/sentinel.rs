//! NaN-sentinel arithmetic.
//!
//! Remote-sensing grids routinely contain gaps (cloud masks, sensor
//! dropouts). The whole engine therefore treats NaN as "undefined at this
//! pixel": any formula receiving NaN produces NaN, and operations that
//! would leave the real domain (division by a vanishing denominator,
//! logarithm of a non-positive value) produce NaN instead of ±infinity or
//! a panic. These helpers centralise the guards.

use num::Float;

/// Denominators with an absolute value below this are treated as zero.
pub const DIV_EPS: f64 = 1e-12;

/// Division that yields NaN for a vanishing denominator.
#[inline]
pub fn nan_div(num: f64, den: f64) -> f64 {
    if den.abs() < DIV_EPS {
        f64::NAN
    } else {
        num / den
    }
}

/// Natural logarithm that yields NaN outside the positive domain.
///
/// `f64::ln` already returns NaN for negative arguments but -inf for zero;
/// the sentinel policy requires NaN there too.
#[inline]
pub fn nan_ln(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        f64::NAN
    }
}

/// Clamp into the unit interval, preserving NaN.
#[inline]
pub fn clamp_unit<F: Float>(x: F) -> F {
    if x.is_nan() {
        x
    } else {
        x.max(F::zero()).min(F::one())
    }
}

/// Clamp to a minimum, preserving NaN.
#[inline]
pub fn clamp_min<F: Float>(x: F, min: F) -> F {
    if x.is_nan() {
        x
    } else {
        x.max(min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_zero_is_nan() {
        assert!(nan_div(1.0, 0.0).is_nan());
        assert!(nan_div(0.0, 0.0).is_nan());
        assert!(nan_div(1.0, 1e-15).is_nan());
        assert_eq!(nan_div(1.0, 2.0), 0.5);
        assert_eq!(nan_div(1.0, -2.0), -0.5);
    }

    #[test]
    fn log_domain_is_guarded() {
        assert!(nan_ln(0.0).is_nan());
        assert!(nan_ln(-1.0).is_nan());
        assert!(nan_ln(f64::NAN).is_nan());
        assert_eq!(nan_ln(1.0), 0.0);
    }

    #[test]
    fn unit_clamp_preserves_nan() {
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.3), 0.3);
        assert!(clamp_unit(f64::NAN).is_nan());
    }

    #[test]
    fn min_clamp_preserves_nan() {
        assert_eq!(clamp_min(0.0, 0.01), 0.01);
        assert_eq!(clamp_min(0.5, 0.01), 0.5);
        assert!(clamp_min(f64::NAN, 0.01).is_nan());
    }
}
