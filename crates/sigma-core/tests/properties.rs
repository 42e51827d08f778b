//! Property-based tests for sigma-core fixed-point primitives.
//!
//! Checks operator accuracy across the documented input range, limiter
//! ceilings, and pitch-ratio monotonicity using proptest.

use proptest::prelude::*;
use sigma_core::{
    FIXED_MAX_LEVEL, Fixed, MAX_CLIPPING_LEVEL, cents_to_ratio, fixed_div, fixed_from_f32,
    fixed_lerp, fixed_mul, fixed_to_f32, soft_limit,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Products of operands in [-8, 8) match the real product to within a
    /// couple of ULPs and never wrap.
    #[test]
    fn mul_accurate_in_range(a in -8.0f64..8.0, b in -8.0f64..8.0) {
        let fa = fixed_from_f32(a as f32);
        let fb = fixed_from_f32(b as f32);
        let exact = f64::from(fixed_to_f32(fa)) * f64::from(fixed_to_f32(fb));
        let got = f64::from(fixed_to_f32(fixed_mul(fa, fb)));
        prop_assert!((got - exact).abs() < 1e-4, "{} * {} = {} (expected {})", a, b, got, exact);
    }

    /// Quotients with a divisor of magnitude >= 1/8 stay accurate.
    #[test]
    fn div_accurate_in_range(a in -8.0f64..8.0, b in 0.125f64..8.0, neg in any::<bool>()) {
        let b = if neg { -b } else { b };
        let fa = fixed_from_f32(a as f32);
        let fb = fixed_from_f32(b as f32);
        let exact = f64::from(fixed_to_f32(fa)) / f64::from(fixed_to_f32(fb));
        let got = f64::from(fixed_to_f32(fixed_div(fa, fb)));
        prop_assert!((got - exact).abs() < 1e-3, "{} / {} = {} (expected {})", a, b, got, exact);
    }

    /// The limiter output never reaches its ceiling and preserves sign.
    #[test]
    fn soft_limit_bounded(x in -2000.0f32..2000.0, knee_pc in 1i32..97) {
        let knee = Fixed::from_bits((1 << 20) / 100 * knee_pc);
        let input = fixed_from_f32(x);
        let y = soft_limit(input, knee, MAX_CLIPPING_LEVEL);
        prop_assert!(y.saturating_abs() <= MAX_CLIPPING_LEVEL);
        prop_assert!(y.saturating_abs() <= input.saturating_abs());
        prop_assert_eq!(y < Fixed::ZERO, input < Fixed::ZERO);
    }

    /// Higher pitch offsets never give a lower ratio.
    #[test]
    fn cents_ratio_monotonic(c in -7200i32..7200) {
        prop_assert!(cents_to_ratio(c) <= cents_to_ratio(c + 1));
    }

    /// Interpolation stays between its endpoints.
    #[test]
    fn lerp_bounded(step in 0u32..2000, steps in 1u32..2000) {
        let y = fixed_lerp(Fixed::ZERO, FIXED_MAX_LEVEL, step, steps);
        prop_assert!(y >= Fixed::ZERO && y <= FIXED_MAX_LEVEL);
    }
}
