//! Q12.20 fixed-point arithmetic.
//!
//! Every level, gain and sample on the audio path is a [`Fixed`]: a signed
//! 32-bit integer with 20 fractional bits, giving a range of `[-2048, 2048)`
//! and a resolution of about 0.95 ppm. Normalized audio lives in `[-1, 1)`.
//!
//! Products and quotients are computed in a widened intermediate by the
//! `fixed` crate, so operands anywhere in `[-8, 8)` never overflow. Where a
//! result can leave the representable range the helpers here saturate
//! instead of wrapping.

/// Signed 32-bit fixed-point number with 20 fractional bits.
pub type Fixed = fixed::types::I12F20;

/// Number of fractional bits in [`Fixed`].
pub const FRAC_BITS: u32 = 20;

const ONE_BITS: i32 = 1 << FRAC_BITS;

/// Largest integer representable by [`Fixed`].
const INT_MAX: i32 = i32::MAX >> FRAC_BITS;

/// Smallest integer representable by [`Fixed`].
const INT_MIN: i32 = i32::MIN >> FRAC_BITS;

/// Exactly 1.0.
pub const FIXED_ONE: Fixed = Fixed::from_bits(ONE_BITS);

/// Smallest non-zero magnitude (one ULP, about 0.000001).
pub const FIXED_MIN_LEVEL: Fixed = Fixed::from_bits(1);

/// Full-scale normalized level, one ULP below 1.0.
pub const FIXED_MAX_LEVEL: Fixed = Fixed::from_bits(ONE_BITS - 1);

/// Exactly 0.5.
pub const FIXED_PT_HALF: Fixed = Fixed::from_bits(ONE_BITS / 2);

/// Output ceiling (0.97). No sample leaves the engine above this magnitude.
pub const MAX_CLIPPING_LEVEL: Fixed = Fixed::from_bits((ONE_BITS as i64 * 97 / 100) as i32);

/// Converts an integer to fixed point, saturating outside `[-2048, 2047]`.
#[inline]
pub const fn int_to_fixed(value: i32) -> Fixed {
    let clamped = if value > INT_MAX {
        INT_MAX
    } else if value < INT_MIN {
        INT_MIN
    } else {
        value
    };
    Fixed::from_bits(clamped << FRAC_BITS)
}

/// Integer part of a fixed-point value, rounded toward negative infinity.
#[inline]
pub const fn fixed_to_int(value: Fixed) -> i32 {
    value.to_bits() >> FRAC_BITS
}

/// Saturating fixed-point multiply.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    a.saturating_mul(b)
}

/// Saturating fixed-point divide.
///
/// Division by zero saturates toward the sign of the dividend; `0 / 0` is 0.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == Fixed::ZERO {
        if a > Fixed::ZERO {
            Fixed::MAX
        } else if a < Fixed::ZERO {
            Fixed::MIN
        } else {
            Fixed::ZERO
        }
    } else {
        a.saturating_div(b)
    }
}

/// Saturating add.
#[inline]
pub fn fixed_add_sat(a: Fixed, b: Fixed) -> Fixed {
    a.saturating_add(b)
}

/// Saturating subtract.
#[inline]
pub fn fixed_sub_sat(a: Fixed, b: Fixed) -> Fixed {
    a.saturating_sub(b)
}

/// Converts a percentage (`100` = full scale) to a level.
///
/// 100 % maps to exactly 1.0; callers that need a strictly sub-unity level
/// clamp against [`FIXED_MAX_LEVEL`].
#[inline]
pub const fn fixed_from_percent(percent: u16) -> Fixed {
    fixed_from_ratio(percent as i32, 100)
}

/// Converts `num / den` to fixed point with saturation. A zero denominator
/// yields zero.
#[inline]
pub const fn fixed_from_ratio(num: i32, den: i32) -> Fixed {
    if den == 0 {
        return Fixed::ZERO;
    }
    let bits = ((num as i64) << FRAC_BITS) / den as i64;
    Fixed::from_bits(saturate_bits(bits))
}

/// Converts from `f32`, saturating. For table setup and tooling only.
#[inline]
pub fn fixed_from_f32(value: f32) -> Fixed {
    Fixed::saturating_from_num(value)
}

/// Converts to `f32`. For tooling and tests only.
#[inline]
pub fn fixed_to_f32(value: Fixed) -> f32 {
    value.to_num::<f32>()
}

/// Converts a 16-bit PCM sample (`i16::MIN` = -1.0) to fixed point.
#[inline]
pub const fn from_i16_sample(sample: i16) -> Fixed {
    Fixed::from_bits((sample as i32) << (FRAC_BITS - 15))
}

/// Converts a normalized sample to 16-bit PCM, clamping to the `i16` range.
#[inline]
pub const fn to_i16_sample(value: Fixed) -> i16 {
    let pcm = value.to_bits() >> (FRAC_BITS - 15);
    if pcm > i16::MAX as i32 {
        i16::MAX
    } else if pcm < i16::MIN as i32 {
        i16::MIN
    } else {
        pcm as i16
    }
}

/// Converts a normalized sample to an offset-binary DAC code of `bits` width
/// (1..=16). `-1.0` maps to 0, `0.0` to mid-scale.
#[inline]
pub const fn to_dac_code(value: Fixed, bits: u32) -> u16 {
    let full_scale = (1i64 << bits) - 1;
    let unipolar = value.to_bits() as i64 + ONE_BITS as i64;
    let code = (unipolar << bits) >> (FRAC_BITS + 1);
    if code < 0 {
        0
    } else if code > full_scale {
        full_scale as u16
    } else {
        code as u16
    }
}

#[inline]
const fn saturate_bits(bits: i64) -> i32 {
    if bits > i32::MAX as i64 {
        i32::MAX
    } else if bits < i32::MIN as i64 {
        i32::MIN
    } else {
        bits as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_round_trip() {
        for i in [-2048, -8, -1, 0, 1, 7, 2047] {
            assert_eq!(fixed_to_int(int_to_fixed(i)), i);
        }
    }

    #[test]
    fn test_int_to_fixed_saturates() {
        assert_eq!(fixed_to_int(int_to_fixed(5000)), 2047);
        assert_eq!(fixed_to_int(int_to_fixed(-5000)), -2048);
    }

    #[test]
    fn test_level_constants() {
        assert_eq!(FIXED_MIN_LEVEL.to_bits(), 1);
        assert!(FIXED_MAX_LEVEL < FIXED_ONE);
        assert_eq!(FIXED_MAX_LEVEL + FIXED_MIN_LEVEL, FIXED_ONE);
        assert_eq!(FIXED_PT_HALF + FIXED_PT_HALF, FIXED_ONE);
        let clip = fixed_to_f32(MAX_CLIPPING_LEVEL);
        assert!((clip - 0.97).abs() < 1e-5, "clip level {clip}");
    }

    #[test]
    fn test_mul_and_div() {
        let a = fixed_from_f32(-7.5);
        let b = fixed_from_f32(7.25);
        let p = fixed_to_f32(fixed_mul(a, b));
        assert!((p + 54.375).abs() < 1e-4, "product {p}");

        let q = fixed_to_f32(fixed_div(int_to_fixed(3), int_to_fixed(4)));
        assert!((q - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_div_by_zero_saturates() {
        assert_eq!(fixed_div(FIXED_ONE, Fixed::ZERO), Fixed::MAX);
        assert_eq!(fixed_div(-FIXED_ONE, Fixed::ZERO), Fixed::MIN);
        assert_eq!(fixed_div(Fixed::ZERO, Fixed::ZERO), Fixed::ZERO);
    }

    #[test]
    fn test_saturating_add() {
        assert_eq!(fixed_add_sat(Fixed::MAX, FIXED_ONE), Fixed::MAX);
        assert_eq!(fixed_sub_sat(Fixed::MIN, FIXED_ONE), Fixed::MIN);
    }

    #[test]
    fn test_percent() {
        assert_eq!(fixed_from_percent(100), FIXED_ONE);
        assert_eq!(fixed_from_percent(50), FIXED_PT_HALF);
        assert_eq!(fixed_from_percent(0), Fixed::ZERO);
    }

    #[test]
    fn test_i16_conversion() {
        assert_eq!(from_i16_sample(i16::MIN), -FIXED_ONE);
        assert_eq!(to_i16_sample(FIXED_PT_HALF), 16384);
        assert_eq!(to_i16_sample(int_to_fixed(3)), i16::MAX);
        assert_eq!(to_i16_sample(int_to_fixed(-3)), i16::MIN);
    }

    #[test]
    fn test_dac_code() {
        assert_eq!(to_dac_code(Fixed::ZERO, 12), 2048);
        assert_eq!(to_dac_code(-FIXED_ONE, 12), 0);
        assert_eq!(to_dac_code(FIXED_MAX_LEVEL, 12), 4095);
        assert_eq!(to_dac_code(int_to_fixed(2), 12), 4095);
        assert_eq!(to_dac_code(Fixed::ZERO, 10), 512);
    }
}
