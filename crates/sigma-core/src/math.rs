//! Fixed-point signal helpers.

use crate::fixed::{FRAC_BITS, Fixed};
use libm::powf;

/// Soft-knee limiter.
///
/// Passes `x` unchanged while `|x| <= knee`. Above the knee the excess is
/// compressed along `knee + h·e / (e + h)` where `h = ceiling - knee`, which
/// has unit slope at the knee and approaches `ceiling` asymptotically, so the
/// output magnitude is always strictly below `ceiling` (or equal to `knee`
/// when the two coincide).
///
/// # Example
///
/// ```rust
/// use sigma_core::{soft_limit, int_to_fixed, fixed_from_ratio, MAX_CLIPPING_LEVEL};
///
/// let knee = fixed_from_ratio(9, 10);
/// let y = soft_limit(int_to_fixed(4), knee, MAX_CLIPPING_LEVEL);
/// assert!(y < MAX_CLIPPING_LEVEL);
/// ```
#[inline]
pub fn soft_limit(x: Fixed, knee: Fixed, ceiling: Fixed) -> Fixed {
    let knee = knee.max(Fixed::ZERO).min(ceiling);
    let magnitude = x.saturating_abs();
    if magnitude <= knee {
        return x;
    }

    let headroom = i64::from((ceiling - knee).to_bits());
    let excess = i64::from(magnitude.to_bits()) - i64::from(knee.to_bits());
    let compressed = knee.to_bits() + (headroom * excess / (excess + headroom.max(1))) as i32;
    let limited = Fixed::from_bits(compressed);

    if x < Fixed::ZERO { -limited } else { limited }
}

/// Crossfade between dry and wet signals; `mix` = 0 is fully dry, 1 fully wet.
#[inline]
pub fn wet_dry_mix(dry: Fixed, wet: Fixed, mix: Fixed) -> Fixed {
    dry.saturating_add(wet.saturating_sub(dry).saturating_mul(mix))
}

/// Linear interpolation `from + (to - from) · step / steps`.
///
/// Exact at both ends: `step == 0` yields `from`, `step >= steps` yields `to`.
#[inline]
pub fn fixed_lerp(from: Fixed, to: Fixed, step: u32, steps: u32) -> Fixed {
    if step >= steps {
        return to;
    }
    let span = i64::from(to.to_bits()) - i64::from(from.to_bits());
    let offset = span * i64::from(step) / i64::from(steps);
    Fixed::from_bits((i64::from(from.to_bits()) + offset) as i32)
}

/// Frequency in Hz of a MIDI note number (A4 = note 69 = 440 Hz).
///
/// Floating point: for note-on handling on the control path, never per sample.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Squares a normalized level, giving an "exponential" response curve for
/// velocity and expression.
#[inline]
pub fn square_law(level: Fixed) -> Fixed {
    let bits = i64::from(level.to_bits());
    Fixed::from_bits(((bits * bits) >> FRAC_BITS) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{
        FIXED_ONE, FIXED_PT_HALF, MAX_CLIPPING_LEVEL, fixed_from_f32, fixed_from_ratio,
        fixed_to_f32, int_to_fixed,
    };

    #[test]
    fn test_soft_limit_passes_below_knee() {
        let knee = fixed_from_ratio(8, 10);
        let x = fixed_from_ratio(7, 10);
        assert_eq!(soft_limit(x, knee, MAX_CLIPPING_LEVEL), x);
        assert_eq!(soft_limit(-x, knee, MAX_CLIPPING_LEVEL), -x);
    }

    #[test]
    fn test_soft_limit_never_reaches_ceiling() {
        let knee = fixed_from_ratio(9, 10);
        for x in [0.95f32, 1.0, 2.0, 8.0, 2000.0] {
            let y = soft_limit(fixed_from_f32(x), knee, MAX_CLIPPING_LEVEL);
            assert!(y < MAX_CLIPPING_LEVEL, "x={x} y={}", fixed_to_f32(y));
            assert!(y > knee);
            let yn = soft_limit(fixed_from_f32(-x), knee, MAX_CLIPPING_LEVEL);
            assert_eq!(yn, -y);
        }
    }

    #[test]
    fn test_soft_limit_is_monotonic() {
        let knee = FIXED_PT_HALF;
        let mut prev = Fixed::ZERO;
        for i in 0..400 {
            let y = soft_limit(fixed_from_ratio(i, 100), knee, MAX_CLIPPING_LEVEL);
            assert!(y >= prev);
            prev = y;
        }
    }

    #[test]
    fn test_soft_limit_knee_at_ceiling_is_hard() {
        let y = soft_limit(int_to_fixed(3), MAX_CLIPPING_LEVEL, MAX_CLIPPING_LEVEL);
        assert_eq!(y, MAX_CLIPPING_LEVEL);
    }

    #[test]
    fn test_wet_dry_mix() {
        let dry = FIXED_ONE;
        let wet = Fixed::ZERO;
        assert_eq!(wet_dry_mix(dry, wet, Fixed::ZERO), dry);
        assert_eq!(wet_dry_mix(dry, wet, FIXED_ONE), wet);
        assert_eq!(wet_dry_mix(dry, wet, FIXED_PT_HALF), FIXED_PT_HALF);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = fixed_from_ratio(1, 4);
        let b = fixed_from_ratio(3, 4);
        assert_eq!(fixed_lerp(a, b, 0, 100), a);
        assert_eq!(fixed_lerp(a, b, 50, 100), FIXED_PT_HALF);
        assert_eq!(fixed_lerp(a, b, 100, 100), b);
        assert_eq!(fixed_lerp(b, a, 100, 100), a);
        assert_eq!(fixed_lerp(a, b, 0, 0), b);
    }

    #[test]
    fn test_midi_note_to_freq() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(60) - 261.6256).abs() < 1e-2);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn test_square_law() {
        assert_eq!(square_law(FIXED_PT_HALF), fixed_from_ratio(1, 4));
        assert_eq!(square_law(FIXED_ONE), FIXED_ONE);
        assert_eq!(square_law(Fixed::ZERO), Fixed::ZERO);
    }
}
