//! Constant lookup tables, generated at compile time.
//!
//! Nothing here allocates or runs at startup: each table is a `static` or
//! `const` evaluated by the compiler, using short power series for `sin`
//! and `exp` so the firmware image carries only the finished integers.

use crate::fixed::{FRAC_BITS, Fixed, fixed_from_ratio};
use core::f64::consts::{LN_2, LN_10, PI};

/// Number of entries in one wave-table cycle.
pub const WAVE_TABLE_SIZE: usize = 2048;

/// `log2(WAVE_TABLE_SIZE)`: phase-accumulator bits used as the table index.
pub const WAVE_TABLE_BITS: u32 = 11;

/// Cents in one octave.
pub const CENTS_PER_OCTAVE: i32 = 1200;

/// Highest encoded mixer input step.
pub const MIXER_STEP_MAX: usize = 16;

/// One cycle of a sine wave as 16-bit PCM.
pub static SINE_TABLE: [i16; WAVE_TABLE_SIZE] = build_sine_table();

/// `2^(c/1200)` for `c` in `0..1200`, as [`Fixed`] bits.
static CENTS_RATIO: [i32; CENTS_PER_OCTAVE as usize] = build_cents_table();

/// Oscillator frequency multipliers, indexed by the patch's encoded
/// `OscFreqMult` value (0..=11).
pub const FREQ_MULT_RATIO: [Fixed; 12] = [
    fixed_from_ratio(1, 2),
    fixed_from_ratio(1, 1),
    fixed_from_ratio(4, 3),
    fixed_from_ratio(3, 2),
    fixed_from_ratio(2, 1),
    fixed_from_ratio(5, 2),
    fixed_from_ratio(3, 1),
    fixed_from_ratio(4, 1),
    fixed_from_ratio(5, 1),
    fixed_from_ratio(6, 1),
    fixed_from_ratio(7, 1),
    fixed_from_ratio(8, 1),
];

/// Mixer input gain per encoded step. Step 0 is off, step 16 is unity, and
/// each step in between is 3 dB below the next.
pub const MIXER_INPUT_LEVEL: [Fixed; MIXER_STEP_MAX + 1] = build_mixer_table();

/// Converts a pitch offset in cents to a frequency ratio.
///
/// Saturates at [`Fixed::MAX`] above +10 octaves and flushes to zero below
/// -30 octaves.
///
/// # Example
///
/// ```rust
/// use sigma_core::{cents_to_ratio, int_to_fixed};
///
/// assert_eq!(cents_to_ratio(1200), int_to_fixed(2));
/// assert_eq!(cents_to_ratio(0), int_to_fixed(1));
/// ```
#[inline]
pub fn cents_to_ratio(cents: i32) -> Fixed {
    let octaves = cents.div_euclid(CENTS_PER_OCTAVE);
    let bits = CENTS_RATIO[cents.rem_euclid(CENTS_PER_OCTAVE) as usize];

    if octaves > 10 {
        Fixed::MAX
    } else if octaves >= 0 {
        Fixed::from_bits(bits << octaves)
    } else if octaves <= -31 {
        Fixed::ZERO
    } else {
        Fixed::from_bits(bits >> -octaves)
    }
}

/// Fractional-cent variant of [`cents_to_ratio`], interpolating linearly
/// between neighbouring whole cents. Used for vibrato, where whole-cent steps
/// would be audible at shallow depths.
#[inline]
pub fn cents_to_ratio_fine(cents: Fixed) -> Fixed {
    let whole = cents.to_bits() >> FRAC_BITS;
    let frac = Fixed::from_bits(cents.to_bits() & ((1 << FRAC_BITS) - 1));
    let lo = cents_to_ratio(whole);
    let hi = cents_to_ratio(whole.saturating_add(1));
    lo.saturating_add((hi - lo).saturating_mul(frac))
}

/// Sine of a 32-bit phase (a full cycle spans the whole `u32` range),
/// linearly interpolated between [`SINE_TABLE`] entries.
///
/// # Example
///
/// ```rust
/// use sigma_core::{sine_lookup, Fixed};
///
/// assert_eq!(sine_lookup(0), Fixed::ZERO);
/// assert!(sine_lookup(u32::MAX / 4) > Fixed::from_num(0.999));
/// ```
#[inline]
pub fn sine_lookup(phase: u32) -> Fixed {
    const FRAC_SHIFT: u32 = 32 - WAVE_TABLE_BITS;
    let index = (phase >> FRAC_SHIFT) as usize;
    let frac = ((phase >> (FRAC_SHIFT - 16)) & 0xFFFF) as i32;
    let a = i32::from(SINE_TABLE[index]);
    let b = i32::from(SINE_TABLE[(index + 1) & (WAVE_TABLE_SIZE - 1)]);
    let sample = a + (((b - a) * frac) >> 16);
    Fixed::from_bits(sample << (FRAC_BITS - 15))
}

const fn build_sine_table() -> [i16; WAVE_TABLE_SIZE] {
    let mut table = [0i16; WAVE_TABLE_SIZE];
    let mut i = 0;
    while i < WAVE_TABLE_SIZE {
        let mut x = 2.0 * PI * (i as f64) / (WAVE_TABLE_SIZE as f64);
        if x > PI {
            x -= 2.0 * PI;
        }
        table[i] = round_to_i32(sin_series(x) * 32767.0) as i16;
        i += 1;
    }
    table
}

const fn build_cents_table() -> [i32; CENTS_PER_OCTAVE as usize] {
    let mut table = [0i32; CENTS_PER_OCTAVE as usize];
    let one = (1i64 << FRAC_BITS) as f64;
    let mut c = 0;
    while c < CENTS_PER_OCTAVE as usize {
        let exponent = (c as f64) / (CENTS_PER_OCTAVE as f64) * LN_2;
        table[c] = round_to_i32(exp_series(exponent) * one);
        c += 1;
    }
    table
}

const fn build_mixer_table() -> [Fixed; MIXER_STEP_MAX + 1] {
    let mut table = [Fixed::ZERO; MIXER_STEP_MAX + 1];
    let one = (1i64 << FRAC_BITS) as f64;
    let db_step = -3.0 / 20.0 * LN_10;
    let mut step = 1;
    while step <= MIXER_STEP_MAX {
        let exponent = ((MIXER_STEP_MAX - step) as f64) * db_step;
        table[step] = Fixed::from_bits(round_to_i32(exp_series(exponent) * one));
        step += 1;
    }
    table
}

/// Taylor series for `sin(x)`, accurate to ~1e-9 on `[-pi, pi]`.
const fn sin_series(x: f64) -> f64 {
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    let mut n = 1;
    while n < 14 {
        let k = (2 * n) as f64;
        term = -term * x2 / (k * (k + 1.0));
        sum += term;
        n += 1;
    }
    sum
}

/// Taylor series for `exp(x)`, accurate for `|x| < 8`.
const fn exp_series(x: f64) -> f64 {
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut n = 1;
    while n < 48 {
        term = term * x / (n as f64);
        sum += term;
        n += 1;
    }
    sum
}

const fn round_to_i32(value: f64) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}
