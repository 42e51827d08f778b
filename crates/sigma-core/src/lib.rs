//! Sigma Core - fixed-point primitives for the sigma synth engine
//!
//! This crate provides the numeric foundation every synthesis stage builds on.
//! The audio path runs entirely in Q12.20 fixed point so that a sample tick
//! costs the same on a Cortex-M0+ without an FPU as it does on a desktop.
//!
//! # Core Abstractions
//!
//! ## Fixed Point
//!
//! - [`Fixed`] - Signed Q12.20 sample/level type
//! - [`int_to_fixed`], [`fixed_mul`], [`fixed_div`], [`fixed_add_sat`] - scaled-integer operators
//! - [`FIXED_MIN_LEVEL`], [`FIXED_MAX_LEVEL`], [`MAX_CLIPPING_LEVEL`] - signal bounds
//!
//! ## Constant Tables
//!
//! Built at compile time, never allocated:
//!
//! - [`SINE_TABLE`] - One cycle of sine, [`WAVE_TABLE_SIZE`] entries
//! - [`cents_to_ratio`] - Pitch offset in cents to a frequency ratio
//! - [`sine_lookup`] - Interpolated sine of a 32-bit phase
//! - [`FREQ_MULT_RATIO`] - Oscillator harmonic multipliers
//! - [`MIXER_INPUT_LEVEL`] - Non-linear mixer step gains
//!
//! ## Utilities
//!
//! - [`soft_limit`] - Rational soft-knee limiter that never exceeds its ceiling
//! - [`FixedDelayLine`] - Stack-allocated delay line for the reverb loop
//!
//! # Example
//!
//! ```rust
//! use sigma_core::{Fixed, fixed_mul, int_to_fixed, FIXED_PT_HALF};
//!
//! let two = int_to_fixed(2);
//! assert_eq!(fixed_mul(two, FIXED_PT_HALF), int_to_fixed(1));
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature for firmware builds:
//!
//! ```toml
//! [dependencies]
//! sigma-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod delay;
pub mod fixed;
pub mod math;
pub mod tables;

pub use delay::FixedDelayLine;
pub use fixed::{
    FIXED_MAX_LEVEL, FIXED_MIN_LEVEL, FIXED_ONE, FIXED_PT_HALF, FRAC_BITS, Fixed,
    MAX_CLIPPING_LEVEL, fixed_add_sat, fixed_div, fixed_from_f32, fixed_from_percent,
    fixed_from_ratio, fixed_mul, fixed_sub_sat, fixed_to_f32, fixed_to_int, from_i16_sample,
    int_to_fixed, to_dac_code, to_i16_sample,
};
pub use math::{fixed_lerp, midi_note_to_freq, soft_limit, square_law, wet_dry_mix};
pub use tables::{
    CENTS_PER_OCTAVE, FREQ_MULT_RATIO, MIXER_INPUT_LEVEL, MIXER_STEP_MAX, SINE_TABLE,
    WAVE_TABLE_BITS, WAVE_TABLE_SIZE, cents_to_ratio, cents_to_ratio_fine, sine_lookup,
};
