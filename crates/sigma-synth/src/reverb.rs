//! Single feedback-comb reverb.
//!
//! A recirculating delay loop whose gain gives a 60 dB decay over
//! [`REVERB_DECAY_TIME_MS`]. The loop length is fixed at construction and
//! the line is an inline array, so processing never allocates.

use sigma_core::{Fixed, FixedDelayLine, fixed_from_f32, fixed_from_percent, fixed_mul, wet_dry_mix};

/// Capacity of the reverb delay line, in samples.
pub const REVERB_DELAY_MAX_SIZE: usize = 2000;

/// Nominal loop time.
pub const REVERB_LOOP_TIME_MS: u32 = 40;

/// Time for the tail to fall by 60 dB.
pub const REVERB_DECAY_TIME_MS: u32 = 1500;

/// Attenuation applied to the signal entering the loop.
pub const REVERB_ATTENUATION_PC: u16 = 70;

/// Feedback comb reverb with wet/dry mix.
///
/// # Example
///
/// ```rust
/// use sigma_synth::Reverb;
/// use sigma_core::{Fixed, FIXED_PT_HALF};
///
/// let mut reverb = Reverb::new(32_000);
/// reverb.set_mix_pc(100);
/// reverb.process(FIXED_PT_HALF);
/// // Fully wet: nothing comes out until the loop has gone round once
/// assert_eq!(reverb.process(Fixed::ZERO), Fixed::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    line: FixedDelayLine<REVERB_DELAY_MAX_SIZE>,
    loop_samples: usize,
    feedback: Fixed,
    input_gain: Fixed,
    mix: Fixed,
}

impl Reverb {
    /// Creates a silent reverb for `sample_rate`, fully dry.
    pub fn new(sample_rate: u32) -> Self {
        let rate = u64::from(sample_rate.max(1));
        let loop_samples = usize::try_from(rate * u64::from(REVERB_LOOP_TIME_MS) / 1000)
            .unwrap_or(REVERB_DELAY_MAX_SIZE)
            .clamp(1, REVERB_DELAY_MAX_SIZE);
        let decay_samples = (rate * u64::from(REVERB_DECAY_TIME_MS) / 1000).max(1) as f32;
        let feedback = libm::powf(10.0, -3.0 * loop_samples as f32 / decay_samples);

        Self {
            line: FixedDelayLine::new(),
            loop_samples,
            feedback: fixed_from_f32(feedback),
            input_gain: fixed_from_percent(100 - REVERB_ATTENUATION_PC),
            mix: Fixed::ZERO,
        }
    }

    /// Sets the wet/dry mix in percent.
    pub fn set_mix_pc(&mut self, percent: u8) {
        self.mix = fixed_from_percent(u16::from(percent.min(100)));
    }

    /// Loop length in samples.
    pub fn loop_samples(&self) -> usize {
        self.loop_samples
    }

    /// Loop gain per pass.
    pub fn feedback(&self) -> Fixed {
        self.feedback
    }

    /// Silences the tail.
    pub fn clear(&mut self) {
        self.line.clear();
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: Fixed) -> Fixed {
        if self.mix == Fixed::ZERO {
            return input;
        }
        let wet = self.line.read(self.loop_samples - 1);
        let recirculated =
            fixed_mul(input, self.input_gain).saturating_add(fixed_mul(wet, self.feedback));
        self.line.write(recirculated);
        wet_dry_mix(input, wet, self.mix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::{FIXED_ONE, FIXED_PT_HALF, fixed_to_f32};

    #[test]
    fn test_loop_length_capped() {
        assert_eq!(Reverb::new(32_000).loop_samples(), 1280);
        assert_eq!(Reverb::new(96_000).loop_samples(), REVERB_DELAY_MAX_SIZE);
    }

    #[test]
    fn test_extreme_rates() {
        let fast = Reverb::new(u32::MAX);
        assert_eq!(fast.loop_samples(), REVERB_DELAY_MAX_SIZE);
        assert!(fast.feedback() > Fixed::ZERO && fast.feedback() <= FIXED_ONE);

        let slow = Reverb::new(0);
        assert_eq!(slow.loop_samples(), 1);
        assert!(slow.feedback() >= Fixed::ZERO && slow.feedback() < FIXED_ONE);
    }

    #[test]
    fn test_feedback_gives_60db_decay() {
        let reverb = Reverb::new(32_000);
        let passes = (32_000.0 * 1.5) / reverb.loop_samples() as f32;
        let total = libm::powf(fixed_to_f32(reverb.feedback()), passes);
        assert!((total - 0.001).abs() < 0.0002, "decay {total}");
    }

    #[test]
    fn test_dry_passes_through() {
        let mut reverb = Reverb::new(32_000);
        reverb.set_mix_pc(0);
        assert_eq!(reverb.process(FIXED_PT_HALF), FIXED_PT_HALF);
    }

    #[test]
    fn test_impulse_returns_after_loop() {
        let mut reverb = Reverb::new(32_000);
        reverb.set_mix_pc(100);
        let loop_len = reverb.loop_samples();

        assert_eq!(reverb.process(FIXED_PT_HALF), Fixed::ZERO);
        for _ in 1..loop_len {
            assert_eq!(reverb.process(Fixed::ZERO), Fixed::ZERO);
        }
        let echo = reverb.process(Fixed::ZERO);
        let expected = fixed_mul(FIXED_PT_HALF, fixed_from_percent(30));
        assert_eq!(echo, expected);
    }

    #[test]
    fn test_clear_silences_tail() {
        let mut reverb = Reverb::new(32_000);
        reverb.set_mix_pc(100);
        for _ in 0..100 {
            reverb.process(FIXED_PT_HALF);
        }
        reverb.clear();
        for _ in 0..3000 {
            assert_eq!(reverb.process(Fixed::ZERO), Fixed::ZERO);
        }
    }
}
