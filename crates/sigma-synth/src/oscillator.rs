//! Six-slot sine oscillator bank with per-slot amplitude modulation routing.

use sigma_config::{OSC_COUNT, OscModSource, PatchParams};
use sigma_core::{
    FIXED_MAX_LEVEL, FIXED_ONE, FRAC_BITS, Fixed, cents_to_ratio, fixed_mul, sine_lookup,
};

/// Highest oscillator frequency at the reference sample rate; anything above
/// it is muted.
pub const MAX_OSC_FREQ_HZ: u32 = 12_000;

/// Converts a frequency to a 32-bit phase increment at `sample_rate`.
///
/// Floating point, for the control path only.
pub fn hz_to_phase_step(hz: f32, sample_rate: u32) -> u32 {
    let cycles_per_tick = hz.max(0.0) / sample_rate.max(1) as f32;
    // `as` saturates, so anything at or above Nyquist*2 pins to u32::MAX
    libm::roundf(cycles_per_tick * 4_294_967_296.0) as u32
}

/// Highest usable oscillator frequency at `sample_rate`: 12 kHz, or 0.375 of
/// the rate when that is lower.
pub const fn max_osc_freq_hz(sample_rate: u32) -> u32 {
    let scaled = sample_rate / 8 * 3;
    if scaled < MAX_OSC_FREQ_HZ {
        scaled
    } else {
        MAX_OSC_FREQ_HZ
    }
}

/// Control signals an oscillator's amplitude can follow, sampled once per
/// tick. All levels are normalized to `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModulationInputs {
    /// Contour generator level.
    pub contour: Fixed,
    /// Transient generator (ENV2) level.
    pub env2: Fixed,
    /// Modulation wheel.
    pub modulation: Fixed,
    /// Expression after its response curve.
    pub expression: Fixed,
    /// Note-on velocity after its response curve.
    pub velocity: Fixed,
    /// Unipolar LFO output.
    pub lfo: Fixed,
    /// LFO AM depth.
    pub lfo_am_depth: Fixed,
}

impl Default for ModulationInputs {
    fn default() -> Self {
        Self {
            contour: Fixed::ZERO,
            env2: Fixed::ZERO,
            modulation: Fixed::ZERO,
            expression: FIXED_MAX_LEVEL,
            velocity: FIXED_MAX_LEVEL,
            lfo: Fixed::ZERO,
            lfo_am_depth: Fixed::ZERO,
        }
    }
}

/// Resolves an amplitude modulation source to a level in `[0, 1)`.
#[inline]
pub fn resolve_mod_source(source: OscModSource, inputs: &ModulationInputs) -> Fixed {
    let invert = |level: Fixed| (FIXED_MAX_LEVEL - level).max(Fixed::ZERO);
    match source {
        OscModSource::None => FIXED_MAX_LEVEL,
        OscModSource::ContourPos => inputs.contour,
        OscModSource::ContourNeg => invert(inputs.contour),
        OscModSource::Env2 => inputs.env2,
        OscModSource::Modulation => inputs.modulation,
        OscModSource::ExpressionPos => inputs.expression,
        OscModSource::ExpressionNeg => invert(inputs.expression),
        OscModSource::Lfo => {
            let dip = fixed_mul(inputs.lfo_am_depth, inputs.lfo);
            (FIXED_ONE - dip).clamp(Fixed::ZERO, FIXED_MAX_LEVEL)
        }
        OscModSource::VelocityPos => inputs.velocity,
        OscModSource::VelocityNeg => invert(inputs.velocity),
    }
}

/// Bank of [`OSC_COUNT`] table-lookup sine oscillators.
///
/// Each slot keeps a 32-bit phase accumulator and a base phase step that
/// already folds in note frequency, harmonic multiplier, detune, pitch bend
/// and fine tuning. The per-tick step is the base step times the LFO
/// frequency-modulation factor.
#[derive(Debug, Clone)]
pub struct OscillatorBank {
    phase: [u32; OSC_COUNT],
    base_step: [u32; OSC_COUNT],
    muted: [bool; OSC_COUNT],
    max_step: u64,
}

impl OscillatorBank {
    /// Creates a silent bank for `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        let max_hz = max_osc_freq_hz(sample_rate);
        Self {
            phase: [0; OSC_COUNT],
            base_step: [0; OSC_COUNT],
            muted: [true; OSC_COUNT],
            max_step: u64::from(hz_to_phase_step(max_hz as f32, sample_rate)),
        }
    }

    /// Recomputes every slot's base step.
    ///
    /// `note_step` is the phase step of the played note; `pitch_offset_cents`
    /// is added to each slot's own detune (pitch bend plus fine tuning).
    pub fn set_pitch(&mut self, note_step: u32, patch: &PatchParams, pitch_offset_cents: i32) {
        for osc in 0..OSC_COUNT {
            let cents = i32::from(patch.osc_detune[osc]) + pitch_offset_cents;
            let ratio = fixed_mul(patch.osc_freq_mult[osc].ratio(), cents_to_ratio(cents));
            let step = (u64::from(note_step) * ratio.to_bits().max(0) as u64) >> FRAC_BITS;
            self.muted[osc] = step > self.max_step || note_step == 0;
            self.base_step[osc] = if self.muted[osc] { 0 } else { step as u32 };
        }
    }

    /// Base phase step of one slot (zero when muted).
    pub fn base_step(&self, osc: usize) -> u32 {
        self.base_step[osc]
    }

    /// True when the slot is muted for exceeding the frequency ceiling.
    pub fn is_muted(&self, osc: usize) -> bool {
        self.muted[osc]
    }

    /// Restarts every slot at phase zero.
    pub fn reset_phases(&mut self) {
        self.phase = [0; OSC_COUNT];
    }

    /// Advances every slot one tick.
    ///
    /// `fm_factor` multiplies each base step (1.0 = no vibrato); `amplitude`
    /// scales each slot's sine. Muted slots output zero.
    #[inline]
    pub fn advance(
        &mut self,
        fm_factor: Fixed,
        amplitude: &[Fixed; OSC_COUNT],
    ) -> [Fixed; OSC_COUNT] {
        let mut out = [Fixed::ZERO; OSC_COUNT];
        let fm_bits = fm_factor.to_bits().max(0) as u64;
        for osc in 0..OSC_COUNT {
            if self.muted[osc] {
                continue;
            }
            let step = if fm_factor == FIXED_ONE {
                self.base_step[osc]
            } else {
                ((u64::from(self.base_step[osc]) * fm_bits) >> FRAC_BITS).min(self.max_step) as u32
            };
            self.phase[osc] = self.phase[osc].wrapping_add(step);
            out[osc] = fixed_mul(sine_lookup(self.phase[osc]), amplitude[osc]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_config::OscFreqMult;

    const RATE: u32 = 32_000;

    fn unison_patch() -> PatchParams {
        PatchParams {
            osc_freq_mult: [OscFreqMult::Unison; OSC_COUNT],
            ..PatchParams::INIT
        }
    }

    #[test]
    fn test_phase_step_conversion() {
        assert_eq!(hz_to_phase_step(8000.0, RATE), 1 << 30);
        assert_eq!(hz_to_phase_step(0.0, RATE), 0);
    }

    #[test]
    fn test_max_freq_scales_with_rate() {
        assert_eq!(max_osc_freq_hz(48_000), 12_000);
        assert_eq!(max_osc_freq_hz(32_000), 12_000);
        assert_eq!(max_osc_freq_hz(16_000), 6_000);
    }

    #[test]
    fn test_multiplier_scales_step() {
        let mut bank = OscillatorBank::new(RATE);
        let patch = PatchParams::INIT;
        let note = hz_to_phase_step(220.0, RATE);
        bank.set_pitch(note, &patch, 0);
        assert_eq!(bank.base_step(0), note);
        // INIT slot 1 is x2
        let doubled = i64::from(bank.base_step(1)) - 2 * i64::from(note);
        assert!(doubled.abs() <= 2);
    }

    #[test]
    fn test_octave_offset_doubles_step() {
        let mut bank = OscillatorBank::new(RATE);
        let note = hz_to_phase_step(110.0, RATE);
        bank.set_pitch(note, &unison_patch(), 1200);
        let err = i64::from(bank.base_step(0)) - 2 * i64::from(note);
        assert!(err.abs() <= 2);
    }

    #[test]
    fn test_high_harmonics_muted() {
        let mut bank = OscillatorBank::new(RATE);
        let patch = PatchParams {
            osc_freq_mult: [
                OscFreqMult::Unison,
                OscFreqMult::Eight,
                OscFreqMult::Unison,
                OscFreqMult::Unison,
                OscFreqMult::Unison,
                OscFreqMult::Unison,
            ],
            ..PatchParams::INIT
        };
        bank.set_pitch(hz_to_phase_step(2000.0, RATE), &patch, 0);
        assert!(!bank.is_muted(0));
        assert!(bank.is_muted(1));

        let out = bank.advance(FIXED_ONE, &[FIXED_MAX_LEVEL; OSC_COUNT]);
        assert_eq!(out[1], Fixed::ZERO);
        assert_ne!(out[0], Fixed::ZERO);
    }

    #[test]
    fn test_output_scaled_by_amplitude() {
        let mut bank = OscillatorBank::new(RATE);
        bank.set_pitch(1 << 30, &unison_patch(), 0); // quarter cycle per tick
        let mut amplitude = [Fixed::ZERO; OSC_COUNT];
        amplitude[0] = sigma_core::FIXED_PT_HALF;
        let out = bank.advance(FIXED_ONE, &amplitude);
        let expected = Fixed::from_num(0.5);
        assert!((out[0] - expected).abs() < Fixed::from_num(0.001), "{}", out[0]);
        assert_eq!(out[2], Fixed::ZERO);
    }

    #[test]
    fn test_resolver_covers_sources() {
        let inputs = ModulationInputs {
            contour: Fixed::from_num(0.25),
            lfo: FIXED_MAX_LEVEL,
            lfo_am_depth: Fixed::from_num(0.5),
            ..ModulationInputs::default()
        };
        assert_eq!(resolve_mod_source(OscModSource::None, &inputs), FIXED_MAX_LEVEL);
        assert_eq!(resolve_mod_source(OscModSource::ContourPos, &inputs), inputs.contour);
        assert_eq!(
            resolve_mod_source(OscModSource::ContourNeg, &inputs),
            FIXED_MAX_LEVEL - inputs.contour
        );
        assert_eq!(resolve_mod_source(OscModSource::Modulation, &inputs), Fixed::ZERO);
        assert_eq!(resolve_mod_source(OscModSource::VelocityNeg, &inputs), Fixed::ZERO);
        let lfo = resolve_mod_source(OscModSource::Lfo, &inputs);
        assert!((lfo - Fixed::from_num(0.5)).abs() < Fixed::from_num(0.001));
    }
}
