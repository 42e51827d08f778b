//! Low frequency oscillator and automatic vibrato onset.
//!
//! The LFO drives two things: pitch vibrato (bipolar, applied as a cents
//! offset to every oscillator) and tremolo on oscillators routed to the
//! [`Lfo`](sigma_config::OscModSource::Lfo) amplitude source (unipolar).

use sigma_core::{FIXED_MAX_LEVEL, FIXED_ONE, FRAC_BITS, Fixed, fixed_lerp, sine_lookup};

use crate::envelope::ms_to_samples;

/// Delay between note-on and the start of the automatic vibrato ramp.
pub const VIBRATO_ONSET_DELAY_MS: u16 = 500;

/// LFO waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Linear up/down ramps.
    #[default]
    Triangle,
    /// Raised sine.
    Sine,
}

/// Phase-accumulator LFO.
///
/// Output is unipolar in `[0, 1)`; [`bipolar`](Self::bipolar) gives the
/// `2u - 1` view. Phase zero is the rising mid-point of both shapes, so
/// [`phase_sync`](Self::phase_sync) restarts the cycle from a bipolar zero.
///
/// # Example
///
/// ```rust
/// use sigma_synth::Lfo;
/// use sigma_core::FIXED_PT_HALF;
///
/// let mut lfo = Lfo::new(32_000);
/// lfo.set_freq_x10(50); // 5 Hz
/// lfo.phase_sync();
/// assert_eq!(lfo.value(), FIXED_PT_HALF);
/// assert!(lfo.advance() > FIXED_PT_HALF);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: u32,
    step: u32,
    sample_rate: u32,
    waveform: LfoWaveform,
}

impl Lfo {
    /// Creates a 5 Hz triangle LFO.
    pub fn new(sample_rate: u32) -> Self {
        let mut lfo = Self {
            phase: 0,
            step: 0,
            sample_rate: sample_rate.max(1),
            waveform: LfoWaveform::Triangle,
        };
        lfo.set_freq_x10(50);
        lfo
    }

    /// Creates a 5 Hz LFO with the given shape.
    pub fn with_waveform(sample_rate: u32, waveform: LfoWaveform) -> Self {
        let mut lfo = Self::new(sample_rate);
        lfo.set_waveform(waveform);
        lfo
    }

    /// Sets the frequency in tenths of a hertz.
    pub fn set_freq_x10(&mut self, freq_x10: u16) {
        let step = (u64::from(freq_x10) << 32) / (10 * u64::from(self.sample_rate));
        self.step = u32::try_from(step).unwrap_or(u32::MAX);
    }

    /// Sets the waveform.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Restarts the cycle at the rising zero crossing.
    pub fn phase_sync(&mut self) {
        self.phase = 0;
    }

    /// Unipolar output at the current phase, without advancing.
    pub fn value(&self) -> Fixed {
        match self.waveform {
            LfoWaveform::Triangle => {
                let shifted = self.phase.wrapping_add(1 << 30);
                let ramp = if shifted < (1 << 31) {
                    shifted << 1
                } else {
                    (!shifted) << 1
                };
                Fixed::from_bits((ramp >> (32 - FRAC_BITS)) as i32)
            }
            LfoWaveform::Sine => {
                let raised = (sine_lookup(self.phase).to_bits() + FIXED_ONE.to_bits()) >> 1;
                Fixed::from_bits(raised).min(FIXED_MAX_LEVEL)
            }
        }
    }

    /// Advances one tick and returns the new unipolar output.
    #[inline]
    pub fn advance(&mut self) -> Fixed {
        self.phase = self.phase.wrapping_add(self.step);
        self.value()
    }

    /// Maps a unipolar value to `[-1, 1)`.
    #[inline]
    pub fn bipolar(unipolar: Fixed) -> Fixed {
        Fixed::from_bits(unipolar.to_bits() << 1) - FIXED_ONE
    }
}

/// Automatic vibrato stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VibratoRampPhase {
    /// No note yet, depth zero.
    #[default]
    Idle,
    /// Waiting out the onset delay, depth zero.
    Delay,
    /// Depth rising linearly to full.
    Ramp,
    /// Full depth.
    Steady,
}

/// Depth envelope for automatic vibrato: silent for
/// [`VIBRATO_ONSET_DELAY_MS`] after note-on, then a linear ramp-in.
#[derive(Debug, Clone)]
pub struct VibratoRamp {
    phase: VibratoRampPhase,
    timer: u32,
    sample_rate: u32,
    delay_samples: u32,
    ramp_samples: u32,
}

impl VibratoRamp {
    /// Creates an idle ramp with a 500 ms ramp-in.
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            phase: VibratoRampPhase::Idle,
            timer: 0,
            sample_rate,
            delay_samples: ms_to_samples(VIBRATO_ONSET_DELAY_MS, sample_rate),
            ramp_samples: ms_to_samples(500, sample_rate),
        }
    }

    /// Sets the ramp-in time.
    pub fn set_ramp_ms(&mut self, ms: u16) {
        self.ramp_samples = ms_to_samples(ms, self.sample_rate);
    }

    /// Restarts the onset delay.
    pub fn note_on(&mut self) {
        self.phase = VibratoRampPhase::Delay;
        self.timer = 0;
    }

    /// Current stage.
    pub fn phase(&self) -> VibratoRampPhase {
        self.phase
    }

    /// Advances one tick and returns the depth factor in `[0, 1]`.
    #[inline]
    pub fn advance(&mut self) -> Fixed {
        match self.phase {
            VibratoRampPhase::Idle => Fixed::ZERO,
            VibratoRampPhase::Delay => {
                self.timer += 1;
                if self.timer >= self.delay_samples {
                    self.timer = 0;
                    self.phase = VibratoRampPhase::Ramp;
                }
                Fixed::ZERO
            }
            VibratoRampPhase::Ramp => {
                self.timer += 1;
                if self.timer >= self.ramp_samples {
                    self.phase = VibratoRampPhase::Steady;
                }
                fixed_lerp(Fixed::ZERO, FIXED_ONE, self.timer, self.ramp_samples)
            }
            VibratoRampPhase::Steady => FIXED_ONE,
        }
    }
}
