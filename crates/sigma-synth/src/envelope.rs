//! Amplitude envelope generator (ENV1).
//!
//! Six phases: a linear attack to full scale, an optional peak hold, an
//! exponential decay to the sustain level, sustain, and an exponential
//! release to zero. Every exponential segment runs in fixed point with
//! a per-tick step of `max(diff * k, 1 ULP)`, so a segment always lands
//! exactly on its target.

use sigma_config::PatchParams;
use sigma_core::{FIXED_MAX_LEVEL, FIXED_MIN_LEVEL, Fixed, fixed_from_percent, fixed_from_ratio};

/// Time constants packed into one exponential segment.
const TIME_CONSTANTS_PER_SEGMENT: i32 = 5;

/// Converts milliseconds to a tick count at `sample_rate`, never less than 1.
#[inline]
pub fn ms_to_samples(ms: u16, sample_rate: u32) -> u32 {
    let samples = u64::from(ms) * u64::from(sample_rate) / 1000;
    samples.clamp(1, u64::from(u32::MAX)) as u32
}

/// Per-tick coefficient for an exponential segment lasting `samples` ticks.
#[inline]
pub(crate) fn exp_coefficient(samples: u32) -> Fixed {
    let samples = i32::try_from(samples).unwrap_or(i32::MAX);
    fixed_from_ratio(TIME_CONSTANTS_PER_SEGMENT, samples.max(TIME_CONSTANTS_PER_SEGMENT))
}

/// One tick of an exponential approach from `level` toward `target`.
///
/// The step is at least one ULP and never overshoots, so repeated calls
/// reach `target` exactly in a bounded number of ticks.
#[inline]
pub(crate) fn exp_approach(level: Fixed, target: Fixed, k: Fixed) -> Fixed {
    let diff = target - level;
    if diff == Fixed::ZERO {
        return target;
    }
    let mut step = diff.saturating_mul(k);
    if step == Fixed::ZERO {
        step = if diff > Fixed::ZERO {
            FIXED_MIN_LEVEL
        } else {
            -FIXED_MIN_LEVEL
        };
    }
    let next = level + step;
    if (diff > Fixed::ZERO && next >= target) || (diff < Fixed::ZERO && next <= target) {
        target
    } else {
        next
    }
}

/// ENV1 phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvPhase {
    /// Inactive, output exactly zero.
    #[default]
    Idle,
    /// Linear ramp from the current level to full scale.
    Attack,
    /// Holding at full scale.
    PeakHold,
    /// Exponential fall toward the sustain level.
    Decay,
    /// Holding at the sustain level until release.
    Sustain,
    /// Exponential fall to zero.
    Release,
}

/// Amplitude envelope generator.
///
/// # Example
///
/// ```rust
/// use sigma_synth::{EnvelopeGenerator, EnvPhase};
///
/// let mut env = EnvelopeGenerator::new(32_000);
/// env.set_attack_ms(5);
/// env.set_hold_ms(0);
///
/// env.trigger_attack();
/// for _ in 0..200 {
///     env.advance();
/// }
/// // Hold time zero: straight from attack to decay
/// assert_eq!(env.phase(), EnvPhase::Decay);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    phase: EnvPhase,
    level: Fixed,
    timer: u32,
    sample_rate: u32,

    attack_step: Fixed,
    hold_samples: u32,
    decay_k: Fixed,
    sustain: Fixed,
    release_k: Fixed,
}

impl EnvelopeGenerator {
    /// Creates an idle envelope with a 10 ms attack, no hold, 200 ms decay,
    /// 80 % sustain and 200 ms release.
    pub fn new(sample_rate: u32) -> Self {
        let mut env = Self {
            phase: EnvPhase::Idle,
            level: Fixed::ZERO,
            timer: 0,
            sample_rate: sample_rate.max(1),
            attack_step: Fixed::ZERO,
            hold_samples: 0,
            decay_k: Fixed::ZERO,
            sustain: fixed_from_percent(80),
            release_k: Fixed::ZERO,
        };
        env.set_attack_ms(10);
        env.set_decay_ms(200);
        env.set_release_ms(200);
        env
    }

    /// Loads all ENV1 settings from a patch.
    pub fn apply_patch(&mut self, patch: &PatchParams) {
        self.set_attack_ms(patch.env_attack_time);
        self.set_hold_ms(patch.env_hold_time);
        self.set_decay_ms(patch.env_decay_time);
        self.set_sustain_pc(patch.env_sustain_level);
        self.set_release_ms(patch.env_release_time);
    }

    /// Attack time: full scale is reached this long after a trigger from zero.
    pub fn set_attack_ms(&mut self, ms: u16) {
        let samples = ms_to_samples(ms, self.sample_rate);
        let step = fixed_from_ratio(1, i32::try_from(samples).unwrap_or(i32::MAX));
        self.attack_step = step.max(FIXED_MIN_LEVEL);
    }

    /// Peak hold time; zero skips [`EnvPhase::PeakHold`].
    pub fn set_hold_ms(&mut self, ms: u16) {
        self.hold_samples = if ms == 0 {
            0
        } else {
            ms_to_samples(ms, self.sample_rate)
        };
    }

    /// Decay time.
    pub fn set_decay_ms(&mut self, ms: u16) {
        self.decay_k = exp_coefficient(ms_to_samples(ms, self.sample_rate));
    }

    /// Sustain level in percent of full scale.
    pub fn set_sustain_pc(&mut self, percent: u16) {
        self.sustain = fixed_from_percent(percent.min(100)).min(FIXED_MAX_LEVEL);
    }

    /// Release time.
    pub fn set_release_ms(&mut self, ms: u16) {
        self.release_k = exp_coefficient(ms_to_samples(ms, self.sample_rate));
    }

    /// Starts (or restarts) the attack from the current level.
    pub fn trigger_attack(&mut self) {
        self.phase = EnvPhase::Attack;
        self.timer = 0;
    }

    /// Enters release from any active phase.
    pub fn trigger_release(&mut self) {
        if self.phase != EnvPhase::Idle {
            self.phase = EnvPhase::Release;
            self.timer = 0;
        }
    }

    /// Forces the envelope to idle at zero.
    pub fn reset(&mut self) {
        self.phase = EnvPhase::Idle;
        self.level = Fixed::ZERO;
        self.timer = 0;
    }

    /// Current phase.
    pub fn phase(&self) -> EnvPhase {
        self.phase
    }

    /// Current level without advancing.
    pub fn level(&self) -> Fixed {
        self.level
    }

    /// Per-tick attack increment.
    pub fn attack_step(&self) -> Fixed {
        self.attack_step
    }

    /// True unless idle.
    pub fn is_active(&self) -> bool {
        self.phase != EnvPhase::Idle
    }

    /// Advances one tick and returns the new level.
    #[inline]
    pub fn advance(&mut self) -> Fixed {
        match self.phase {
            EnvPhase::Idle => {
                self.level = Fixed::ZERO;
            }

            EnvPhase::Attack => {
                self.level = self.level.saturating_add(self.attack_step);
                if self.level >= FIXED_MAX_LEVEL {
                    self.level = FIXED_MAX_LEVEL;
                    self.timer = 0;
                    self.phase = if self.hold_samples > 0 {
                        EnvPhase::PeakHold
                    } else {
                        EnvPhase::Decay
                    };
                }
            }

            EnvPhase::PeakHold => {
                self.timer += 1;
                if self.timer >= self.hold_samples {
                    self.phase = EnvPhase::Decay;
                }
            }

            EnvPhase::Decay => {
                self.level = exp_approach(self.level, self.sustain, self.decay_k);
                if self.level == self.sustain {
                    self.phase = EnvPhase::Sustain;
                }
            }

            EnvPhase::Sustain => {
                self.level = self.sustain;
            }

            EnvPhase::Release => {
                self.level = exp_approach(self.level, Fixed::ZERO, self.release_k);
                if self.level <= FIXED_MIN_LEVEL {
                    self.level = Fixed::ZERO;
                    self.phase = EnvPhase::Idle;
                }
            }
        }

        self.level
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SAMPLE_RATE)
    }
}
