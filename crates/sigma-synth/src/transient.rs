//! Transient generator (ENV2): an instant peak that decays to a sustain level.

use sigma_config::PatchParams;
use sigma_core::{FIXED_MAX_LEVEL, Fixed, fixed_from_percent};

use crate::envelope::{exp_approach, exp_coefficient, ms_to_samples};

/// ENV2 phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransientPhase {
    /// Untriggered, output zero.
    #[default]
    Idle,
    /// Falling exponentially from full scale.
    Decay,
    /// Resting at the sustain level.
    Sustain,
}

/// Transient generator.
#[derive(Debug, Clone)]
pub struct TransientGenerator {
    phase: TransientPhase,
    level: Fixed,
    sample_rate: u32,
    decay_k: Fixed,
    sustain: Fixed,
}

impl TransientGenerator {
    /// Creates an idle generator with a 200 ms decay to zero.
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            phase: TransientPhase::Idle,
            level: Fixed::ZERO,
            sample_rate,
            decay_k: exp_coefficient(ms_to_samples(200, sample_rate)),
            sustain: Fixed::ZERO,
        }
    }

    /// Loads the ENV2 settings from a patch.
    pub fn apply_patch(&mut self, patch: &PatchParams) {
        self.decay_k = exp_coefficient(ms_to_samples(patch.env2_decay_time, self.sample_rate));
        self.sustain = fixed_from_percent(patch.env2_sustain_level.min(100)).min(FIXED_MAX_LEVEL);
    }

    /// Jumps to full scale and starts the decay.
    pub fn trigger(&mut self) {
        self.level = FIXED_MAX_LEVEL;
        self.phase = TransientPhase::Decay;
    }

    /// Returns to idle at zero.
    pub fn reset(&mut self) {
        self.phase = TransientPhase::Idle;
        self.level = Fixed::ZERO;
    }

    /// Current phase.
    pub fn phase(&self) -> TransientPhase {
        self.phase
    }

    /// Current level without advancing.
    pub fn level(&self) -> Fixed {
        self.level
    }

    /// Advances one tick and returns the new level.
    #[inline]
    pub fn advance(&mut self) -> Fixed {
        match self.phase {
            TransientPhase::Idle => self.level = Fixed::ZERO,
            TransientPhase::Decay => {
                self.level = exp_approach(self.level, self.sustain, self.decay_k);
                if self.level == self.sustain {
                    self.phase = TransientPhase::Sustain;
                }
            }
            TransientPhase::Sustain => self.level = self.sustain,
        }
        self.level
    }
}
