//! Contour generator: a one-shot delay-then-ramp modulation envelope.

use sigma_config::PatchParams;
use sigma_core::{FIXED_MAX_LEVEL, Fixed, fixed_from_percent, fixed_lerp};

use crate::envelope::ms_to_samples;

/// Contour phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContourPhase {
    /// Untriggered, resting at the start level.
    #[default]
    Idle,
    /// Holding the start level after a trigger.
    Delay,
    /// Moving linearly from the start level to the hold level.
    Ramp,
    /// Resting at the hold level until the next trigger.
    Hold,
}

/// Contour generator.
///
/// Has no release: once the ramp completes the level stays at the hold
/// level until the next [`trigger`](Self::trigger).
#[derive(Debug, Clone)]
pub struct ContourGenerator {
    phase: ContourPhase,
    level: Fixed,
    timer: u32,
    sample_rate: u32,
    start_level: Fixed,
    hold_level: Fixed,
    delay_samples: u32,
    ramp_samples: u32,
}

impl ContourGenerator {
    /// Creates an idle contour ramping from zero to full scale over 500 ms.
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            phase: ContourPhase::Idle,
            level: Fixed::ZERO,
            timer: 0,
            sample_rate,
            start_level: Fixed::ZERO,
            hold_level: FIXED_MAX_LEVEL,
            delay_samples: 0,
            ramp_samples: ms_to_samples(500, sample_rate),
        }
    }

    /// Loads the contour settings from a patch.
    pub fn apply_patch(&mut self, patch: &PatchParams) {
        self.start_level = level_from_percent(patch.contour_start_level);
        self.hold_level = level_from_percent(patch.contour_hold_level);
        self.delay_samples = if patch.contour_delay_time == 0 {
            0
        } else {
            ms_to_samples(patch.contour_delay_time, self.sample_rate)
        };
        self.ramp_samples = ms_to_samples(patch.contour_ramp_time, self.sample_rate);
        if self.phase == ContourPhase::Idle {
            self.level = self.start_level;
        }
    }

    /// Restarts the contour from the start level.
    pub fn trigger(&mut self) {
        self.level = self.start_level;
        self.timer = 0;
        self.phase = if self.delay_samples > 0 {
            ContourPhase::Delay
        } else {
            ContourPhase::Ramp
        };
    }

    /// Returns to idle at the start level.
    pub fn reset(&mut self) {
        self.phase = ContourPhase::Idle;
        self.level = self.start_level;
        self.timer = 0;
    }

    /// Current phase.
    pub fn phase(&self) -> ContourPhase {
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
            ContourPhase::Idle => {
                self.level = self.start_level;
            }
            ContourPhase::Delay => {
                self.timer += 1;
                if self.timer >= self.delay_samples {
                    self.timer = 0;
                    self.phase = ContourPhase::Ramp;
                }
            }
            ContourPhase::Ramp => {
                self.timer += 1;
                self.level =
                    fixed_lerp(self.start_level, self.hold_level, self.timer, self.ramp_samples);
                if self.timer >= self.ramp_samples {
                    self.phase = ContourPhase::Hold;
                }
            }
            ContourPhase::Hold => {
                self.level = self.hold_level;
            }
        }
        self.level
    }
}

fn level_from_percent(percent: u16) -> Fixed {
    fixed_from_percent(percent.min(100)).min(FIXED_MAX_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(start: u16, delay: u16, ramp: u16, hold: u16) -> PatchParams {
        PatchParams {
            contour_start_level: start,
            contour_delay_time: delay,
            contour_ramp_time: ramp,
            contour_hold_level: hold,
            ..PatchParams::INIT
        }
    }

    #[test]
    fn test_idle_rests_at_start_level() {
        let mut contour = ContourGenerator::new(32_000);
        contour.apply_patch(&patch(40, 0, 100, 90));
        assert_eq!(contour.advance(), fixed_from_percent(40));
        assert_eq!(contour.phase(), ContourPhase::Idle);
    }

    #[test]
    fn test_delay_then_ramp_up() {
        let mut contour = ContourGenerator::new(32_000);
        contour.apply_patch(&patch(0, 10, 10, 100)); // 320 + 320 ticks
        contour.trigger();
        assert_eq!(contour.phase(), ContourPhase::Delay);

        for _ in 0..320 {
            assert_eq!(contour.advance(), Fixed::ZERO);
        }
        assert_eq!(contour.phase(), ContourPhase::Ramp);

        let mut previous = Fixed::ZERO;
        for _ in 0..320 {
            let level = contour.advance();
            assert!(level > previous);
            previous = level;
        }
        assert_eq!(contour.phase(), ContourPhase::Hold);
        assert_eq!(contour.level(), FIXED_MAX_LEVEL);
    }

    #[test]
    fn test_zero_delay_ramps_down_immediately() {
        let mut contour = ContourGenerator::new(32_000);
        contour.apply_patch(&patch(100, 0, 5, 20));
        contour.trigger();
        assert_eq!(contour.phase(), ContourPhase::Ramp);
        let first = contour.advance();
        assert!(first < FIXED_MAX_LEVEL);
        for _ in 0..200 {
            contour.advance();
        }
        assert_eq!(contour.level(), fixed_from_percent(20));
    }

    #[test]
    fn test_hold_is_indefinite_until_retrigger() {
        let mut contour = ContourGenerator::new(32_000);
        contour.apply_patch(&patch(10, 0, 5, 60));
        contour.trigger();
        for _ in 0..10_000 {
            contour.advance();
        }
        assert_eq!(contour.phase(), ContourPhase::Hold);
        contour.trigger();
        assert_eq!(contour.level(), fixed_from_percent(10));
    }
}
