//! Output mixer, amplitude control and limiter.

use sigma_config::{AmpControlMode, AudioAmpldCtrlMode, OSC_COUNT, PatchParams};
use sigma_core::{
    FIXED_MAX_LEVEL, Fixed, MAX_CLIPPING_LEVEL, MIXER_INPUT_LEVEL, MIXER_STEP_MAX,
    fixed_from_percent, fixed_from_ratio, fixed_mul, soft_limit,
};

/// Output level in [`AmpControlMode::ConstLow`].
pub const CONST_LOW_LEVEL: Fixed = fixed_from_ratio(1, 4);

/// Knee of the final output clipper.
pub const CLIP_KNEE_LEVEL: Fixed = fixed_from_ratio(9, 10);

/// Picks the amplitude control mode: a non-zero config override wins over
/// the patch's own mode.
pub fn effective_amp_mode(config: AudioAmpldCtrlMode, patch: AmpControlMode) -> AmpControlMode {
    match config {
        AudioAmpldCtrlMode::ByPatch => patch,
        AudioAmpldCtrlMode::Constant => AmpControlMode::ConstMax,
        AudioAmpldCtrlMode::Env1Velocity => AmpControlMode::Env1Velocity,
        AudioAmpldCtrlMode::Expression => AmpControlMode::Expression,
    }
}

/// Output amplitude level for `mode`.
#[inline]
pub fn amplitude_level(
    mode: AmpControlMode,
    env1: Fixed,
    velocity: Fixed,
    expression: Fixed,
) -> Fixed {
    match mode {
        AmpControlMode::ConstMax => FIXED_MAX_LEVEL,
        AmpControlMode::ConstLow => CONST_LOW_LEVEL,
        AmpControlMode::Env1Velocity => fixed_mul(env1, velocity),
        AmpControlMode::Expression => fixed_mul(env1, expression),
    }
}

/// Weighted sum of the oscillator bank followed by output gain, amplitude
/// control and the optional limiter.
#[derive(Debug, Clone)]
pub struct Mixer {
    input_level: [Fixed; OSC_COUNT],
    out_gain: Fixed,
    limiter_knee: Option<Fixed>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    /// Mixer with every input off, unity gain and no limiter.
    pub fn new() -> Self {
        Self {
            input_level: [Fixed::ZERO; OSC_COUNT],
            out_gain: fixed_from_ratio(1, 1),
            limiter_knee: None,
        }
    }

    /// Loads input steps, output gain and limiter level from a patch.
    pub fn apply_patch(&mut self, patch: &PatchParams) {
        for (level, &step) in self.input_level.iter_mut().zip(&patch.mixer_input_step) {
            *level = MIXER_INPUT_LEVEL[usize::from(step).min(MIXER_STEP_MAX)];
        }
        self.out_gain = fixed_from_ratio(i32::from(patch.mixer_out_gain_x10), 10);
        self.limiter_knee = match patch.limiter_level_pc {
            0 => None,
            pc => Some(fixed_from_percent(pc.min(100))),
        };
    }

    /// Limiter knee, if the limiter is enabled.
    pub fn limiter_knee(&self) -> Option<Fixed> {
        self.limiter_knee
    }

    /// Mixes one tick of oscillator output.
    #[inline]
    pub fn mix(&self, samples: &[Fixed; OSC_COUNT], amplitude: Fixed) -> Fixed {
        let sum = samples
            .iter()
            .zip(&self.input_level)
            .fold(Fixed::ZERO, |acc, (&s, &level)| acc.saturating_add(fixed_mul(s, level)));
        let out = fixed_mul(fixed_mul(sum, self.out_gain), amplitude);
        match self.limiter_knee {
            Some(knee) => soft_limit(out, knee, MAX_CLIPPING_LEVEL),
            None => out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::{FIXED_PT_HALF, int_to_fixed};

    #[test]
    fn test_override_precedence() {
        assert_eq!(
            effective_amp_mode(AudioAmpldCtrlMode::ByPatch, AmpControlMode::ConstLow),
            AmpControlMode::ConstLow
        );
        assert_eq!(
            effective_amp_mode(AudioAmpldCtrlMode::Constant, AmpControlMode::Expression),
            AmpControlMode::ConstMax
        );
        assert_eq!(
            effective_amp_mode(AudioAmpldCtrlMode::Expression, AmpControlMode::ConstMax),
            AmpControlMode::Expression
        );
    }

    #[test]
    fn test_amplitude_modes() {
        let env = FIXED_PT_HALF;
        let vel = FIXED_PT_HALF;
        assert_eq!(amplitude_level(AmpControlMode::ConstMax, env, vel, vel), FIXED_MAX_LEVEL);
        assert_eq!(amplitude_level(AmpControlMode::ConstLow, env, vel, vel), CONST_LOW_LEVEL);
        assert_eq!(
            amplitude_level(AmpControlMode::Env1Velocity, env, vel, FIXED_MAX_LEVEL),
            fixed_from_ratio(1, 4)
        );
        assert_eq!(
            amplitude_level(AmpControlMode::Expression, Fixed::ZERO, vel, FIXED_MAX_LEVEL),
            Fixed::ZERO
        );
    }

    #[test]
    fn test_mix_weights_inputs() {
        let mut mixer = Mixer::new();
        mixer.apply_patch(&PatchParams {
            mixer_input_step: [16, 16, 0, 0, 0, 0],
            mixer_out_gain_x10: 10,
            limiter_level_pc: 0,
            ..PatchParams::INIT
        });
        let mut samples = [Fixed::ZERO; OSC_COUNT];
        samples[0] = FIXED_PT_HALF;
        samples[1] = fixed_from_ratio(1, 4);
        samples[2] = FIXED_PT_HALF;
        let out = mixer.mix(&samples, sigma_core::FIXED_ONE);
        assert_eq!(out, fixed_from_ratio(3, 4));
    }

    #[test]
    fn test_limiter_bounds_output() {
        let mut mixer = Mixer::new();
        mixer.apply_patch(&PatchParams {
            mixer_input_step: [16; OSC_COUNT],
            mixer_out_gain_x10: 100,
            limiter_level_pc: 50,
            ..PatchParams::INIT
        });
        let out = mixer.mix(&[FIXED_MAX_LEVEL; OSC_COUNT], FIXED_MAX_LEVEL);
        assert!(out < MAX_CLIPPING_LEVEL);
        assert!(out > FIXED_PT_HALF);

        // Without the limiter the same input is far above full scale
        mixer.apply_patch(&PatchParams {
            mixer_input_step: [16; OSC_COUNT],
            mixer_out_gain_x10: 100,
            limiter_level_pc: 0,
            ..PatchParams::INIT
        });
        assert!(mixer.mix(&[FIXED_MAX_LEVEL; OSC_COUNT], FIXED_MAX_LEVEL) > int_to_fixed(50));
    }
}
