//! Range checks for patches and configuration.
//!
//! Enumerated fields are closed enums and cannot hold an invalid code once
//! decoded, so only the numeric fields are checked here.
//!
//! # Example
//!
//! ```rust
//! use sigma_config::{validate_patch, PatchParams};
//!
//! let mut patch = PatchParams::INIT;
//! assert!(validate_patch(&patch).is_ok());
//!
//! patch.lfo_freq_x10 = 300;
//! assert!(validate_patch(&patch).is_err());
//! ```

use sigma_core::MIXER_STEP_MAX;

use crate::config::ConfigParams;
use crate::error::ConfigError;
use crate::patch::{OSC_COUNT, PatchParams};

/// Longest accepted segment time, in milliseconds.
pub const MAX_SEGMENT_TIME_MS: i32 = 10_000;

/// Shortest accepted ramp time, in milliseconds.
pub const MIN_RAMP_TIME_MS: i32 = 5;

/// Largest accepted oscillator detune or LFO FM depth, in cents.
pub const MAX_DETUNE_CENTS: i32 = 600;

fn check(
    field: &'static str,
    value: impl Into<i32>,
    min: i32,
    max: i32,
) -> Result<(), ConfigError> {
    let value = value.into();
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, value, min, max))
    }
}

fn ramp(field: &'static str, value: u16) -> Result<(), ConfigError> {
    check(field, value, MIN_RAMP_TIME_MS, MAX_SEGMENT_TIME_MS)
}

fn percent(field: &'static str, value: u16) -> Result<(), ConfigError> {
    check(field, value, 0, 100)
}

/// Checks every numeric patch field against its documented range.
///
/// Returns the first violation found.
pub fn validate_patch(patch: &PatchParams) -> Result<(), ConfigError> {
    if !patch.name.is_valid() {
        return Err(ConfigError::InvalidName);
    }

    for osc in 0..OSC_COUNT {
        check(
            "OscDetune",
            patch.osc_detune[osc],
            -MAX_DETUNE_CENTS,
            MAX_DETUNE_CENTS,
        )?;
        check(
            "MixerInputStep",
            patch.mixer_input_step[osc],
            0,
            MIXER_STEP_MAX as i32,
        )?;
    }

    ramp("EnvAttackTime", patch.env_attack_time)?;
    check("EnvHoldTime", patch.env_hold_time, 0, MAX_SEGMENT_TIME_MS)?;
    ramp("EnvDecayTime", patch.env_decay_time)?;
    percent("EnvSustainLevel", patch.env_sustain_level)?;
    ramp("EnvReleaseTime", patch.env_release_time)?;

    percent("ContourStartLevel", patch.contour_start_level)?;
    check("ContourDelayTime", patch.contour_delay_time, 0, MAX_SEGMENT_TIME_MS)?;
    ramp("ContourRampTime", patch.contour_ramp_time)?;
    percent("ContourHoldLevel", patch.contour_hold_level)?;
    ramp("Env2DecayTime", patch.env2_decay_time)?;
    percent("Env2SustainLevel", patch.env2_sustain_level)?;

    check("LFO_Freq_x10", patch.lfo_freq_x10, 5, 250)?;
    ramp("LFO_RampTime", patch.lfo_ramp_time)?;
    check("LFO_FM_Depth", patch.lfo_fm_depth, 0, MAX_DETUNE_CENTS)?;
    percent("LFO_AM_Depth", patch.lfo_am_depth)?;
    check("MixerOutGain_x10", patch.mixer_out_gain_x10, 0, 100)?;
    percent("LimiterLevelPc", patch.limiter_level_pc)?;

    Ok(())
}

/// Checks every numeric configuration field against its documented range.
pub fn validate_config(config: &ConfigParams) -> Result<(), ConfigError> {
    check("PitchBendRange", config.pitch_bend_range, 1, 12)?;
    percent("ReverbMix_pc", u16::from(config.reverb_mix_pc))?;
    check("PresetLastSelected", config.preset_last_selected, 0, 127)?;
    check("PitchCV_BaseNote", config.pitch_cv_base_note, 0, 127)?;
    check("CV1_FullScale_mV", config.cv1_full_scale_mv, 1000, 10_000)?;
    check("FineTuning_cents", config.fine_tuning_cents, -100, 100)?;
    Ok(())
}
