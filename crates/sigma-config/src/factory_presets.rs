//! Factory presets bundled with the firmware image.
//!
//! The table is `const` data so it lives in flash on the target; selecting a
//! preset copies one entry into the mutable active patch.

use crate::error::PresetError;
use crate::patch::OscFreqMult as M;
use crate::patch::OscModSource as S;
use crate::patch::{AmpControlMode, PatchParams, PresetName};

/// Built-in presets, in program-change order.
pub static FACTORY_PRESETS: [PatchParams; 10] = [
    PatchParams::INIT,
    // Drawbar-style additive organ
    PatchParams {
        name: PresetName::new("Jazz Organ"),
        osc_freq_mult: [M::Half, M::Unison, M::ThreeHalves, M::Two, M::Three, M::Four],
        mixer_input_step: [14, 16, 10, 13, 9, 8],
        env_attack_time: 5,
        env_decay_time: 50,
        env_sustain_level: 100,
        env_release_time: 30,
        amp_control_mode: AmpControlMode::Expression,
        mixer_out_gain_x10: 6,
        limiter_level_pc: 70,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Pipe Flute"),
        osc_freq_mult: [M::Unison, M::Two, M::Three, M::Four, M::Five, M::Six],
        osc_ampld_mod_source: [S::None, S::ContourNeg, S::None, S::None, S::None, S::None],
        mixer_input_step: [16, 9, 6, 0, 0, 0],
        env_attack_time: 60,
        env_decay_time: 100,
        env_sustain_level: 90,
        env_release_time: 150,
        contour_start_level: 100,
        contour_ramp_time: 120,
        contour_hold_level: 0,
        lfo_freq_x10: 55,
        lfo_fm_depth: 15,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Brass Ensemble"),
        osc_freq_mult: [M::Unison, M::Two, M::Three, M::Four, M::Five, M::Six],
        osc_ampld_mod_source: [
            S::None,
            S::None,
            S::ContourPos,
            S::ContourPos,
            S::ContourPos,
            S::ExpressionPos,
        ],
        osc_detune: [0, 4, -3, 0, 0, 0],
        mixer_input_step: [16, 15, 14, 13, 12, 11],
        env_attack_time: 40,
        env_hold_time: 20,
        env_decay_time: 300,
        env_sustain_level: 85,
        env_release_time: 120,
        contour_start_level: 10,
        contour_delay_time: 10,
        contour_ramp_time: 150,
        contour_hold_level: 90,
        mixer_out_gain_x10: 5,
        limiter_level_pc: 60,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Clarinet"),
        osc_freq_mult: [M::Unison, M::Three, M::Five, M::Seven, M::Two, M::Four],
        mixer_input_step: [16, 13, 10, 7, 3, 2],
        env_attack_time: 30,
        env_decay_time: 200,
        env_sustain_level: 95,
        env_release_time: 80,
        amp_control_mode: AmpControlMode::Expression,
        lfo_freq_x10: 48,
        lfo_fm_depth: 10,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Electric Piano"),
        osc_freq_mult: [M::Unison, M::Two, M::Seven, M::Eight, M::Four, M::Six],
        osc_ampld_mod_source: [S::None, S::VelocityPos, S::Env2, S::Env2, S::Env2, S::None],
        osc_detune: [0, 3, 0, 0, 0, 0],
        mixer_input_step: [16, 10, 11, 9, 8, 0],
        env_attack_time: 5,
        env_hold_time: 30,
        env_decay_time: 2500,
        env_sustain_level: 0,
        env_release_time: 400,
        env2_decay_time: 150,
        env2_sustain_level: 10,
        lfo_freq_x10: 45,
        lfo_am_depth: 20,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Vibraphone"),
        osc_freq_mult: [M::Unison, M::Four, M::Eight, M::Two, M::Three, M::Six],
        osc_ampld_mod_source: [S::Lfo, S::Lfo, S::Env2, S::None, S::None, S::None],
        mixer_input_step: [16, 11, 8, 0, 0, 0],
        env_attack_time: 5,
        env_hold_time: 10,
        env_decay_time: 3000,
        env_sustain_level: 0,
        env_release_time: 800,
        env2_decay_time: 60,
        lfo_freq_x10: 60,
        lfo_fm_depth: 0,
        lfo_am_depth: 35,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("String Pad"),
        osc_freq_mult: [M::Unison, M::Unison, M::Two, M::Two, M::Three, M::Half],
        osc_ampld_mod_source: [S::None, S::None, S::Modulation, S::None, S::ExpressionNeg, S::None],
        osc_detune: [-7, 7, -5, 5, 0, 0],
        mixer_input_step: [16, 16, 12, 12, 8, 10],
        env_attack_time: 600,
        env_decay_time: 800,
        env_sustain_level: 85,
        env_release_time: 1500,
        lfo_freq_x10: 40,
        lfo_ramp_time: 1200,
        lfo_fm_depth: 12,
        mixer_out_gain_x10: 4,
        limiter_level_pc: 50,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Square Lead"),
        osc_freq_mult: [M::Unison, M::Three, M::Five, M::Seven, M::Half, M::Two],
        osc_ampld_mod_source: [S::None, S::None, S::None, S::None, S::VelocityNeg, S::None],
        mixer_input_step: [16, 13, 11, 10, 6, 0],
        env_attack_time: 8,
        env_decay_time: 150,
        env_sustain_level: 90,
        env_release_time: 60,
        lfo_freq_x10: 65,
        lfo_ramp_time: 400,
        lfo_fm_depth: 30,
        mixer_out_gain_x10: 5,
        limiter_level_pc: 75,
        ..PatchParams::INIT
    },
    PatchParams {
        name: PresetName::new("Fifth Bass"),
        osc_freq_mult: [M::Half, M::Unison, M::ThreeHalves, M::Two, M::FourThirds, M::FiveHalves],
        osc_ampld_mod_source: [S::None, S::ContourPos, S::ContourPos, S::None, S::None, S::None],
        mixer_input_step: [16, 14, 8, 6, 0, 0],
        env_attack_time: 5,
        env_hold_time: 15,
        env_decay_time: 400,
        env_sustain_level: 60,
        env_release_time: 90,
        contour_start_level: 100,
        contour_ramp_time: 250,
        contour_hold_level: 20,
        mixer_out_gain_x10: 7,
        limiter_level_pc: 80,
        ..PatchParams::INIT
    },
];

/// Number of factory presets.
pub fn number_of_presets() -> usize {
    FACTORY_PRESETS.len()
}

/// Looks up a factory preset by index.
pub fn factory_preset(index: usize) -> Result<&'static PatchParams, PresetError> {
    FACTORY_PRESETS.get(index).ok_or(PresetError::OutOfRange {
        index,
        count: FACTORY_PRESETS.len(),
    })
}

/// Finds a factory preset by name, ignoring ASCII case.
pub fn find_preset(name: &str) -> Option<(usize, &'static PatchParams)> {
    FACTORY_PRESETS
        .iter()
        .enumerate()
        .find(|(_, p)| p.name.as_str().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_patch;

    #[test]
    fn test_all_presets_valid() {
        for (i, preset) in FACTORY_PRESETS.iter().enumerate() {
            assert!(
                validate_patch(preset).is_ok(),
                "preset {i} ({}) failed validation: {:?}",
                preset.name,
                validate_patch(preset)
            );
        }
    }

    #[test]
    fn test_names_unique() {
        for (i, a) in FACTORY_PRESETS.iter().enumerate() {
            for b in &FACTORY_PRESETS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(number_of_presets(), 10);
        assert_eq!(factory_preset(0).unwrap().name.as_str(), "Init");
        assert_eq!(
            factory_preset(10),
            Err(PresetError::OutOfRange { index: 10, count: 10 })
        );
    }

    #[test]
    fn test_find_by_name() {
        let (index, preset) = find_preset("string pad").unwrap();
        assert_eq!(index, 7);
        assert_eq!(preset.env_attack_time, 600);
        assert!(find_preset("missing").is_none());
    }
}
