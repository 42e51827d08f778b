//! Process-wide configuration parameters.

use serde::{Deserialize, Serialize};

use crate::encoded::encoded_enum;
use crate::error::ConfigError;

encoded_enum! {
    /// Output amplitude control override. Any value other than
    /// [`ByPatch`](AudioAmpldCtrlMode::ByPatch) replaces the patch's
    /// `amp_control_mode`.
    #[derive(Default)]
    pub enum AudioAmpldCtrlMode: "AudioAmpldCtrlMode" {
        /// Use the active patch's amplitude control mode.
        #[default]
        ByPatch = 0,
        /// Constant maximum level.
        Constant = 1,
        /// ENV1 scaled by note velocity.
        Env1Velocity = 2,
        /// ENV1 scaled by MIDI expression (CC2, CC7, CC11).
        Expression = 3,
    }
}

encoded_enum! {
    /// Vibrato (LFO pitch modulation) control mode.
    #[derive(Default)]
    pub enum VibratoMode: "VibratoCtrlMode" {
        /// No vibrato.
        #[default]
        Disabled = 0,
        /// Depth follows the modulation wheel (CC1).
        ModulationCc = 1,
        /// Depth follows the auxiliary CV input.
        CvAuxIn = 2,
        /// Depth ramps in automatically after each note-on.
        Automatic = 3,
    }
}

encoded_enum! {
    /// Pitch-bend control mode.
    #[derive(Default)]
    pub enum PitchBendMode: "PitchBendMode" {
        /// Pitch bend ignored.
        Disabled = 0,
        /// Pitch bend from MIDI pitch-bend messages.
        #[default]
        MidiMessage = 1,
        /// Pitch bend from the CV1 input.
        Cv1Input = 2,
    }
}

/// Global configuration, loaded once at startup and edited through SysEx.
///
/// The integrity check word exists only in the persisted layout (see
/// [`encode_config`](crate::encode_config)); in memory the struct is always
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigParams {
    /// Override for the patch amplitude control mode.
    pub audio_ampld_ctrl_mode: AudioAmpldCtrlMode,
    /// Vibrato control mode.
    pub vibrato_ctrl_mode: VibratoMode,
    /// Pitch-bend control mode.
    pub pitch_bend_mode: PitchBendMode,
    /// Pitch-bend range in semitones (1..=12).
    pub pitch_bend_range: u8,
    /// Reverb wet/dry mix in percent (0..=100).
    pub reverb_mix_pc: u8,
    /// Preset selected at power-up (0..=127).
    pub preset_last_selected: u8,
    /// Lowest note of the pitch CV range (MIDI note number).
    pub pitch_cv_base_note: u8,
    /// Quantize CV pitch to the nearest semitone.
    pub pitch_cv_quantize: bool,
    /// Enable CV control mode on a GATE signal.
    pub cv_mode_auto_switch: bool,
    /// CV3 input controls velocity.
    pub cv3_is_velocity: bool,
    /// CV1 input calibration, millivolts at full scale.
    pub cv1_full_scale_mv: i16,
    /// Master fine tuning in cents (-100..=100).
    pub fine_tuning_cents: i16,
}

impl Default for ConfigParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ConfigParams {
    /// Built-in configuration used when storage is absent or corrupt.
    pub const DEFAULT: Self = Self {
        audio_ampld_ctrl_mode: AudioAmpldCtrlMode::ByPatch,
        vibrato_ctrl_mode: VibratoMode::Disabled,
        pitch_bend_mode: PitchBendMode::MidiMessage,
        pitch_bend_range: 2,
        reverb_mix_pc: 15,
        preset_last_selected: 0,
        pitch_cv_base_note: 36,
        pitch_cv_quantize: false,
        cv_mode_auto_switch: false,
        cv3_is_velocity: false,
        cv1_full_scale_mv: 5000,
        fine_tuning_cents: 0,
    };
}

encoded_enum! {
    /// Identifier of a configuration parameter in SysEx "set config" commands.
    pub enum ConfigParam: "ConfigParam" {
        /// [`ConfigParams::audio_ampld_ctrl_mode`]
        AudioAmpldCtrlMode = 0,
        /// [`ConfigParams::vibrato_ctrl_mode`]
        VibratoCtrlMode = 1,
        /// [`ConfigParams::pitch_bend_mode`]
        PitchBendMode = 2,
        /// [`ConfigParams::pitch_bend_range`]
        PitchBendRange = 3,
        /// [`ConfigParams::reverb_mix_pc`]
        ReverbMix = 4,
        /// [`ConfigParams::preset_last_selected`]
        PresetLastSelected = 5,
        /// [`ConfigParams::pitch_cv_base_note`]
        PitchCvBaseNote = 6,
        /// [`ConfigParams::pitch_cv_quantize`]
        PitchCvQuantize = 7,
        /// [`ConfigParams::cv_mode_auto_switch`]
        CvModeAutoSwitch = 8,
        /// [`ConfigParams::cv3_is_velocity`]
        Cv3IsVelocity = 9,
        /// [`ConfigParams::cv1_full_scale_mv`]
        Cv1FullScaleMv = 10,
        /// [`ConfigParams::fine_tuning_cents`]
        FineTuningCents = 11,
    }
}

impl ConfigParams {
    /// Sets one parameter from a raw edit value.
    ///
    /// The value is range-checked before anything is written; on error the
    /// configuration is unchanged.
    pub fn set_param(&mut self, param: ConfigParam, value: i32) -> Result<(), ConfigError> {
        let mut edited = *self;
        match param {
            ConfigParam::AudioAmpldCtrlMode => {
                edited.audio_ampld_ctrl_mode = AudioAmpldCtrlMode::from_code(to_code(value))?;
            }
            ConfigParam::VibratoCtrlMode => {
                edited.vibrato_ctrl_mode = VibratoMode::from_code(to_code(value))?;
            }
            ConfigParam::PitchBendMode => {
                edited.pitch_bend_mode = PitchBendMode::from_code(to_code(value))?;
            }
            ConfigParam::PitchBendRange => edited.pitch_bend_range = to_u8(value),
            ConfigParam::ReverbMix => edited.reverb_mix_pc = to_u8(value),
            ConfigParam::PresetLastSelected => edited.preset_last_selected = to_u8(value),
            ConfigParam::PitchCvBaseNote => edited.pitch_cv_base_note = to_u8(value),
            ConfigParam::PitchCvQuantize => edited.pitch_cv_quantize = value != 0,
            ConfigParam::CvModeAutoSwitch => edited.cv_mode_auto_switch = value != 0,
            ConfigParam::Cv3IsVelocity => edited.cv3_is_velocity = value != 0,
            ConfigParam::Cv1FullScaleMv => edited.cv1_full_scale_mv = to_i16(value),
            ConfigParam::FineTuningCents => edited.fine_tuning_cents = to_i16(value),
        }
        crate::validation::validate_config(&edited)?;
        *self = edited;
        Ok(())
    }
}

/// Out-of-range inputs map to a value the validator is guaranteed to reject.
fn to_code(value: i32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn to_u8(value: i32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

fn to_i16(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(i16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(crate::validation::validate_config(&ConfigParams::default()).is_ok());
    }

    #[test]
    fn test_mode_codes_round_trip() {
        for &mode in VibratoMode::ALL {
            assert_eq!(VibratoMode::from_code(u16::from(mode.code())).unwrap(), mode);
        }
        assert!(VibratoMode::from_code(4).is_err());
        assert!(AudioAmpldCtrlMode::try_from(9u16).is_err());
    }

    #[test]
    fn test_set_param_applies() {
        let mut config = ConfigParams::default();
        config.set_param(ConfigParam::PitchBendRange, 7).unwrap();
        config.set_param(ConfigParam::FineTuningCents, -35).unwrap();
        config
            .set_param(ConfigParam::VibratoCtrlMode, VibratoMode::Automatic.code().into())
            .unwrap();
        assert_eq!(config.pitch_bend_range, 7);
        assert_eq!(config.fine_tuning_cents, -35);
        assert_eq!(config.vibrato_ctrl_mode, VibratoMode::Automatic);
    }

    #[test]
    fn test_set_param_rejects_out_of_range() {
        let mut config = ConfigParams::default();
        let before = config;
        assert!(config.set_param(ConfigParam::PitchBendRange, 13).is_err());
        assert!(config.set_param(ConfigParam::PitchBendRange, 0).is_err());
        assert!(config.set_param(ConfigParam::ReverbMix, 101).is_err());
        assert!(config.set_param(ConfigParam::FineTuningCents, 150).is_err());
        assert!(config.set_param(ConfigParam::PitchBendMode, 3).is_err());
        assert!(config.set_param(ConfigParam::ReverbMix, -1).is_err());
        assert_eq!(config, before);
    }
}
