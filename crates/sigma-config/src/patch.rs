//! Patch (voice program) parameters.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sigma_core::{FREQ_MULT_RATIO, Fixed};

use crate::encoded::encoded_enum;
use crate::error::ConfigError;

/// Oscillators per voice.
pub const OSC_COUNT: usize = 6;

/// Bytes reserved for a preset name, including the terminating NUL.
pub const PRESET_NAME_SIZE: usize = 24;

/// Longest preset name, in characters.
pub const PRESET_NAME_MAX_LEN: usize = 22;

encoded_enum! {
    /// Oscillator frequency multiplier, relative to the note frequency.
    pub enum OscFreqMult: "OscFreqMult" {
        /// x0.5 (sub-octave)
        Half = 0,
        /// x1 (fundamental)
        Unison = 1,
        /// x1.333 (fourth)
        FourThirds = 2,
        /// x1.5 (fifth)
        ThreeHalves = 3,
        /// x2
        Two = 4,
        /// x2.5
        FiveHalves = 5,
        /// x3
        Three = 6,
        /// x4
        Four = 7,
        /// x5
        Five = 8,
        /// x6
        Six = 9,
        /// x7
        Seven = 10,
        /// x8
        Eight = 11,
    }
}

impl OscFreqMult {
    /// Multiplier as a fixed-point ratio.
    #[inline]
    pub fn ratio(self) -> Fixed {
        FREQ_MULT_RATIO[self.code() as usize]
    }
}

encoded_enum! {
    /// Amplitude modulation source routed to one oscillator.
    pub enum OscModSource: "OscAmpldModSource" {
        /// Fixed full amplitude.
        None = 0,
        /// Contour generator.
        ContourPos = 1,
        /// Contour generator, inverted.
        ContourNeg = 2,
        /// Transient generator (ENV2).
        Env2 = 3,
        /// MIDI modulation wheel (CC1).
        Modulation = 4,
        /// MIDI expression.
        ExpressionPos = 5,
        /// MIDI expression, inverted.
        ExpressionNeg = 6,
        /// LFO, scaled by the patch AM depth.
        Lfo = 7,
        /// Note-on velocity.
        VelocityPos = 8,
        /// Note-on velocity, inverted.
        VelocityNeg = 9,
    }
}

encoded_enum! {
    /// How the mixer output amplitude is controlled.
    pub enum AmpControlMode: "AmpControlMode" {
        /// Constant maximum level.
        ConstMax = 0,
        /// Constant, lower level.
        ConstLow = 1,
        /// ENV1 scaled by note velocity.
        Env1Velocity = 2,
        /// ENV1 scaled by MIDI expression.
        Expression = 3,
    }
}

/// Fixed-size, NUL-padded preset name.
///
/// Serialized as a plain string; deserialization rejects names longer than
/// [`PRESET_NAME_MAX_LEN`] or containing non-printable characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresetName([u8; PRESET_NAME_SIZE]);

impl PresetName {
    /// Builds a name at compile time, truncating to [`PRESET_NAME_MAX_LEN`].
    pub const fn new(name: &str) -> Self {
        let src = name.as_bytes();
        let mut bytes = [0u8; PRESET_NAME_SIZE];
        let mut i = 0;
        while i < src.len() && i < PRESET_NAME_MAX_LEN {
            bytes[i] = src[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Wraps raw persisted bytes without checking them.
    pub const fn from_bytes(bytes: [u8; PRESET_NAME_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw persisted bytes.
    pub const fn as_bytes(&self) -> &[u8; PRESET_NAME_SIZE] {
        &self.0
    }

    /// Name length up to the first NUL.
    pub fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(PRESET_NAME_SIZE)
    }

    /// True for an empty name.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// True when the name is NUL-terminated within its 22 characters and
    /// every character is printable ASCII.
    pub fn is_valid(&self) -> bool {
        let len = self.len();
        len <= PRESET_NAME_MAX_LEN && self.0[..len].iter().all(|b| (0x20..0x7f).contains(b))
    }

    /// The name as text; empty when the bytes are not valid UTF-8.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0[..self.len()]).unwrap_or("")
    }
}

impl Default for PresetName {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl TryFrom<&str> for PresetName {
    type Error = ConfigError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        if name.len() > PRESET_NAME_MAX_LEN {
            return Err(ConfigError::InvalidName);
        }
        let parsed = Self::new(name);
        if parsed.is_valid() && parsed.len() == name.len() {
            Ok(parsed)
        } else {
            Err(ConfigError::InvalidName)
        }
    }
}

impl fmt::Debug for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PresetName({:?})", self.as_str())
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for PresetName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PresetName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NameVisitor;

        impl Visitor<'_> for NameVisitor {
            type Value = PresetName;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a printable name of at most {PRESET_NAME_MAX_LEN} characters")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PresetName, E> {
                PresetName::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(NameVisitor)
    }
}

/// A complete voice program.
///
/// Times are in milliseconds and levels in percent of full scale unless the
/// field says otherwise. Values are range-checked by
/// [`validate_patch`](crate::validate_patch) whenever a patch is loaded; the
/// engine trusts them afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchParams {
    /// Display name.
    pub name: PresetName,
    /// Per-oscillator frequency multiplier.
    pub osc_freq_mult: [OscFreqMult; OSC_COUNT],
    /// Per-oscillator amplitude modulation source.
    pub osc_ampld_mod_source: [OscModSource; OSC_COUNT],
    /// Per-oscillator detune in cents (-600..=600).
    pub osc_detune: [i16; OSC_COUNT],
    /// Per-oscillator mixer input step (0..=16, 3 dB per step).
    pub mixer_input_step: [u16; OSC_COUNT],

    /// ENV1 attack time.
    pub env_attack_time: u16,
    /// ENV1 peak hold time; zero goes straight from attack to decay.
    pub env_hold_time: u16,
    /// ENV1 decay time.
    pub env_decay_time: u16,
    /// ENV1 sustain level.
    pub env_sustain_level: u16,
    /// ENV1 release time.
    pub env_release_time: u16,
    /// Output amplitude control.
    pub amp_control_mode: AmpControlMode,

    /// Contour level before and during the delay.
    pub contour_start_level: u16,
    /// Contour delay after note-on.
    pub contour_delay_time: u16,
    /// Contour ramp time.
    pub contour_ramp_time: u16,
    /// Contour level after the ramp.
    pub contour_hold_level: u16,
    /// ENV2 decay time.
    pub env2_decay_time: u16,
    /// ENV2 sustain level.
    pub env2_sustain_level: u16,

    /// LFO frequency in tenths of a hertz (5..=250).
    pub lfo_freq_x10: u16,
    /// Automatic vibrato ramp-in time.
    pub lfo_ramp_time: u16,
    /// LFO frequency modulation depth in cents (0..=600).
    pub lfo_fm_depth: u16,
    /// LFO amplitude modulation depth.
    pub lfo_am_depth: u16,
    /// Mixer output gain in tenths (0..=100).
    pub mixer_out_gain_x10: u16,
    /// Limiter knee in percent of full scale; zero disables the limiter.
    pub limiter_level_pc: u16,
}

impl PatchParams {
    /// Neutral starting patch: one oscillator at the fundamental with an
    /// organ-like envelope.
    pub const INIT: Self = Self {
        name: PresetName::new("Init"),
        osc_freq_mult: [
            OscFreqMult::Unison,
            OscFreqMult::Two,
            OscFreqMult::Three,
            OscFreqMult::Four,
            OscFreqMult::Five,
            OscFreqMult::Six,
        ],
        osc_ampld_mod_source: [OscModSource::None; OSC_COUNT],
        osc_detune: [0; OSC_COUNT],
        mixer_input_step: [16, 0, 0, 0, 0, 0],
        env_attack_time: 10,
        env_hold_time: 0,
        env_decay_time: 200,
        env_sustain_level: 80,
        env_release_time: 200,
        amp_control_mode: AmpControlMode::Env1Velocity,
        contour_start_level: 0,
        contour_delay_time: 0,
        contour_ramp_time: 500,
        contour_hold_level: 100,
        env2_decay_time: 200,
        env2_sustain_level: 0,
        lfo_freq_x10: 50,
        lfo_ramp_time: 500,
        lfo_fm_depth: 20,
        lfo_am_depth: 0,
        mixer_out_gain_x10: 10,
        limiter_level_pc: 0,
    };
}

impl Default for PatchParams {
    fn default() -> Self {
        Self::INIT
    }
}

encoded_enum! {
    /// Identifier of a patch parameter in SysEx "set patch" commands.
    ///
    /// The first four apply to a single oscillator; the rest ignore the
    /// oscillator index.
    pub enum PatchParam: "PatchParam" {
        /// [`PatchParams::osc_freq_mult`]
        OscFreqMult = 0,
        /// [`PatchParams::osc_ampld_mod_source`]
        OscAmpldModSource = 1,
        /// [`PatchParams::osc_detune`]
        OscDetune = 2,
        /// [`PatchParams::mixer_input_step`]
        MixerInputStep = 3,
        /// [`PatchParams::env_attack_time`]
        EnvAttackTime = 10,
        /// [`PatchParams::env_hold_time`]
        EnvHoldTime = 11,
        /// [`PatchParams::env_decay_time`]
        EnvDecayTime = 12,
        /// [`PatchParams::env_sustain_level`]
        EnvSustainLevel = 13,
        /// [`PatchParams::env_release_time`]
        EnvReleaseTime = 14,
        /// [`PatchParams::amp_control_mode`]
        AmpControlMode = 15,
        /// [`PatchParams::contour_start_level`]
        ContourStartLevel = 20,
        /// [`PatchParams::contour_delay_time`]
        ContourDelayTime = 21,
        /// [`PatchParams::contour_ramp_time`]
        ContourRampTime = 22,
        /// [`PatchParams::contour_hold_level`]
        ContourHoldLevel = 23,
        /// [`PatchParams::env2_decay_time`]
        Env2DecayTime = 24,
        /// [`PatchParams::env2_sustain_level`]
        Env2SustainLevel = 25,
        /// [`PatchParams::lfo_freq_x10`]
        LfoFreqX10 = 30,
        /// [`PatchParams::lfo_ramp_time`]
        LfoRampTime = 31,
        /// [`PatchParams::lfo_fm_depth`]
        LfoFmDepth = 32,
        /// [`PatchParams::lfo_am_depth`]
        LfoAmDepth = 33,
        /// [`PatchParams::mixer_out_gain_x10`]
        MixerOutGainX10 = 34,
        /// [`PatchParams::limiter_level_pc`]
        LimiterLevelPc = 35,
    }
}

impl PatchParam {
    /// True for parameters addressed per oscillator.
    pub const fn is_per_oscillator(self) -> bool {
        (self as u8) < 10
    }
}

impl PatchParams {
    /// Sets one parameter from a raw edit value.
    ///
    /// `osc` selects the oscillator for per-oscillator parameters and is
    /// ignored otherwise. The edited patch is validated before it replaces
    /// `self`; on error nothing changes.
    pub fn set_param(&mut self, param: PatchParam, osc: u8, value: i32) -> Result<(), ConfigError> {
        let slot = usize::from(osc);
        if param.is_per_oscillator() && slot >= OSC_COUNT {
            return Err(ConfigError::OscIndex(osc));
        }

        let mut edited = *self;
        let unsigned = u16::try_from(value).unwrap_or(u16::MAX);
        match param {
            PatchParam::OscFreqMult => {
                edited.osc_freq_mult[slot] = OscFreqMult::from_code(unsigned)?;
            }
            PatchParam::OscAmpldModSource => {
                edited.osc_ampld_mod_source[slot] = OscModSource::from_code(unsigned)?;
            }
            PatchParam::OscDetune => {
                edited.osc_detune[slot] = i16::try_from(value).unwrap_or(i16::MAX);
            }
            PatchParam::MixerInputStep => edited.mixer_input_step[slot] = unsigned,
            PatchParam::EnvAttackTime => edited.env_attack_time = unsigned,
            PatchParam::EnvHoldTime => edited.env_hold_time = unsigned,
            PatchParam::EnvDecayTime => edited.env_decay_time = unsigned,
            PatchParam::EnvSustainLevel => edited.env_sustain_level = unsigned,
            PatchParam::EnvReleaseTime => edited.env_release_time = unsigned,
            PatchParam::AmpControlMode => {
                edited.amp_control_mode = AmpControlMode::from_code(unsigned)?;
            }
            PatchParam::ContourStartLevel => edited.contour_start_level = unsigned,
            PatchParam::ContourDelayTime => edited.contour_delay_time = unsigned,
            PatchParam::ContourRampTime => edited.contour_ramp_time = unsigned,
            PatchParam::ContourHoldLevel => edited.contour_hold_level = unsigned,
            PatchParam::Env2DecayTime => edited.env2_decay_time = unsigned,
            PatchParam::Env2SustainLevel => edited.env2_sustain_level = unsigned,
            PatchParam::LfoFreqX10 => edited.lfo_freq_x10 = unsigned,
            PatchParam::LfoRampTime => edited.lfo_ramp_time = unsigned,
            PatchParam::LfoFmDepth => edited.lfo_fm_depth = unsigned,
            PatchParam::LfoAmDepth => edited.lfo_am_depth = unsigned,
            PatchParam::MixerOutGainX10 => edited.mixer_out_gain_x10 = unsigned,
            PatchParam::LimiterLevelPc => edited.limiter_level_pc = unsigned,
        }
        crate::validation::validate_patch(&edited)?;
        *self = edited;
        Ok(())
    }
}
