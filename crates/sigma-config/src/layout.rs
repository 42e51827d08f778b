//! Persisted byte layouts for [`ConfigParams`] and [`PatchParams`].
//!
//! Both images are little-endian, packed field by field in declaration
//! order, and end with a 32-bit check word computed by [`checksum`] over
//! everything before it.
//!
//! | image  | payload   | check word | total |
//! |--------|-----------|------------|-------|
//! | config | 14 bytes  | 4 bytes    | 18    |
//! | patch  | 108 bytes | 4 bytes    | 112   |
//!
//! Decoding verifies the length and the check word, then decodes every
//! enumerated field and runs the range validator. A successful decode is
//! therefore always a usable, in-range value.

use crate::config::{AudioAmpldCtrlMode, ConfigParams, PitchBendMode, VibratoMode};
use crate::error::ConfigError;
use crate::patch::{
    AmpControlMode, OSC_COUNT, OscFreqMult, OscModSource, PRESET_NAME_SIZE, PatchParams,
    PresetName,
};
use crate::validation::{validate_config, validate_patch};

/// Size of the check word appended to every image.
pub const CHECK_WORD_SIZE: usize = 4;

/// Persisted configuration payload size.
pub const CONFIG_PAYLOAD_SIZE: usize = 14;

/// Persisted configuration image size, check word included.
pub const CONFIG_LAYOUT_SIZE: usize = CONFIG_PAYLOAD_SIZE + CHECK_WORD_SIZE;

/// Persisted patch payload size.
pub const PATCH_PAYLOAD_SIZE: usize = PRESET_NAME_SIZE + OSC_COUNT * 2 * 4 + 18 * 2;

/// Persisted patch image size, check word included.
pub const PATCH_LAYOUT_SIZE: usize = PATCH_PAYLOAD_SIZE + CHECK_WORD_SIZE;

const CHECKSUM_SEED: u32 = 0x5161_6D36;

/// Integrity check word over a payload.
///
/// Rotate-and-add fold: every byte influences all later bits, and swapped
/// or zeroed bytes change the result.
pub fn checksum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(CHECKSUM_SEED, |acc, &b| acc.rotate_left(5).wrapping_add(u32::from(b)))
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, data: &[u8]) {
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
    }

    fn u8(&mut self, v: u8) {
        self.bytes(&[v]);
    }

    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    fn i16(&mut self, v: i16) {
        self.bytes(&v.to_le_bytes());
    }

    /// Appends the check word over everything written so far.
    fn seal(&mut self) {
        let sum = checksum(&self.buf[..self.pos]);
        self.bytes(&sum.to_le_bytes());
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, ConfigError> {
        match self.u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ConfigError::InvalidCode {
                field,
                value: u16::from(other),
            }),
        }
    }
}

/// Checks length and check word, returning the payload.
fn verify(image: &[u8], expected: usize) -> Result<&[u8], ConfigError> {
    if image.len() != expected {
        return Err(ConfigError::LayoutSize {
            len: image.len(),
            expected,
        });
    }
    let (payload, word) = image.split_at(expected - CHECK_WORD_SIZE);
    let stored = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    let computed = checksum(payload);
    if stored != computed {
        return Err(ConfigError::Checksum { stored, computed });
    }
    Ok(payload)
}

/// Encodes a configuration into its persisted image.
pub fn encode_config(config: &ConfigParams) -> [u8; CONFIG_LAYOUT_SIZE] {
    let mut image = [0u8; CONFIG_LAYOUT_SIZE];
    let mut w = Writer::new(&mut image);
    w.u8(config.audio_ampld_ctrl_mode.code());
    w.u8(config.vibrato_ctrl_mode.code());
    w.u8(config.pitch_bend_mode.code());
    w.u8(config.pitch_bend_range);
    w.u8(config.reverb_mix_pc);
    w.u8(config.preset_last_selected);
    w.u8(config.pitch_cv_base_note);
    w.u8(u8::from(config.pitch_cv_quantize));
    w.u8(u8::from(config.cv_mode_auto_switch));
    w.u8(u8::from(config.cv3_is_velocity));
    w.i16(config.cv1_full_scale_mv);
    w.i16(config.fine_tuning_cents);
    w.seal();
    image
}

/// Decodes and validates a persisted configuration image.
pub fn decode_config(image: &[u8]) -> Result<ConfigParams, ConfigError> {
    let mut r = Reader::new(verify(image, CONFIG_LAYOUT_SIZE)?);
    let config = ConfigParams {
        audio_ampld_ctrl_mode: AudioAmpldCtrlMode::from_code(r.u8().into())?,
        vibrato_ctrl_mode: VibratoMode::from_code(r.u8().into())?,
        pitch_bend_mode: PitchBendMode::from_code(r.u8().into())?,
        pitch_bend_range: r.u8(),
        reverb_mix_pc: r.u8(),
        preset_last_selected: r.u8(),
        pitch_cv_base_note: r.u8(),
        pitch_cv_quantize: r.flag("PitchCV_Quantize")?,
        cv_mode_auto_switch: r.flag("CV_ModeAutoSwitch")?,
        cv3_is_velocity: r.flag("CV3_IsVelocity")?,
        cv1_full_scale_mv: r.i16(),
        fine_tuning_cents: r.i16(),
    };
    validate_config(&config)?;
    Ok(config)
}

/// Encodes a patch into its persisted image.
pub fn encode_patch(patch: &PatchParams) -> [u8; PATCH_LAYOUT_SIZE] {
    let mut image = [0u8; PATCH_LAYOUT_SIZE];
    let mut w = Writer::new(&mut image);
    w.bytes(patch.name.as_bytes());
    for mult in patch.osc_freq_mult {
        w.u16(mult.code().into());
    }
    for source in patch.osc_ampld_mod_source {
        w.u16(source.code().into());
    }
    for detune in patch.osc_detune {
        w.i16(detune);
    }
    for step in patch.mixer_input_step {
        w.u16(step);
    }
    for v in [
        patch.env_attack_time,
        patch.env_hold_time,
        patch.env_decay_time,
        patch.env_sustain_level,
        patch.env_release_time,
        patch.amp_control_mode.code().into(),
        patch.contour_start_level,
        patch.contour_delay_time,
        patch.contour_ramp_time,
        patch.contour_hold_level,
        patch.env2_decay_time,
        patch.env2_sustain_level,
        patch.lfo_freq_x10,
        patch.lfo_ramp_time,
        patch.lfo_fm_depth,
        patch.lfo_am_depth,
        patch.mixer_out_gain_x10,
        patch.limiter_level_pc,
    ] {
        w.u16(v);
    }
    w.seal();
    image
}

/// Decodes and validates a persisted patch image.
pub fn decode_patch(image: &[u8]) -> Result<PatchParams, ConfigError> {
    let mut r = Reader::new(verify(image, PATCH_LAYOUT_SIZE)?);
    let name = PresetName::from_bytes(r.take());

    let mut osc_freq_mult = [OscFreqMult::Unison; OSC_COUNT];
    for slot in &mut osc_freq_mult {
        *slot = OscFreqMult::from_code(r.u16())?;
    }
    let mut osc_ampld_mod_source = [OscModSource::None; OSC_COUNT];
    for slot in &mut osc_ampld_mod_source {
        *slot = OscModSource::from_code(r.u16())?;
    }
    let mut osc_detune = [0i16; OSC_COUNT];
    for slot in &mut osc_detune {
        *slot = r.i16();
    }
    let mut mixer_input_step = [0u16; OSC_COUNT];
    for slot in &mut mixer_input_step {
        *slot = r.u16();
    }

    let patch = PatchParams {
        name,
        osc_freq_mult,
        osc_ampld_mod_source,
        osc_detune,
        mixer_input_step,
        env_attack_time: r.u16(),
        env_hold_time: r.u16(),
        env_decay_time: r.u16(),
        env_sustain_level: r.u16(),
        env_release_time: r.u16(),
        amp_control_mode: AmpControlMode::from_code(r.u16())?,
        contour_start_level: r.u16(),
        contour_delay_time: r.u16(),
        contour_ramp_time: r.u16(),
        contour_hold_level: r.u16(),
        env2_decay_time: r.u16(),
        env2_sustain_level: r.u16(),
        lfo_freq_x10: r.u16(),
        lfo_ramp_time: r.u16(),
        lfo_fm_depth: r.u16(),
        lfo_am_depth: r.u16(),
        mixer_out_gain_x10: r.u16(),
        limiter_level_pc: r.u16(),
    };
    validate_patch(&patch)?;
    Ok(patch)
}
