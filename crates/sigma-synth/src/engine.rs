//! The synthesis engine: one monophonic voice plus its effect chain.
//!
//! [`SynthEngine`] owns every generator, the oscillator bank, mixer, reverb
//! and the staged patch. Control-path methods (`note_on`, `pitch_bend`,
//! `expression`, ...) only write state; [`SynthEngine::process`] reads it
//! once per tick and produces one sample.

use sigma_config::{AmpControlMode, ConfigParams, OSC_COUNT, PatchParams, VibratoMode};
use sigma_core::{
    FIXED_MAX_LEVEL, FIXED_ONE, Fixed, MAX_CLIPPING_LEVEL, cents_to_ratio_fine,
    fixed_from_percent, fixed_from_ratio, fixed_mul, int_to_fixed, midi_note_to_freq, soft_limit,
    square_law,
};

use crate::contour::ContourGenerator;
use crate::envelope::EnvelopeGenerator;
use crate::lfo::{Lfo, LfoWaveform, VibratoRamp};
use crate::mixer::{CLIP_KNEE_LEVEL, Mixer, amplitude_level, effective_amp_mode};
use crate::oscillator::{ModulationInputs, OscillatorBank, hz_to_phase_step, resolve_mod_source};
use crate::output::AudioOutput;
use crate::reverb::Reverb;
use crate::staged::StagedPatch;
use crate::transient::TransientGenerator;

/// Largest 14-bit controller value.
const CONTROLLER_MAX: u16 = 0x3FFF;

/// Response curve applied to velocity or expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseCurve {
    /// Level passes through unchanged.
    #[default]
    Linear,
    /// Square law: softer at low levels.
    Exponential,
}

impl ResponseCurve {
    /// Applies the curve to a normalized level.
    #[inline]
    pub fn apply(self, level: Fixed) -> Fixed {
        match self {
            Self::Linear => level,
            Self::Exponential => square_law(level),
        }
    }
}

/// Build-time engine options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Curve applied to note-on velocity.
    pub velocity_curve: ResponseCurve,
    /// Curve applied to the expression controllers.
    pub expression_curve: ResponseCurve,
    /// Treat every overlapping note as legato, regardless of CC68.
    pub legato_always: bool,
    /// Vibrato/tremolo LFO shape.
    pub lfo_waveform: LfoWaveform,
}

/// Monophonic six-oscillator synthesizer.
///
/// # Example
///
/// ```rust
/// use sigma_synth::{EngineOptions, SynthEngine, EnvPhase};
/// use sigma_config::{ConfigParams, PatchParams};
/// use sigma_core::{Fixed, MAX_CLIPPING_LEVEL};
///
/// let options = EngineOptions::default();
/// let mut engine = SynthEngine::new(32_000, &ConfigParams::DEFAULT, &PatchParams::INIT, options);
/// engine.note_on(60, 100);
///
/// let mut peak = Fixed::ZERO;
/// for _ in 0..3200 {
///     peak = peak.max(engine.process().abs());
/// }
/// assert!(peak > Fixed::ZERO && peak < MAX_CLIPPING_LEVEL);
///
/// engine.note_off();
/// assert_eq!(engine.envelope().phase(), EnvPhase::Release);
/// ```
#[derive(Debug, Clone)]
pub struct SynthEngine {
    sample_rate: u32,
    options: EngineOptions,
    config: ConfigParams,
    patch: StagedPatch,

    env1: EnvelopeGenerator,
    contour: ContourGenerator,
    env2: TransientGenerator,
    lfo: Lfo,
    vibrato_ramp: VibratoRamp,
    oscillators: OscillatorBank,
    mixer: Mixer,
    reverb: Reverb,

    // Derived from config + patch
    amp_mode: AmpControlMode,
    fm_depth_cents: Fixed,
    lfo_am_depth: Fixed,

    // Performance state
    note: Option<u8>,
    note_step: u32,
    bend: i16,
    velocity: Fixed,
    expression: Fixed,
    modulation: Fixed,
    aux_cv: Fixed,
}

impl SynthEngine {
    /// Builds an engine ticking at `sample_rate` with `patch` active.
    pub fn new(
        sample_rate: u32,
        config: &ConfigParams,
        patch: &PatchParams,
        options: EngineOptions,
    ) -> Self {
        let sample_rate = sample_rate.max(1);
        let mut engine = Self {
            sample_rate,
            options,
            config: *config,
            patch: StagedPatch::new(*patch),
            env1: EnvelopeGenerator::new(sample_rate),
            contour: ContourGenerator::new(sample_rate),
            env2: TransientGenerator::new(sample_rate),
            lfo: Lfo::with_waveform(sample_rate, options.lfo_waveform),
            vibrato_ramp: VibratoRamp::new(sample_rate),
            oscillators: OscillatorBank::new(sample_rate),
            mixer: Mixer::new(),
            reverb: Reverb::new(sample_rate),
            amp_mode: patch.amp_control_mode,
            fm_depth_cents: Fixed::ZERO,
            lfo_am_depth: Fixed::ZERO,
            note: None,
            note_step: 0,
            bend: 0,
            velocity: FIXED_MAX_LEVEL,
            expression: FIXED_MAX_LEVEL,
            modulation: Fixed::ZERO,
            aux_cv: Fixed::ZERO,
        };
        engine.apply_patch(patch);
        engine.set_config(config);
        engine
    }

    /// Tick rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Build options.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Replaces the configuration (reverb mix, amplitude override, bend
    /// range, vibrato mode, fine tuning).
    pub fn set_config(&mut self, config: &ConfigParams) {
        self.config = *config;
        self.reverb.set_mix_pc(config.reverb_mix_pc);
        self.amp_mode = effective_amp_mode(
            config.audio_ampld_ctrl_mode,
            self.patch.active().amp_control_mode,
        );
        self.refresh_pitch();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            amp_mode = ?config.audio_ampld_ctrl_mode,
            vibrato = ?config.vibrato_ctrl_mode,
            "engine config updated"
        );
    }

    /// Active configuration.
    pub fn config(&self) -> &ConfigParams {
        &self.config
    }

    /// Tells the driver the tick rate. Call once before the first [`tick`](Self::tick).
    pub fn prepare_output<O: AudioOutput + ?Sized>(&self, output: &mut O) {
        output.configure_rate(self.sample_rate);
    }

    /// Patch the engine is playing.
    pub fn active_patch(&self) -> &PatchParams {
        self.patch.active()
    }

    /// Staging buffer for patch edits; committed edits take effect on the
    /// next tick.
    pub fn staged_patch_mut(&mut self) -> &mut StagedPatch {
        &mut self.patch
    }

    /// Starts a note: sets its pitch, records velocity, triggers every
    /// generator and restarts the LFO and vibrato onset.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let level = fixed_from_ratio(i32::from(velocity.min(127)), 127).min(FIXED_MAX_LEVEL);
        self.velocity = self.options.velocity_curve.apply(level);
        self.set_note(note);
        self.trigger_attack();
        self.lfo_phase_sync();
        self.vibrato_ramp.note_on();
    }

    /// Moves to a new note without re-articulating (legato).
    pub fn note_change(&mut self, note: u8) {
        self.set_note(note);
    }

    /// Releases the current note.
    pub fn note_off(&mut self) {
        self.trigger_release();
    }

    /// Note currently sounding, if any has been played.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Sets the pitch bend, signed around the 14-bit center
    /// (`-8192..=8191`). The extremes bend by exactly the configured range,
    /// and a later range change rescales the held bend.
    pub fn pitch_bend(&mut self, bend: i16) {
        self.bend = bend.clamp(-8192, 8191);
        self.refresh_pitch();
    }

    /// Current pitch-bend offset in cents.
    pub fn bend_cents(&self) -> i32 {
        let bend = i32::from(self.bend);
        let span = i32::from(self.config.pitch_bend_range) * 100;
        if bend >= 0 { bend * span / 8191 } else { bend * span / 8192 }
    }

    /// Sets the expression level from a 14-bit controller value.
    pub fn expression(&mut self, value: u16) {
        let level = controller_level(value);
        self.expression = self.options.expression_curve.apply(level);
    }

    /// Sets the modulation wheel level from a 14-bit controller value.
    pub fn modulation(&mut self, value: u16) {
        self.modulation = controller_level(value);
    }

    /// Vibrato depth supplied by the CV input, used in
    /// [`VibratoMode::CvAuxIn`].
    pub fn set_aux_cv_level(&mut self, level: Fixed) {
        self.aux_cv = level.clamp(Fixed::ZERO, FIXED_MAX_LEVEL);
    }

    /// Sets the fundamental directly in Hz, bypassing note numbers.
    pub fn set_osc_frequency(&mut self, hz: f32) {
        self.note_step = hz_to_phase_step(hz, self.sample_rate);
        self.refresh_pitch();
    }

    /// Triggers ENV1 attack, the contour and ENV2.
    pub fn trigger_attack(&mut self) {
        self.env1.trigger_attack();
        self.contour.trigger();
        self.env2.trigger();
    }

    /// Triggers ENV1 release.
    pub fn trigger_release(&mut self) {
        self.env1.trigger_release();
    }

    /// Restarts the LFO at its rising zero crossing.
    pub fn lfo_phase_sync(&mut self) {
        self.lfo.phase_sync();
    }

    /// Silences everything immediately, including the reverb tail.
    pub fn all_sound_off(&mut self) {
        self.env1.reset();
        self.env2.reset();
        self.contour.reset();
        self.reverb.clear();
    }

    /// ENV1.
    pub fn envelope(&self) -> &EnvelopeGenerator {
        &self.env1
    }

    /// Contour generator.
    pub fn contour(&self) -> &ContourGenerator {
        &self.contour
    }

    /// ENV2.
    pub fn transient(&self) -> &TransientGenerator {
        &self.env2
    }

    /// Vibrato/tremolo LFO.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    /// Oscillator bank.
    pub fn oscillators(&self) -> &OscillatorBank {
        &self.oscillators
    }

    /// Computes one output sample.
    ///
    /// Swaps in a committed patch first, then advances every generator, the
    /// oscillators, mixer and reverb. The result is always below
    /// [`MAX_CLIPPING_LEVEL`] in magnitude.
    #[inline]
    pub fn process(&mut self) -> Fixed {
        if let Some(patch) = self.patch.take_pending().copied() {
            self.apply_patch(&patch);
        }

        let env1 = self.env1.advance();
        let contour = self.contour.advance();
        let env2 = self.env2.advance();
        let lfo = self.lfo.advance();
        let ramp = self.vibrato_ramp.advance();

        let vibrato_depth = match self.config.vibrato_ctrl_mode {
            VibratoMode::Disabled => Fixed::ZERO,
            VibratoMode::ModulationCc => self.modulation,
            VibratoMode::CvAuxIn => self.aux_cv,
            VibratoMode::Automatic => ramp,
        };
        let fm_factor = if vibrato_depth == Fixed::ZERO || self.fm_depth_cents == Fixed::ZERO {
            FIXED_ONE
        } else {
            let cents = fixed_mul(fixed_mul(Lfo::bipolar(lfo), vibrato_depth), self.fm_depth_cents);
            cents_to_ratio_fine(cents)
        };

        let inputs = ModulationInputs {
            contour,
            env2,
            modulation: self.modulation,
            expression: self.expression,
            velocity: self.velocity,
            lfo,
            lfo_am_depth: self.lfo_am_depth,
        };
        let sources = &self.patch.active().osc_ampld_mod_source;
        let amplitudes: [Fixed; OSC_COUNT] =
            core::array::from_fn(|osc| resolve_mod_source(sources[osc], &inputs));
        let samples = self.oscillators.advance(fm_factor, &amplitudes);

        let level = amplitude_level(self.amp_mode, env1, self.velocity, self.expression);
        let mixed = self.mixer.mix(&samples, level);
        let out = self.reverb.process(mixed);
        soft_limit(out, CLIP_KNEE_LEVEL, MAX_CLIPPING_LEVEL)
    }

    /// Computes one sample and hands it to `output`.
    #[inline]
    pub fn tick<O: AudioOutput + ?Sized>(&mut self, output: &mut O) {
        let sample = self.process();
        output.write_sample(sample);
    }

    fn set_note(&mut self, note: u8) {
        let note = note.min(127);
        self.note = Some(note);
        self.note_step = hz_to_phase_step(midi_note_to_freq(note), self.sample_rate);
        self.refresh_pitch();
    }

    fn apply_patch(&mut self, patch: &PatchParams) {
        self.env1.apply_patch(patch);
        self.contour.apply_patch(patch);
        self.env2.apply_patch(patch);
        self.lfo.set_freq_x10(patch.lfo_freq_x10);
        self.vibrato_ramp.set_ramp_ms(patch.lfo_ramp_time);
        self.mixer.apply_patch(patch);
        self.amp_mode =
            effective_amp_mode(self.config.audio_ampld_ctrl_mode, patch.amp_control_mode);
        self.fm_depth_cents = int_to_fixed(i32::from(patch.lfo_fm_depth));
        self.lfo_am_depth = fixed_from_percent(patch.lfo_am_depth.min(100));
        self.refresh_pitch();
    }

    fn refresh_pitch(&mut self) {
        let offset = self.bend_cents() + i32::from(self.config.fine_tuning_cents);
        self.oscillators.set_pitch(self.note_step, self.patch.active(), offset);
    }
}

/// Normalizes a 14-bit controller value to `[0, 1)`.
#[inline]
fn controller_level(value: u16) -> Fixed {
    Fixed::from_bits(i32::from(value.min(CONTROLLER_MAX)) << 6)
}
