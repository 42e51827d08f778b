//! Polling-side controller: turns MIDI into engine calls and settings edits.
//!
//! [`SynthController`] owns the engine, the live [`Settings`], the storage
//! device and the control-surface state. The audio side only ever calls
//! [`SynthController::tick`] (or the engine directly); everything else runs
//! from the main loop.

use sigma_config::{
    ConfigStorage, PitchBendMode, PresetError, Settings, factory_preset, number_of_presets,
};
use sigma_synth::{AudioOutput, EngineOptions, SynthEngine};

use crate::control_surface::{ControlSurface, MidiMode, cc};
use crate::error::MidiError;
use crate::midi::MidiMessage;
use crate::receiver::{MidiByteSource, MidiReceiver};
use crate::sysex::SysexCommand;

/// Power-up settings that do not live in the persisted configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerSetup {
    /// Engine tick rate in Hz.
    pub sample_rate: u32,
    /// Receive channel, 1..=16 (read from the channel switches on hardware).
    pub channel: u8,
    /// Receive mode.
    pub mode: MidiMode,
    /// Engine build options.
    pub engine: EngineOptions,
}

impl Default for ControllerSetup {
    fn default() -> Self {
        Self {
            sample_rate: sigma_synth::DEFAULT_SAMPLE_RATE,
            channel: 1,
            mode: MidiMode::default(),
            engine: EngineOptions::default(),
        }
    }
}

/// MIDI-driven controller for one [`SynthEngine`].
///
/// # Example
///
/// ```rust
/// use sigma_platform::{ControllerSetup, SynthController};
/// use sigma_config::MemoryStorage;
/// use sigma_synth::{AudioOutput, EnvPhase};
/// use sigma_core::Fixed;
///
/// struct Null;
/// impl AudioOutput for Null {
///     fn configure_rate(&mut self, _sample_rate: u32) {}
///     fn write_sample(&mut self, _sample: Fixed) {}
/// }
///
/// let mut synth =
///     SynthController::new(MemoryStorage::<64>::new(), ControllerSetup::default(), &mut Null);
/// // Blank storage: defaults, flagged faulty
/// assert!(synth.settings().is_eeprom_faulty());
///
/// synth.midi_input_service(&mut [0x90u8, 60, 100].into_iter());
/// assert_eq!(synth.engine().envelope().phase(), EnvPhase::Attack);
/// ```
#[derive(Debug)]
pub struct SynthController<S: ConfigStorage> {
    engine: SynthEngine,
    settings: Settings,
    storage: S,
    surface: ControlSurface,
    receiver: MidiReceiver,
    preset: usize,
}

impl<S: ConfigStorage> SynthController<S> {
    /// Starts up: fetches the configuration (falling back to defaults),
    /// selects the last used preset and configures the output driver.
    pub fn new<O: AudioOutput + ?Sized>(
        mut storage: S,
        setup: ControllerSetup,
        output: &mut O,
    ) -> Self {
        let settings = Settings::fetch(&mut storage);
        let preset =
            usize::from(settings.config().preset_last_selected).min(number_of_presets() - 1);
        let patch = factory_preset(preset).unwrap_or(&sigma_config::FACTORY_PRESETS[0]);

        let engine = SynthEngine::new(setup.sample_rate, settings.config(), patch, setup.engine);
        engine.prepare_output(output);

        #[cfg(feature = "tracing")]
        tracing::info!(
            preset,
            name = %patch.name,
            faulty = settings.is_eeprom_faulty(),
            "synth controller started"
        );

        Self {
            engine,
            settings,
            storage,
            surface: ControlSurface::new(setup.channel, setup.mode),
            receiver: MidiReceiver::new(),
            preset,
        }
    }

    /// The engine.
    pub fn engine(&self) -> &SynthEngine {
        &self.engine
    }

    /// The engine, for direct control calls (CV, test harnesses).
    pub fn engine_mut(&mut self) -> &mut SynthEngine {
        &mut self.engine
    }

    /// Live settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Control-surface state.
    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// Index of the selected factory preset.
    pub fn preset(&self) -> usize {
        self.preset
    }

    /// The storage device.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Gives the storage device back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Computes one sample and writes it to `output`.
    #[inline]
    pub fn tick<O: AudioOutput + ?Sized>(&mut self, output: &mut O) {
        self.engine.tick(output);
    }

    /// Drains `source`, dispatching each complete message. Malformed or
    /// unwanted messages are dropped. Returns the number of messages acted on.
    pub fn midi_input_service<B: MidiByteSource + ?Sized>(&mut self, source: &mut B) -> usize {
        let mut handled = 0;
        while let Some(byte) = source.read_byte() {
            let Some(msg) = self.receiver.push(byte) else {
                continue;
            };
            match self.process_midi_message(msg.as_bytes()) {
                Ok(()) => handled += 1,
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        error = %_err,
                        bytes = ?msg.as_bytes(),
                        "midi message discarded"
                    );
                }
            }
        }
        handled
    }

    /// Decodes and dispatches one complete message.
    ///
    /// On error nothing has been changed.
    pub fn process_midi_message(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        let message = MidiMessage::parse(bytes)?;
        if let Some(channel) = message.channel()
            && !self.surface.accepts(channel)
        {
            return Err(MidiError::WrongChannel {
                channel,
                receive: self.surface.channel(),
            });
        }

        match message {
            MidiMessage::NoteOn { note, velocity, .. } if velocity > 0 => {
                self.note_on(note, velocity);
            }
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => {
                self.note_off(note);
            }
            MidiMessage::ControlChange { controller, value, .. } => {
                self.process_control_change(controller, value);
            }
            MidiMessage::PitchBend { value, .. } => self.pitch_bend(value),
            MidiMessage::ProgramChange { program, .. } => {
                let last = number_of_presets() - 1;
                self.preset_select(usize::from(program).min(last))?;
            }
            MidiMessage::SystemExclusive(payload) => self.process_system_exclusive(payload)?,
            MidiMessage::PolyPressure { .. }
            | MidiMessage::ChannelPressure { .. }
            | MidiMessage::System(_) => {}
        }
        Ok(())
    }

    /// Applies one control change.
    ///
    /// Unknown controllers are ignored.
    pub fn process_control_change(&mut self, controller: u8, value: u8) {
        const MODULATION_LSB: u8 = cc::MODULATION + cc::LSB_OFFSET;
        const BREATH_LSB: u8 = cc::BREATH + cc::LSB_OFFSET;
        const VOLUME_LSB: u8 = cc::VOLUME + cc::LSB_OFFSET;
        const EXPRESSION_LSB: u8 = cc::EXPRESSION + cc::LSB_OFFSET;

        match controller {
            cc::MODULATION => {
                self.surface.set_modulation_msb(value);
                self.engine.modulation(self.surface.modulation());
            }
            MODULATION_LSB => {
                self.surface.set_modulation_lsb(value);
                self.engine.modulation(self.surface.modulation());
            }
            cc::BREATH | cc::VOLUME | cc::EXPRESSION => {
                self.surface.set_expression_msb(value);
                self.engine.expression(self.surface.expression());
            }
            BREATH_LSB | VOLUME_LSB | EXPRESSION_LSB => {
                self.surface.set_expression_lsb(value);
                self.engine.expression(self.surface.expression());
            }
            cc::LEGATO => self.surface.set_legato(value >= 64),
            cc::ALL_SOUND_OFF => {
                self.surface.release_all();
                self.engine.all_sound_off();
            }
            cc::ALL_NOTES_OFF => self.all_notes_off(),
            cc::OMNI_OFF | cc::OMNI_ON => {
                let mode = self.surface.mode().with_omni(controller == cc::OMNI_ON);
                self.set_mode(mode);
            }
            cc::MONO_ON | cc::POLY_ON => {
                let mode = self.surface.mode().with_mono(controller == cc::MONO_ON);
                self.set_mode(mode);
            }
            _ => {}
        }
    }

    /// Executes one system exclusive payload (the bytes between `F0` and
    /// `F7`).
    pub fn process_system_exclusive(&mut self, payload: &[u8]) -> Result<(), MidiError> {
        match SysexCommand::parse(payload)? {
            SysexCommand::SetConfig { param, value } => {
                self.settings.set_param(param, value)?;
                self.settings.request_store();
                self.engine.set_config(self.settings.config());
            }
            SysexCommand::SetPatch { param, osc, value } => {
                let staged = self.engine.staged_patch_mut();
                staged.edit().set_param(param, osc, value)?;
                staged.commit();
            }
            SysexCommand::StoreConfig => self.settings.request_store(),
            SysexCommand::RestoreDefaults => {
                self.settings.restore_defaults();
                self.engine.set_config(self.settings.config());
            }
        }
        Ok(())
    }

    /// Selects a factory preset: stages it for the engine's next tick and
    /// records it as the power-up preset.
    ///
    /// An index past the table leaves everything unchanged.
    pub fn preset_select(&mut self, index: usize) -> Result<(), PresetError> {
        let patch = factory_preset(index)?;
        self.engine.staged_patch_mut().stage(patch);
        self.preset = index;
        self.settings.set_last_preset(index as u8);
        self.settings.request_store();

        #[cfg(feature = "tracing")]
        tracing::info!(index, name = %patch.name, "preset selected");
        Ok(())
    }

    /// Writes the configuration if a store has been requested. Returns true
    /// when a write happened. A failed write leaves the request pending for
    /// the next call.
    pub fn service_storage(&mut self) -> Result<bool, sigma_config::ConfigError> {
        if !self.settings.is_store_requested() {
            return Ok(false);
        }
        if let Err(err) = self.settings.store(&mut self.storage) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "configuration store failed");
            return Err(err);
        }
        Ok(true)
    }

    fn note_on(&mut self, note: u8, velocity: u8) {
        let legato = self.surface.mode().is_mono()
            && self.surface.gate()
            && (self.engine.options().legato_always || self.surface.legato());
        if legato {
            self.engine.note_change(note);
        } else {
            self.engine.note_on(note, velocity);
        }
        self.surface.press(note);
    }

    fn note_off(&mut self, note: u8) {
        if self.surface.release(note) {
            self.engine.note_off();
        }
    }

    fn pitch_bend(&mut self, value: i16) {
        if self.settings.config().pitch_bend_mode == PitchBendMode::MidiMessage {
            self.surface.set_pitch_bend(value);
            self.engine.pitch_bend(value);
        }
    }

    fn all_notes_off(&mut self) {
        self.surface.release_all();
        self.engine.note_off();
    }

    fn set_mode(&mut self, mode: MidiMode) {
        // Mode messages imply all notes off
        self.all_notes_off();
        self.surface.set_mode(mode);
        #[cfg(feature = "tracing")]
        tracing::debug!(?mode, "midi mode changed");
    }
}
