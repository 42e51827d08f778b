//! Integration tests for sigma-platform.
//!
//! Drive the controller end to end: raw MIDI bytes in, engine state and
//! stored configuration out.

use sigma_config::{
    CONFIG_LAYOUT_SIZE, ConfigError, ConfigParam, ConfigParams, ConfigStorage, FACTORY_PRESETS,
    MemoryStorage, PresetError, Settings, StorageError, decode_config, number_of_presets,
};
use sigma_core::Fixed;
use sigma_platform::{ControllerSetup, MidiMode, SynthController, SysexCommand};
use sigma_synth::{AudioOutput, EngineOptions, EnvPhase};

type Storage = MemoryStorage<256>;

#[derive(Default)]
struct Recorder {
    rate: u32,
    samples: Vec<Fixed>,
}

impl AudioOutput for Recorder {
    fn configure_rate(&mut self, sample_rate: u32) {
        self.rate = sample_rate;
    }

    fn write_sample(&mut self, sample: Fixed) {
        self.samples.push(sample);
    }
}

fn stored_config(config: &ConfigParams) -> Storage {
    let mut storage = Storage::new();
    let mut settings = Settings::defaults();
    for (param, value) in [
        (ConfigParam::PresetLastSelected, i32::from(config.preset_last_selected)),
        (ConfigParam::ReverbMix, i32::from(config.reverb_mix_pc)),
    ] {
        settings.set_param(param, value).unwrap();
    }
    settings.store(&mut storage).unwrap();
    storage
}

fn default_synth() -> SynthController<Storage> {
    SynthController::new(
        Storage::new(),
        ControllerSetup::default(),
        &mut Recorder::default(),
    )
}

fn send(synth: &mut SynthController<Storage>, bytes: &[u8]) -> usize {
    synth.midi_input_service(&mut bytes.iter().copied())
}

#[test]
fn legato_scenario_omni_off_mono() {
    let setup = ControllerSetup {
        channel: 1,
        mode: MidiMode::OmniOffMono,
        engine: EngineOptions {
            legato_always: true,
            ..EngineOptions::default()
        },
        ..ControllerSetup::default()
    };
    let mut out = Recorder::default();
    let mut synth = SynthController::new(Storage::new(), setup, &mut out);

    assert_eq!(send(&mut synth, &[0x90, 60, 100]), 1);
    assert_eq!(synth.engine().envelope().phase(), EnvPhase::Attack);
    synth.tick(&mut out);
    let step_60 = synth.engine().oscillators().base_step(0);

    // Running status carries the second note-on
    assert_eq!(send(&mut synth, &[64, 100]), 1);
    assert_eq!(synth.engine().note(), Some(64));
    assert!(synth.engine().oscillators().base_step(0) > step_60);
    for _ in 0..2000 {
        synth.tick(&mut out);
        assert_ne!(synth.engine().envelope().phase(), EnvPhase::Idle);
    }
    assert_ne!(synth.engine().envelope().phase(), EnvPhase::Attack);

    assert_eq!(send(&mut synth, &[0x80, 64, 0]), 1);
    assert_eq!(synth.engine().envelope().phase(), EnvPhase::Release);
    for _ in 0..100_000 {
        synth.tick(&mut out);
        if synth.engine().envelope().phase() == EnvPhase::Idle {
            break;
        }
    }
    assert_eq!(synth.engine().envelope().phase(), EnvPhase::Idle);
    assert_eq!(synth.engine().envelope().level(), Fixed::ZERO);
}

#[test]
fn released_old_note_does_not_cut_legato_note() {
    let setup = ControllerSetup {
        engine: EngineOptions {
            legato_always: true,
            ..EngineOptions::default()
        },
        ..ControllerSetup::default()
    };
    let mut synth = SynthController::new(Storage::new(), setup, &mut Recorder::default());
    send(&mut synth, &[0x90, 60, 100, 0x90, 64, 100, 0x80, 60, 0]);
    assert!(synth.surface().gate());
    assert_eq!(synth.engine().envelope().phase(), EnvPhase::Attack);
}

#[test]
fn out_of_range_preset_select_changes_nothing() {
    let storage = stored_config(&ConfigParams {
        preset_last_selected: 2,
        ..ConfigParams::DEFAULT
    });
    let image_before: [u8; CONFIG_LAYOUT_SIZE] =
        storage.as_bytes()[..CONFIG_LAYOUT_SIZE].try_into().unwrap();

    let mut synth = SynthController::new(
        storage,
        ControllerSetup::default(),
        &mut Recorder::default(),
    );
    let before = *synth.engine().active_patch();

    let err = synth.preset_select(number_of_presets()).unwrap_err();
    assert_eq!(
        err,
        PresetError::OutOfRange {
            index: number_of_presets(),
            count: number_of_presets()
        }
    );
    synth.engine_mut().process();
    assert_eq!(synth.engine().active_patch(), &before);
    assert_eq!(synth.preset(), 2);
    assert!(!synth.service_storage().unwrap());

    let storage = synth.into_storage();
    assert_eq!(&storage.as_bytes()[..CONFIG_LAYOUT_SIZE], &image_before);
    assert!(decode_config(&image_before).is_ok());
}

#[test]
fn startup_restores_last_preset_and_rate() {
    let storage = stored_config(&ConfigParams {
        preset_last_selected: 5,
        reverb_mix_pc: 40,
        ..ConfigParams::DEFAULT
    });
    let mut out = Recorder::default();
    let setup = ControllerSetup {
        sample_rate: 44_100,
        ..ControllerSetup::default()
    };
    let synth = SynthController::new(storage, setup, &mut out);

    assert_eq!(out.rate, 44_100);
    assert!(!synth.settings().is_eeprom_faulty());
    assert_eq!(synth.preset(), 5);
    assert_eq!(synth.engine().active_patch(), &FACTORY_PRESETS[5]);
    assert_eq!(synth.engine().config().reverb_mix_pc, 40);
}

#[test]
fn out_of_range_stored_preset_is_clamped() {
    let storage = stored_config(&ConfigParams {
        preset_last_selected: 100,
        ..ConfigParams::DEFAULT
    });
    let synth =
        SynthController::new(storage, ControllerSetup::default(), &mut Recorder::default());
    assert_eq!(synth.preset(), number_of_presets() - 1);
}

#[test]
fn preset_select_persists_after_service() {
    let mut synth = default_synth();
    assert!(synth.settings().is_eeprom_faulty());

    send(&mut synth, &[0xC0, 4]);
    assert!(synth.service_storage().unwrap());
    assert!(!synth.settings().is_eeprom_faulty());

    let mut storage = synth.into_storage();
    let reloaded = Settings::fetch(&mut storage);
    assert_eq!(reloaded.config().preset_last_selected, 4);
}

#[test]
fn sysex_restore_defaults_then_store() {
    let storage = stored_config(&ConfigParams {
        preset_last_selected: 0,
        reverb_mix_pc: 90,
        ..ConfigParams::DEFAULT
    });
    let mut synth = SynthController::new(
        storage,
        ControllerSetup::default(),
        &mut Recorder::default(),
    );
    assert_eq!(synth.settings().config().reverb_mix_pc, 90);

    for cmd in [SysexCommand::RestoreDefaults, SysexCommand::StoreConfig] {
        let mut buf = [0; 8];
        let len = cmd.encode(&mut buf);
        assert_eq!(send(&mut synth, &buf[..len]), 1);
    }
    assert!(synth.service_storage().unwrap());
    let mut storage = synth.into_storage();
    assert_eq!(Settings::fetch(&mut storage).config(), &ConfigParams::DEFAULT);
}

#[test]
fn garbage_between_messages_is_dropped() {
    let mut synth = default_synth();
    let bytes = [
        0x12, 0x34, // stray data
        0xF0, 0x41, 0x10, 0xF7, // other vendor's sysex
        0xF8, // clock
        0xB0, 1, 64, // modulation
        0xF4, // undefined
        0x90, 60, // truncated by the next status
        0xB0, 11, 0, // expression off
    ];
    assert_eq!(send(&mut synth, &bytes), 2);
    assert_eq!(synth.surface().modulation(), 64 << 7);
    assert_eq!(synth.surface().expression(), 0);
    assert_eq!(synth.engine().envelope().phase(), EnvPhase::Idle);
}

#[test]
fn all_notes_off_releases() {
    let mut synth = default_synth();
    send(&mut synth, &[0x90, 60, 100, 0xB0, 123, 0]);
    assert_eq!(synth.engine().envelope().phase(), EnvPhase::Release);
    assert!(!synth.surface().gate());
}

/// EEPROM whose first `failures` writes report a device fault.
struct FlakyStorage {
    inner: Storage,
    failures: u32,
    writes: u32,
}

impl ConfigStorage for FlakyStorage {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        self.inner.read(offset, buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(StorageError::Device);
        }
        self.writes += 1;
        self.inner.write(offset, data)
    }
}

#[test]
fn failed_store_is_retried_on_next_service() {
    let storage = FlakyStorage {
        inner: Storage::new(),
        failures: 1,
        writes: 0,
    };
    let mut synth =
        SynthController::new(storage, ControllerSetup::default(), &mut Recorder::default());
    synth.preset_select(2).unwrap();

    assert!(matches!(
        synth.service_storage(),
        Err(ConfigError::Storage(StorageError::Device))
    ));
    assert!(synth.settings().is_store_requested());
    assert!(synth.service_storage().unwrap());
    assert!(!synth.service_storage().unwrap());

    let mut storage = synth.into_storage();
    assert_eq!(storage.writes, 1);
    assert_eq!(Settings::fetch(&mut storage).config().preset_last_selected, 2);
}
