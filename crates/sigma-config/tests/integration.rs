//! Integration tests for sigma-config.
//!
//! These tests verify end-to-end functionality across modules.

use sigma_config::{
    CONFIG_LAYOUT_SIZE, CONFIG_STORAGE_OFFSET, ConfigError, ConfigParam, ConfigParams,
    ConfigStorage, FACTORY_PRESETS, FileStorage, MemoryStorage, PATCH_LAYOUT_SIZE, PatchParam,
    PatchParams, Settings, VibratoMode, decode_config, decode_patch, encode_config, encode_patch,
};
use tempfile::TempDir;

/// Every factory preset survives encode/decode unchanged, and re-encoding
/// the decoded patch gives the same bytes.
#[test]
fn test_factory_presets_layout_bit_identical() {
    for preset in &FACTORY_PRESETS {
        let image = encode_patch(preset);
        assert_eq!(image.len(), PATCH_LAYOUT_SIZE);
        let decoded = decode_patch(&image)
            .unwrap_or_else(|e| panic!("preset '{}' failed to decode: {e}", preset.name));
        assert_eq!(&decoded, preset);
        assert_eq!(encode_patch(&decoded), image);
    }
}

/// An edited patch round-trips through the persisted layout.
#[test]
fn test_edited_patch_round_trip() {
    let mut patch = FACTORY_PRESETS[4];
    patch.set_param(PatchParam::OscDetune, 1, -599).unwrap();
    patch.set_param(PatchParam::LimiterLevelPc, 0, 55).unwrap();
    patch.name = "Edited Clarinet".try_into().unwrap();

    let decoded = decode_patch(&encode_patch(&patch)).unwrap();
    assert_eq!(decoded, patch);
    assert_eq!(decoded.osc_detune[1], -599);
}

/// A corrupted configuration image loads as defaults with the faulty flag.
#[test]
fn test_checksum_mismatch_falls_back_to_defaults() {
    let mut eeprom = MemoryStorage::<128>::new();
    let mut settings = Settings::defaults();
    settings.set_param(ConfigParam::PitchBendRange, 9).unwrap();
    settings.store(&mut eeprom).unwrap();

    eeprom.as_bytes_mut()[CONFIG_STORAGE_OFFSET + 3] ^= 0x01;

    let reloaded = Settings::fetch(&mut eeprom);
    assert!(reloaded.is_eeprom_faulty());
    assert_eq!(*reloaded.config(), ConfigParams::DEFAULT);
}

/// Restoring defaults and storing again heals a faulty device.
#[test]
fn test_restore_defaults_heals_storage() {
    let mut eeprom = MemoryStorage::<128>::new();
    let mut settings = Settings::fetch(&mut eeprom);
    assert!(settings.is_eeprom_faulty());

    settings.restore_defaults();
    settings.store(&mut eeprom).unwrap();
    assert!(!settings.is_eeprom_faulty());
    assert!(!Settings::fetch(&mut eeprom).is_eeprom_faulty());
}

/// The config image decodes only when it is exactly the right size.
#[test]
fn test_config_image_decode() {
    let config = ConfigParams {
        vibrato_ctrl_mode: VibratoMode::CvAuxIn,
        cv3_is_velocity: true,
        ..ConfigParams::DEFAULT
    };
    let image = encode_config(&config);
    assert_eq!(image.len(), CONFIG_LAYOUT_SIZE);
    assert_eq!(decode_config(&image).unwrap(), config);

    let mut long = image.to_vec();
    long.push(0);
    assert!(matches!(
        decode_config(&long),
        Err(ConfigError::LayoutSize { .. })
    ));
}

/// Settings persist through the file-backed EEPROM across instances.
#[test]
fn test_file_storage_persists_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eeprom.bin");

    let mut storage = FileStorage::new(&path);
    let mut settings = Settings::fetch(&mut storage);
    assert!(settings.is_eeprom_faulty());
    settings.set_param(ConfigParam::ReverbMix, 40).unwrap();
    settings.store(&mut storage).unwrap();

    let mut reopened = FileStorage::new(&path);
    let reloaded = Settings::fetch(&mut reopened);
    assert!(!reloaded.is_eeprom_faulty());
    assert_eq!(reloaded.config().reverb_mix_pc, 40);

    let mut raw = [0u8; CONFIG_LAYOUT_SIZE];
    reopened.read(CONFIG_STORAGE_OFFSET, &mut raw).unwrap();
    assert_eq!(raw, encode_config(reloaded.config()));
}

/// Patches round-trip through TOML files.
#[test]
fn test_patch_toml_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patches").join("pad.toml");

    let patch = FACTORY_PRESETS[7];
    patch.save(&path).unwrap();
    assert!(path.exists());

    let loaded = PatchParams::load(&path).unwrap();
    assert_eq!(loaded, patch);
}

/// A TOML file naming an unknown enum code is rejected.
#[test]
fn test_patch_toml_unknown_variant() {
    let err = PatchParams::from_toml(r#"amp_control_mode = "loud""#).unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse(_)));
}
