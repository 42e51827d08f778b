//! Patch, preset and configuration model for the sigma synth engine.
//!
//! This crate owns every piece of user-editable data the engine consumes:
//! the active voice program ([`PatchParams`]), the process-wide settings
//! ([`ConfigParams`]), the factory preset table, and the byte layouts used to
//! persist them.
//!
//! # Features
//!
//! - **Patch model**: closed enums for oscillator multipliers, modulation
//!   sources and amplitude control, with SysEx parameter setters
//! - **Factory presets**: `static` table, looked up by index or name
//! - **Persisted layouts**: little-endian images sealed with a check word
//! - **Validation**: range checks run on every load path
//! - **Storage**: [`ConfigStorage`] device trait and the [`Settings`] owner
//!   that falls back to defaults when the stored image is unusable
//! - **Files** (`std`): TOML load/save and a file-backed EEPROM
//!
//! # no_std Support
//!
//! Everything except the [`file`] module works without `std`. Disable default
//! features for embedded targets:
//!
//! ```toml
//! [dependencies]
//! sigma-config = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use sigma_config::{decode_patch, encode_patch, factory_preset, MemoryStorage, Settings};
//!
//! let preset = factory_preset(3).unwrap();
//! let image = encode_patch(preset);
//! assert_eq!(decode_patch(&image).unwrap(), *preset);
//!
//! // A blank EEPROM falls back to defaults and is flagged
//! let mut eeprom = MemoryStorage::<256>::new();
//! let settings = Settings::fetch(&mut eeprom);
//! assert!(settings.is_eeprom_faulty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod config;
mod encoded;
mod error;
mod layout;
mod patch;
mod storage;

/// Factory presets bundled with the firmware image.
pub mod factory_presets;

/// Range checks for patches and configuration.
pub mod validation;

/// TOML files and the file-backed EEPROM.
#[cfg(feature = "std")]
pub mod file;

pub use config::{AudioAmpldCtrlMode, ConfigParam, ConfigParams, PitchBendMode, VibratoMode};
pub use error::{ConfigError, PresetError, StorageError};
pub use factory_presets::{FACTORY_PRESETS, factory_preset, find_preset, number_of_presets};
pub use layout::{
    CHECK_WORD_SIZE, CONFIG_LAYOUT_SIZE, CONFIG_PAYLOAD_SIZE, PATCH_LAYOUT_SIZE,
    PATCH_PAYLOAD_SIZE, checksum, decode_config, decode_patch, encode_config, encode_patch,
};
pub use patch::{
    AmpControlMode, OSC_COUNT, OscFreqMult, OscModSource, PRESET_NAME_MAX_LEN, PRESET_NAME_SIZE,
    PatchParam, PatchParams, PresetName,
};
pub use storage::{CONFIG_STORAGE_OFFSET, ConfigStorage, MemoryStorage, Settings};
pub use validation::{validate_config, validate_patch};

#[cfg(feature = "std")]
pub use file::FileStorage;
