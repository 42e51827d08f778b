//! Non-volatile configuration storage.
//!
//! The configuration image lives at a fixed offset of a small byte-addressed
//! device (an I2C EEPROM on the target). [`Settings`] owns the single live
//! [`ConfigParams`] and mediates every load and store.

use crate::config::{ConfigParam, ConfigParams};
use crate::error::{ConfigError, StorageError};
use crate::layout::{CONFIG_LAYOUT_SIZE, decode_config, encode_config};

/// Device offset of the configuration image.
pub const CONFIG_STORAGE_OFFSET: usize = 0;

/// Byte-addressed non-volatile storage device.
pub trait ConfigStorage {
    /// Fills `buf` from `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Writes `data` at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

/// In-memory storage of `N` bytes, erased to `0xFF` like a blank EEPROM.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> MemoryStorage<N> {
    /// Creates an erased device.
    pub const fn new() -> Self {
        Self { bytes: [0xFF; N] }
    }

    /// Raw device contents.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Mutable raw device contents.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ConfigStorage for MemoryStorage<N> {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let src = offset
            .checked_add(buf.len())
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(StorageError::OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let dst = offset
            .checked_add(data.len())
            .and_then(|end| self.bytes.get_mut(offset..end))
            .ok_or(StorageError::OutOfBounds)?;
        dst.copy_from_slice(data);
        Ok(())
    }
}

/// The live configuration plus its persistence state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    config: ConfigParams,
    eeprom_faulty: bool,
    store_requested: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Settings {
    /// Settings holding the built-in defaults, not marked faulty.
    pub const fn defaults() -> Self {
        Self {
            config: ConfigParams::DEFAULT,
            eeprom_faulty: false,
            store_requested: false,
        }
    }

    /// Loads the configuration from `storage`.
    ///
    /// Never fails: an unreadable, corrupt or out-of-range image yields the
    /// defaults with the faulty flag set.
    pub fn fetch<S: ConfigStorage + ?Sized>(storage: &mut S) -> Self {
        match Self::try_fetch(storage) {
            Ok(config) => Self {
                config,
                eeprom_faulty: false,
                store_requested: false,
            },
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "stored configuration unusable, using defaults");
                Self {
                    config: ConfigParams::DEFAULT,
                    eeprom_faulty: true,
                    store_requested: false,
                }
            }
        }
    }

    fn try_fetch<S: ConfigStorage + ?Sized>(storage: &mut S) -> Result<ConfigParams, ConfigError> {
        let mut image = [0u8; CONFIG_LAYOUT_SIZE];
        storage.read(CONFIG_STORAGE_OFFSET, &mut image)?;
        decode_config(&image)
    }

    /// Writes the configuration image to `storage` and clears any pending
    /// store request. A successful write also clears the faulty flag.
    pub fn store<S: ConfigStorage + ?Sized>(&mut self, storage: &mut S) -> Result<(), ConfigError> {
        let image = encode_config(&self.config);
        storage.write(CONFIG_STORAGE_OFFSET, &image)?;
        self.store_requested = false;
        self.eeprom_faulty = false;
        #[cfg(feature = "tracing")]
        tracing::debug!("configuration stored");
        Ok(())
    }

    /// The live configuration.
    pub fn config(&self) -> &ConfigParams {
        &self.config
    }

    /// Edits one parameter. Nothing is written to storage until a store.
    pub fn set_param(&mut self, param: ConfigParam, value: i32) -> Result<(), ConfigError> {
        self.config.set_param(param, value)
    }

    /// Records the preset to select at the next power-up.
    pub fn set_last_preset(&mut self, index: u8) {
        self.config.preset_last_selected = index.min(127);
    }

    /// Replaces the live configuration with the built-in defaults.
    pub fn restore_defaults(&mut self) {
        self.config = ConfigParams::DEFAULT;
        #[cfg(feature = "tracing")]
        tracing::info!("configuration restored to defaults");
    }

    /// Asks the polling loop to persist the configuration.
    pub fn request_store(&mut self) {
        self.store_requested = true;
    }

    /// True while a store is pending. Only a successful
    /// [`store`](Self::store) clears it.
    pub fn is_store_requested(&self) -> bool {
        self.store_requested
    }

    /// True when the last fetch fell back to defaults.
    pub fn is_eeprom_faulty(&self) -> bool {
        self.eeprom_faulty
    }
}
