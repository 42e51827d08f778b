//! Host-side persistence: TOML patch/config files and a file-backed
//! stand-in for the EEPROM.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::ConfigParams;
use crate::error::{ConfigError, StorageError};
use crate::patch::PatchParams;
use crate::storage::ConfigStorage;
use crate::validation::{validate_config, validate_patch};

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    Ok(toml::from_str(&content)?)
}

fn save_toml<T: serde::Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| ConfigError::write_file(parent, e))?;
    }
    let content = toml::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

impl PatchParams {
    /// Loads and validates a patch from a TOML file.
    ///
    /// Missing fields take their values from [`PatchParams::INIT`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let patch: Self = load_toml(path.as_ref())?;
        validate_patch(&patch)?;
        Ok(patch)
    }

    /// Parses and validates a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let patch: Self = toml::from_str(toml_str)?;
        validate_patch(&patch)?;
        Ok(patch)
    }

    /// Saves the patch as TOML, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        save_toml(self, path.as_ref())
    }

    /// Renders the patch as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl ConfigParams {
    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_toml(path.as_ref())?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Saves the configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        save_toml(self, path.as_ref())
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// EEPROM emulated by a binary file of fixed capacity.
///
/// A missing file reads as [`StorageError::Absent`]; the first write creates
/// it, padded with `0xFF` up to the written range.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    capacity: usize,
}

impl FileStorage {
    /// Default emulated capacity (a 24LC16-sized device).
    pub const DEFAULT_CAPACITY: usize = 2048;

    /// Storage backed by `path` with the default capacity.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, Self::DEFAULT_CAPACITY)
    }

    /// Storage backed by `path` holding at most `capacity` bytes.
    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn range(&self, offset: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        offset
            .checked_add(len)
            .filter(|&end| end <= self.capacity)
            .map(|end| offset..end)
            .ok_or(StorageError::OutOfBounds)
    }
}

impl ConfigStorage for FileStorage {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = self.range(offset, buf.len())?;
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::Absent,
            _ => StorageError::Device,
        })?;
        // Bytes past the end of a short file read as erased.
        buf.fill(0xFF);
        if let Some(src) = bytes.get(range.start..range.end.min(bytes.len())) {
            buf[..src.len()].copy_from_slice(src);
        }
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = self.range(offset, data.len())?;
        let mut bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(_) => return Err(StorageError::Device),
        };
        if bytes.len() < range.end {
            bytes.resize(range.end, 0xFF);
        }
        bytes[range].copy_from_slice(data);
        fs::write(&self.path, bytes).map_err(|_| StorageError::Device)
    }
}
