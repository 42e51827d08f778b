//! Error types for configuration and patch operations.

#[cfg(feature = "std")]
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`ConfigStorage`](crate::ConfigStorage) device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No storage device is fitted (or the backing file does not exist).
    #[error("storage device not installed")]
    Absent,
    /// The device failed a read or write.
    #[error("storage device fault")]
    Device,
    /// The access falls outside the device's capacity.
    #[error("storage access out of bounds")]
    OutOfBounds,
}

/// Errors that can occur while decoding, validating or persisting
/// configuration and patch data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An encoded enumeration field holds an unknown code.
    #[error("invalid {field} code: {value}")]
    InvalidCode {
        /// Name of the field.
        field: &'static str,
        /// Offending raw value.
        value: u16,
    },

    /// A numeric field is outside its documented range.
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// Offending value.
        value: i32,
        /// Smallest accepted value.
        min: i32,
        /// Largest accepted value.
        max: i32,
    },

    /// A preset name is too long or not printable ASCII.
    #[error("invalid preset name")]
    InvalidName,

    /// A persisted image has the wrong length.
    #[error("layout size mismatch: {len} bytes (expected {expected})")]
    LayoutSize {
        /// Bytes supplied.
        len: usize,
        /// Bytes required.
        expected: usize,
    },

    /// A persisted image failed its integrity check.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Checksum {
        /// Check word found in the image.
        stored: u32,
        /// Check word computed over the payload.
        computed: u32,
    },

    /// Unknown parameter identifier in an edit command.
    #[error("unknown parameter id: {0}")]
    UnknownParam(u8),

    /// Oscillator index outside `0..OSC_COUNT`.
    #[error("oscillator index out of range: {0}")]
    OscIndex(u8),

    /// The storage device failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Failed to read a file
    #[cfg(feature = "std")]
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[cfg(feature = "std")]
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[cfg(feature = "std")]
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[cfg(feature = "std")]
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Preset table lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PresetError {
    /// Index past the end of the preset table.
    #[error("preset index {index} out of range (0..{count})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of presets available.
        count: usize,
    },
}

impl ConfigError {
    /// Create an out-of-range error.
    pub fn out_of_range(field: &'static str, value: i32, min: i32, max: i32) -> Self {
        ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// Create a read file error.
    #[cfg(feature = "std")]
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    #[cfg(feature = "std")]
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn out_of_range_display() {
        let err = ConfigError::out_of_range("PitchBendRange", 13, 1, 12);
        assert_eq!(
            err.to_string(),
            "PitchBendRange out of range: 13 (expected 1..=12)"
        );
    }

    #[test]
    fn invalid_code_display() {
        let err = ConfigError::InvalidCode {
            field: "OscFreqMult",
            value: 12,
        };
        assert_eq!(err.to_string(), "invalid OscFreqMult code: 12");
    }

    #[test]
    fn checksum_display_is_hex() {
        let err = ConfigError::Checksum {
            stored: 0xdead_beef,
            computed: 0x1,
        };
        let msg = err.to_string();
        assert!(msg.contains("0xdeadbeef"), "got: {msg}");
        assert!(msg.contains("0x00000001"), "got: {msg}");
    }

    #[test]
    fn preset_error_display() {
        let err = PresetError::OutOfRange { index: 12, count: 10 };
        assert_eq!(err.to_string(), "preset index 12 out of range (0..10)");
    }

    #[test]
    fn storage_error_converts() {
        let err: ConfigError = StorageError::Absent.into();
        assert!(matches!(err, ConfigError::Storage(StorageError::Absent)));
        assert!(err.source().is_some());
    }

    #[test]
    fn read_file_source_is_some() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mock");
        let err = ConfigError::read_file("/x", io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("failed to read file"));
    }
}
