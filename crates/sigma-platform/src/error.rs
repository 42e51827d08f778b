//! Error types for MIDI decoding and dispatch.

use sigma_config::{ConfigError, PresetError};
use thiserror::Error;

/// Reasons a MIDI message is discarded.
///
/// None of these are fatal: the polling loop logs them and moves on.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The first byte is not a status byte the decoder knows.
    #[error("unknown status byte {0:#04x}")]
    UnknownStatus(u8),

    /// The message is shorter or longer than its status byte implies.
    #[error("message length {actual} does not match expected {expected}")]
    LengthMismatch {
        /// Length implied by the status byte.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },

    /// A data byte has its top bit set.
    #[error("invalid data byte {0:#04x}")]
    DataByte(u8),

    /// Channel message for a channel this device is not listening on.
    #[error("message on channel {channel} ignored (receiving on {receive})")]
    WrongChannel {
        /// Channel of the message, 1..=16.
        channel: u8,
        /// Configured receive channel, 1..=16.
        receive: u8,
    },

    /// System exclusive addressed to another manufacturer.
    #[error("system exclusive for manufacturer {0:#04x} ignored")]
    SysexVendor(u8),

    /// System exclusive without its `0xF7` terminator.
    #[error("unterminated system exclusive message")]
    UnterminatedSysex,

    /// Unknown system exclusive command byte.
    #[error("unknown system exclusive command {0:#04x}")]
    UnknownCommand(u8),

    /// A parameter edit was rejected.
    #[error("parameter edit rejected: {0}")]
    Config(#[from] ConfigError),

    /// A preset select was rejected.
    #[error("preset select rejected: {0}")]
    Preset(#[from] PresetError),
}
