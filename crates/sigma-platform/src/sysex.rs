//! System exclusive edit commands.
//!
//! Frames are `F0 73 <cmd> <args...> F7`. Values travel as 14-bit two's
//! complement split into two 7-bit bytes, most significant first.

use sigma_config::{ConfigParam, PatchParam};

use crate::error::MidiError;
use crate::midi::{SYSEX_END, SYSEX_MANUFACTURER_ID, SYSEX_START};

/// Command byte: set one configuration parameter.
pub const CMD_SET_CONFIG: u8 = 0x01;
/// Command byte: set one patch parameter.
pub const CMD_SET_PATCH: u8 = 0x02;
/// Command byte: persist the configuration.
pub const CMD_STORE_CONFIG: u8 = 0x03;
/// Command byte: restore the default configuration.
pub const CMD_RESTORE_DEFAULTS: u8 = 0x04;

/// Longest encoded command frame, terminator included.
pub const SYSEX_COMMAND_MAX_LEN: usize = 8;

/// Decodes a 14-bit two's complement value.
///
/// ```rust
/// use sigma_platform::sysex::{decode_value, encode_value};
///
/// assert_eq!(decode_value(0x7F, 0x7F), -1);
/// assert_eq!(encode_value(-1), (0x7F, 0x7F));
/// assert_eq!(decode_value(0x00, 0x64), 100);
/// ```
pub fn decode_value(msb: u8, lsb: u8) -> i32 {
    let raw = (i32::from(msb & 0x7F) << 7) | i32::from(lsb & 0x7F);
    if raw & 0x2000 != 0 { raw - 0x4000 } else { raw }
}

/// Splits a value into 14-bit two's complement MSB/LSB bytes. Values
/// outside `-8192..=8191` wrap.
pub fn encode_value(value: i32) -> (u8, u8) {
    let raw = value & 0x3FFF;
    (((raw >> 7) & 0x7F) as u8, (raw & 0x7F) as u8)
}

/// A decoded edit command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysexCommand {
    /// Set a configuration parameter and request a store.
    SetConfig {
        /// Parameter to change.
        param: ConfigParam,
        /// New value.
        value: i32,
    },
    /// Set a patch parameter in the staged patch and commit it.
    SetPatch {
        /// Parameter to change.
        param: PatchParam,
        /// Oscillator index, ignored for global parameters.
        osc: u8,
        /// New value.
        value: i32,
    },
    /// Persist the configuration.
    StoreConfig,
    /// Replace the configuration with the defaults.
    RestoreDefaults,
}

impl SysexCommand {
    /// Decodes a payload (the bytes between `F0` and `F7`).
    pub fn parse(payload: &[u8]) -> Result<Self, MidiError> {
        let (&vendor, body) = payload.split_first().ok_or(MidiError::LengthMismatch {
            expected: 2,
            actual: 0,
        })?;
        if vendor != SYSEX_MANUFACTURER_ID {
            return Err(MidiError::SysexVendor(vendor));
        }
        let (&cmd, args) = body.split_first().ok_or(MidiError::LengthMismatch {
            expected: 2,
            actual: 1,
        })?;

        let expect = |n: usize| {
            if args.len() == n {
                Ok(())
            } else {
                Err(MidiError::LengthMismatch {
                    expected: n + 2,
                    actual: payload.len(),
                })
            }
        };

        match cmd {
            CMD_SET_CONFIG => {
                expect(3)?;
                Ok(Self::SetConfig {
                    param: ConfigParam::from_code(u16::from(args[0]))?,
                    value: decode_value(args[1], args[2]),
                })
            }
            CMD_SET_PATCH => {
                expect(4)?;
                Ok(Self::SetPatch {
                    param: PatchParam::from_code(u16::from(args[0]))?,
                    osc: args[1],
                    value: decode_value(args[2], args[3]),
                })
            }
            CMD_STORE_CONFIG => expect(0).map(|()| Self::StoreConfig),
            CMD_RESTORE_DEFAULTS => expect(0).map(|()| Self::RestoreDefaults),
            other => Err(MidiError::UnknownCommand(other)),
        }
    }

    /// Writes the complete frame, `F0` to `F7`, into `buf` and returns its
    /// length.
    pub fn encode(&self, buf: &mut [u8; SYSEX_COMMAND_MAX_LEN]) -> usize {
        buf[0] = SYSEX_START;
        buf[1] = SYSEX_MANUFACTURER_ID;
        let len = match *self {
            Self::SetConfig { param, value } => {
                let (msb, lsb) = encode_value(value);
                buf[2..6].copy_from_slice(&[CMD_SET_CONFIG, param.code(), msb, lsb]);
                6
            }
            Self::SetPatch { param, osc, value } => {
                let (msb, lsb) = encode_value(value);
                buf[2..7].copy_from_slice(&[CMD_SET_PATCH, param.code(), osc & 0x7F, msb, lsb]);
                7
            }
            Self::StoreConfig => {
                buf[2] = CMD_STORE_CONFIG;
                3
            }
            Self::RestoreDefaults => {
                buf[2] = CMD_RESTORE_DEFAULTS;
                3
            }
        };
        buf[len] = SYSEX_END;
        len + 1
    }
}
