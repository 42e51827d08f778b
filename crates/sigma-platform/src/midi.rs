//! MIDI message classification.
//!
//! [`message_length`] gives the length a status byte implies;
//! [`MidiMessage::parse`] turns one complete message into a typed event.
//! Channels are reported 1..=16, as on the front panel.

use crate::error::MidiError;

/// Longest message the receiver buffers, system exclusive included.
pub const MIDI_MSG_MAX_LENGTH: usize = 16;

/// Manufacturer ID this device answers to in system exclusive messages.
pub const SYSEX_MANUFACTURER_ID: u8 = 0x73;

/// Start of system exclusive.
pub const SYSEX_START: u8 = 0xF0;

/// End of system exclusive.
pub const SYSEX_END: u8 = 0xF7;

/// Pitch-bend center value on the wire.
pub const PITCH_BEND_CENTER: u16 = 0x2000;

/// Length of a message, as implied by its status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLength {
    /// Exactly this many bytes, status included.
    Fixed(usize),
    /// Runs until [`SYSEX_END`].
    SystemExclusive,
}

/// Expected length of the message starting with `status`.
///
/// # Example
///
/// ```rust
/// use sigma_platform::{message_length, MessageLength};
///
/// assert_eq!(message_length(0x90).unwrap(), MessageLength::Fixed(3));
/// assert_eq!(message_length(0xC5).unwrap(), MessageLength::Fixed(2));
/// assert_eq!(message_length(0xF0).unwrap(), MessageLength::SystemExclusive);
/// assert!(message_length(0x40).is_err());
/// ```
pub fn message_length(status: u8) -> Result<MessageLength, MidiError> {
    let length = match status {
        0x80..=0xBF | 0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        SYSEX_START => return Ok(MessageLength::SystemExclusive),
        0xF1 | 0xF3 => 2,
        0xF2 => 3,
        0xF6 | 0xF8..=0xFF => 1,
        _ => return Err(MidiError::UnknownStatus(status)),
    };
    Ok(MessageLength::Fixed(length))
}

/// True for single-byte real-time messages (clock, start, stop, ...), which
/// may appear anywhere in the stream.
#[inline]
pub fn is_realtime(byte: u8) -> bool {
    byte >= 0xF8
}

/// One decoded MIDI message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage<'a> {
    /// Note released.
    NoteOff {
        /// Channel, 1..=16.
        channel: u8,
        /// Note number.
        note: u8,
        /// Release velocity.
        velocity: u8,
    },
    /// Note struck. Velocity zero means note-off.
    NoteOn {
        /// Channel, 1..=16.
        channel: u8,
        /// Note number.
        note: u8,
        /// Strike velocity.
        velocity: u8,
    },
    /// Polyphonic key pressure.
    PolyPressure {
        /// Channel, 1..=16.
        channel: u8,
        /// Note number.
        note: u8,
        /// Pressure value.
        pressure: u8,
    },
    /// Control change.
    ControlChange {
        /// Channel, 1..=16.
        channel: u8,
        /// Controller number.
        controller: u8,
        /// Controller value.
        value: u8,
    },
    /// Program change.
    ProgramChange {
        /// Channel, 1..=16.
        channel: u8,
        /// Program number.
        program: u8,
    },
    /// Channel pressure.
    ChannelPressure {
        /// Channel, 1..=16.
        channel: u8,
        /// Pressure value.
        pressure: u8,
    },
    /// Pitch bend, signed around the center (`-8192..=8191`).
    PitchBend {
        /// Channel, 1..=16.
        channel: u8,
        /// Bend amount.
        value: i16,
    },
    /// System exclusive; the payload excludes `0xF0` and `0xF7`.
    SystemExclusive(&'a [u8]),
    /// Any other system common or real-time message.
    System(u8),
}

impl<'a> MidiMessage<'a> {
    /// Decodes one complete message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sigma_platform::MidiMessage;
    ///
    /// let msg = MidiMessage::parse(&[0xE0, 0x7F, 0x7F]).unwrap();
    /// assert_eq!(msg, MidiMessage::PitchBend { channel: 1, value: 8191 });
    /// ```
    pub fn parse(bytes: &'a [u8]) -> Result<Self, MidiError> {
        let (&status, data) = bytes.split_first().ok_or(MidiError::LengthMismatch {
            expected: 1,
            actual: 0,
        })?;

        let expected = match message_length(status)? {
            MessageLength::Fixed(len) => len,
            MessageLength::SystemExclusive => return Self::parse_sysex(data),
        };
        if bytes.len() != expected {
            return Err(MidiError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        if let Some(&bad) = data.iter().find(|&&b| b & 0x80 != 0) {
            return Err(MidiError::DataByte(bad));
        }

        let channel = (status & 0x0F) + 1;
        let d0 = data.first().copied().unwrap_or(0);
        let d1 = data.get(1).copied().unwrap_or(0);
        Ok(match status & 0xF0 {
            0x80 => Self::NoteOff { channel, note: d0, velocity: d1 },
            0x90 => Self::NoteOn { channel, note: d0, velocity: d1 },
            0xA0 => Self::PolyPressure { channel, note: d0, pressure: d1 },
            0xB0 => Self::ControlChange { channel, controller: d0, value: d1 },
            0xC0 => Self::ProgramChange { channel, program: d0 },
            0xD0 => Self::ChannelPressure { channel, pressure: d0 },
            0xE0 => {
                let raw = u16::from(d0) | (u16::from(d1) << 7);
                Self::PitchBend {
                    channel,
                    value: (i32::from(raw) - i32::from(PITCH_BEND_CENTER)) as i16,
                }
            }
            _ => Self::System(status),
        })
    }

    fn parse_sysex(data: &'a [u8]) -> Result<Self, MidiError> {
        match data.split_last() {
            Some((&SYSEX_END, payload)) => {
                if let Some(&bad) = payload.iter().find(|&&b| b & 0x80 != 0) {
                    return Err(MidiError::DataByte(bad));
                }
                Ok(Self::SystemExclusive(payload))
            }
            _ => Err(MidiError::UnterminatedSysex),
        }
    }

    /// Channel of a channel message, `None` for system messages.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::NoteOff { channel, .. }
            | Self::NoteOn { channel, .. }
            | Self::PolyPressure { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(channel),
            Self::SystemExclusive(_) | Self::System(_) => None,
        }
    }
}
