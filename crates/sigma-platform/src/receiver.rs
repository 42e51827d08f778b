//! Byte-stream assembler for incoming MIDI.
//!
//! Handles running status, drops real-time bytes without disturbing the
//! message in progress, and discards truncated or oversized messages.

use crate::midi::{MIDI_MSG_MAX_LENGTH, MessageLength, SYSEX_END, is_realtime, message_length};

/// Source of received MIDI bytes, typically a UART receive FIFO.
pub trait MidiByteSource {
    /// Next byte, or `None` when nothing is waiting.
    fn read_byte(&mut self) -> Option<u8>;
}

impl<I: Iterator<Item = u8>> MidiByteSource for I {
    fn read_byte(&mut self) -> Option<u8> {
        self.next()
    }
}

/// One complete message as received, status byte first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMessage {
    bytes: [u8; MIDI_MSG_MAX_LENGTH],
    len: usize,
}

impl RawMessage {
    /// The message bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Assembles complete messages from single bytes.
///
/// # Example
///
/// ```rust
/// use sigma_platform::MidiReceiver;
///
/// let mut rx = MidiReceiver::new();
/// assert!(rx.push(0x90).is_none());
/// assert!(rx.push(60).is_none());
/// assert_eq!(rx.push(100).unwrap().as_bytes(), &[0x90, 60, 100]);
///
/// // Running status: the next note needs only its data bytes
/// rx.push(64);
/// assert_eq!(rx.push(100).unwrap().as_bytes(), &[0x90, 64, 100]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MidiReceiver {
    buf: [u8; MIDI_MSG_MAX_LENGTH],
    len: usize,
    expected: Option<MessageLength>,
    running_status: Option<u8>,
    overflow: bool,
}

impl MidiReceiver {
    /// Creates an idle receiver with no running status.
    pub const fn new() -> Self {
        Self {
            buf: [0; MIDI_MSG_MAX_LENGTH],
            len: 0,
            expected: None,
            running_status: None,
            overflow: false,
        }
    }

    /// Forgets any partial message and the running status.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds one byte; returns a message when this byte completes one.
    pub fn push(&mut self, byte: u8) -> Option<RawMessage> {
        if is_realtime(byte) {
            return None;
        }

        if byte & 0x80 != 0 {
            return self.push_status(byte);
        }

        if self.expected.is_none() {
            // Data byte outside a message: only valid under running status
            let status = self.running_status?;
            self.start(status);
        }
        self.append(byte);
        self.complete_fixed()
    }

    fn push_status(&mut self, status: u8) -> Option<RawMessage> {
        if status == SYSEX_END {
            let in_sysex = self.expected == Some(MessageLength::SystemExclusive) && !self.overflow;
            if in_sysex {
                self.append(SYSEX_END);
                if !self.overflow {
                    return Some(self.take());
                }
            }
            self.clear_message();
            return None;
        }

        // Any other status byte abandons a partial message
        self.clear_message();
        match status {
            0x80..=0xEF => self.running_status = Some(status),
            _ => self.running_status = None,
        }
        match message_length(status) {
            Ok(_) => {
                self.start(status);
                self.complete_fixed()
            }
            Err(_) => None,
        }
    }

    fn start(&mut self, status: u8) {
        self.clear_message();
        self.expected = message_length(status).ok();
        self.buf[0] = status;
        self.len = 1;
    }

    fn append(&mut self, byte: u8) {
        if self.len < MIDI_MSG_MAX_LENGTH {
            self.buf[self.len] = byte;
            self.len += 1;
        } else {
            self.overflow = true;
        }
    }

    fn complete_fixed(&mut self) -> Option<RawMessage> {
        match self.expected {
            Some(MessageLength::Fixed(n)) if self.len >= n => Some(self.take()),
            _ => None,
        }
    }

    fn take(&mut self) -> RawMessage {
        let msg = RawMessage {
            bytes: self.buf,
            len: self.len,
        };
        self.clear_message();
        msg
    }

    fn clear_message(&mut self) {
        self.len = 0;
        self.expected = None;
        self.overflow = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(rx: &mut MidiReceiver, bytes: &[u8]) -> Vec<Vec<u8>> {
        bytes
            .iter()
            .filter_map(|&b| rx.push(b))
            .map(|m| m.as_bytes().to_vec())
            .collect()
    }

    #[test]
    fn test_realtime_bytes_ignored_mid_message() {
        let mut rx = MidiReceiver::new();
        let out = feed(&mut rx, &[0xB0, 0xF8, 7, 0xFE, 100]);
        assert_eq!(out, vec![vec![0xB0, 7, 100]]);
    }

    #[test]
    fn test_running_status_across_messages() {
        let mut rx = MidiReceiver::new();
        let out = feed(&mut rx, &[0xE0, 0, 0x40, 0x10, 0x40, 0x7F, 0x7F]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[2], vec![0xE0, 0x7F, 0x7F]);
    }

    #[test]
    fn test_truncated_message_discarded() {
        let mut rx = MidiReceiver::new();
        let out = feed(&mut rx, &[0x90, 60, 0x80, 60, 0]);
        assert_eq!(out, vec![vec![0x80, 60, 0]]);
    }

    #[test]
    fn test_stray_data_without_status_ignored() {
        let mut rx = MidiReceiver::new();
        assert!(feed(&mut rx, &[60, 100, 0x40]).is_empty());
    }

    #[test]
    fn test_sysex_assembled_and_cancels_running_status() {
        let mut rx = MidiReceiver::new();
        let out = feed(&mut rx, &[0x90, 60, 100, 0xF0, 0x73, 0x03, 0xF7, 62, 100]);
        assert_eq!(out, vec![vec![0x90, 60, 100], vec![0xF0, 0x73, 0x03, 0xF7]]);
    }

    #[test]
    fn test_oversized_sysex_dropped() {
        let mut rx = MidiReceiver::new();
        let mut bytes = vec![0xF0];
        bytes.extend(core::iter::repeat(0x11).take(MIDI_MSG_MAX_LENGTH + 4));
        bytes.push(0xF7);
        bytes.extend([0xC0, 5]);
        assert_eq!(feed(&mut rx, &bytes), vec![vec![0xC0, 5]]);
    }

    #[test]
    fn test_single_byte_system_message() {
        let mut rx = MidiReceiver::new();
        assert_eq!(feed(&mut rx, &[0xF6]), vec![vec![0xF6]]);
    }
}
