//! Sigma Platform - MIDI control layer for the sigma synth engine
//!
//! This crate sits between the MIDI input and the synthesis engine. It
//! assembles bytes into messages, filters them by channel and mode, and
//! turns them into engine calls, patch edits and configuration changes.
//!
//! # Core Abstractions
//!
//! ## Messages
//!
//! - [`MidiReceiver`] - Byte-at-a-time assembler with running status
//! - [`MidiMessage`] - Typed view of one complete message
//! - [`SysexCommand`] - Parameter edit and store commands (`F0 73 ... F7`)
//!
//! ## Control
//!
//! - [`SynthController`] - Owns the engine, settings and storage; dispatches messages
//! - [`ControlSurface`] / [`MidiMode`] - Channel, mode, gate and 14-bit controller state
//!
//! # Error Handling
//!
//! Every rejection is a [`MidiError`]. The controller never lets one escape
//! [`SynthController::midi_input_service`]: bad input is dropped and, with
//! the `tracing` feature, logged at debug level.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! sigma-platform = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use sigma_platform::{ControllerSetup, MidiMode, SynthController};
//! use sigma_config::MemoryStorage;
//! use sigma_synth::AudioOutput;
//! use sigma_core::Fixed;
//!
//! struct Samples(Vec<Fixed>);
//! impl AudioOutput for Samples {
//!     fn configure_rate(&mut self, _sample_rate: u32) {}
//!     fn write_sample(&mut self, sample: Fixed) {
//!         self.0.push(sample);
//!     }
//! }
//!
//! let setup = ControllerSetup {
//!     channel: 1,
//!     mode: MidiMode::OmniOffMono,
//!     ..ControllerSetup::default()
//! };
//! let mut out = Samples(Vec::new());
//! let mut synth = SynthController::new(MemoryStorage::<64>::new(), setup, &mut out);
//!
//! // Program 3, then middle C
//! let handled = synth.midi_input_service(&mut [0xC0u8, 3, 0x90, 60, 110].into_iter());
//! assert_eq!(handled, 2);
//! for _ in 0..320 {
//!     synth.tick(&mut out);
//! }
//! assert_eq!(synth.engine().active_patch().name.as_str(), "Brass Ensemble");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod control_surface;
pub mod controller;
pub mod error;
pub mod midi;
pub mod receiver;
pub mod sysex;

// Re-export main types at crate root
pub use control_surface::{ControlSurface, MidiMode, cc};
pub use controller::{ControllerSetup, SynthController};
pub use error::MidiError;
pub use midi::{
    MIDI_MSG_MAX_LENGTH, MessageLength, MidiMessage, PITCH_BEND_CENTER, SYSEX_MANUFACTURER_ID,
    message_length,
};
pub use receiver::{MidiByteSource, MidiReceiver, RawMessage};
pub use sysex::SysexCommand;
