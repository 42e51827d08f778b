//! Sigma Synth - fixed-point synthesis engine for the sigma synthesizer
//!
//! One monophonic voice of six sine oscillators, shaped by three envelope
//! style generators and an LFO, followed by a mixer, limiter and reverb.
//! Everything on the audio path runs in Q12.20 fixed point and nothing
//! allocates after construction.
//!
//! # Core Components
//!
//! ## Generators
//!
//! Explicit phase + timer state machines, one instance per voice:
//!
//! - [`EnvelopeGenerator`] / [`EnvPhase`] - ENV1 amplitude envelope with peak hold
//! - [`ContourGenerator`] / [`ContourPhase`] - Delay-then-ramp modulation contour
//! - [`TransientGenerator`] / [`TransientPhase`] - ENV2 peak-and-decay transient
//! - [`Lfo`] / [`VibratoRamp`] - Vibrato/tremolo LFO and automatic vibrato onset
//!
//! ```rust
//! use sigma_synth::{EnvelopeGenerator, EnvPhase};
//!
//! let mut env = EnvelopeGenerator::new(32_000);
//! env.set_attack_ms(5);
//! env.trigger_attack();
//! for _ in 0..200 {
//!     env.advance();
//! }
//! assert_eq!(env.phase(), EnvPhase::Decay);
//! ```
//!
//! ## Sound Path
//!
//! - [`OscillatorBank`] - Six table-lookup sines with harmonic multipliers and detune
//! - [`resolve_mod_source`] - Maps each oscillator's amplitude source to a level
//! - [`Mixer`] - Stepped input levels, output gain, amplitude control and limiter
//! - [`Reverb`] - Feedback comb reverb
//!
//! ## Engine
//!
//! - [`SynthEngine`] - Owns every stage; control methods write state, [`SynthEngine::process`] ticks
//! - [`StagedPatch`] - Double buffer for atomic patch edits
//! - [`AudioOutput`] - Driver interface the engine writes samples to
//!
//! # Example
//!
//! ```rust
//! use sigma_synth::{AudioOutput, EngineOptions, SynthEngine};
//! use sigma_config::{ConfigParams, factory_preset};
//! use sigma_core::Fixed;
//!
//! struct Peak(Fixed);
//!
//! impl AudioOutput for Peak {
//!     fn configure_rate(&mut self, _sample_rate: u32) {}
//!     fn write_sample(&mut self, sample: Fixed) {
//!         self.0 = self.0.max(sample.abs());
//!     }
//! }
//!
//! let patch = factory_preset(1).unwrap();
//! let mut engine =
//!     SynthEngine::new(32_000, &ConfigParams::DEFAULT, patch, EngineOptions::default());
//! let mut out = Peak(Fixed::ZERO);
//! engine.prepare_output(&mut out);
//!
//! engine.note_on(69, 100);
//! for _ in 0..1600 {
//!     engine.tick(&mut out);
//! }
//! assert!(out.0 > Fixed::ZERO);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! sigma-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod contour;
pub mod engine;
pub mod envelope;
pub mod lfo;
pub mod mixer;
pub mod oscillator;
pub mod output;
pub mod reverb;
pub mod staged;
pub mod transient;

/// Tick rate of the reference hardware.
pub const DEFAULT_SAMPLE_RATE: u32 = 32_000;

// Re-export main types at crate root
pub use contour::{ContourGenerator, ContourPhase};
pub use engine::{EngineOptions, ResponseCurve, SynthEngine};
pub use envelope::{EnvPhase, EnvelopeGenerator, ms_to_samples};
pub use lfo::{Lfo, LfoWaveform, VIBRATO_ONSET_DELAY_MS, VibratoRamp, VibratoRampPhase};
pub use mixer::{CLIP_KNEE_LEVEL, CONST_LOW_LEVEL, Mixer, amplitude_level, effective_amp_mode};
pub use oscillator::{
    MAX_OSC_FREQ_HZ, ModulationInputs, OscillatorBank, hz_to_phase_step, max_osc_freq_hz,
    resolve_mod_source,
};
pub use output::AudioOutput;
pub use reverb::{REVERB_DELAY_MAX_SIZE, Reverb};
pub use staged::StagedPatch;
pub use transient::{TransientGenerator, TransientPhase};
