//! WAV output for the sigma synth engine.
//!
//! This crate provides:
//!
//! - **Capture driver**: [`WavOutput`] implements [`AudioOutput`] and keeps
//!   every sample the engine emits as 16-bit PCM
//! - **WAV file I/O**: [`write_wav`], [`read_wav`] and [`read_wav_info`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sigma_io::WavOutput;
//! use sigma_synth::SynthEngine;
//!
//! let mut out = WavOutput::new();
//! engine.prepare_output(&mut out);
//! engine.note_on(60, 100);
//! for _ in 0..engine.sample_rate() {
//!     engine.tick(&mut out);
//! }
//! out.write("note.wav")?;
//! ```
//!
//! [`AudioOutput`]: sigma_synth::AudioOutput

mod wav;

pub use wav::{WavInfo, WavOutput, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file is not mono 16-bit integer PCM.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Nothing was captured, or the driver was never given a rate.
    #[error("Nothing to write: {0}")]
    Empty(&'static str),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
