//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use sigma_core::{Fixed, to_i16_sample};
use sigma_synth::AudioOutput;
use std::path::Path;

const BITS_PER_SAMPLE: u16 = 16;

fn pcm_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels);

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
    })
}

/// Write mono 16-bit PCM samples to a WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[i16], sample_rate: u32) -> Result<()> {
    let mut writer = WavWriter::create(path, pcm_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a mono 16-bit PCM WAV file, as written by [`write_wav`].
///
/// Returns the samples and the sample rate.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<i16>, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1
        || spec.bits_per_sample != BITS_PER_SAMPLE
        || spec.sample_format != SampleFormat::Int
    {
        return Err(Error::UnsupportedFormat(format!(
            "{} ch, {} bit {:?}",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }
    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((samples, spec.sample_rate))
}

/// Audio driver that captures the engine's output in memory.
///
/// Samples are converted to 16-bit PCM as they arrive. Call
/// [`write`](Self::write) once rendering is done.
#[derive(Debug, Clone, Default)]
pub struct WavOutput {
    sample_rate: u32,
    samples: Vec<i16>,
}

impl WavOutput {
    /// Creates an empty capture. The rate is set by the engine through
    /// [`AudioOutput::configure_rate`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty capture with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sample_rate: 0,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Rate announced by the engine, or 0 before configuration.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Captured samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of captured samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Captured length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value, normalized to `[0, 1]`.
    pub fn peak(&self) -> f32 {
        let peak = self
            .samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0);
        f32::from(peak) / 32768.0
    }

    /// Discards captured samples, keeping the rate.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Writes the capture to a WAV file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Empty("sample rate was never configured"));
        }
        if self.samples.is_empty() {
            return Err(Error::Empty("no samples captured"));
        }
        let path = path.as_ref();
        write_wav(path, &self.samples, self.sample_rate)?;
        tracing::info!(
            path = %path.display(),
            samples = self.samples.len(),
            sample_rate = self.sample_rate,
            "wrote WAV file"
        );
        Ok(())
    }
}

impl AudioOutput for WavOutput {
    fn configure_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    fn write_sample(&mut self, sample: Fixed) {
        self.samples.push(to_i16_sample(sample));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::FIXED_PT_HALF;
    use tempfile::NamedTempFile;

    #[test]
    fn test_capture_converts_to_pcm() {
        let mut out = WavOutput::new();
        out.configure_rate(32_000);
        out.write_sample(Fixed::ZERO);
        out.write_sample(FIXED_PT_HALF);
        out.write_sample(-FIXED_PT_HALF);
        assert_eq!(out.samples(), &[0, 16384, -16384]);
        assert_eq!(out.peak(), 0.5);
    }

    #[test]
    fn test_write_requires_rate_and_samples() {
        let file = NamedTempFile::new().unwrap();
        let mut out = WavOutput::new();
        out.write_sample(Fixed::ZERO);
        assert!(matches!(out.write(file.path()), Err(Error::Empty(_))));

        let mut out = WavOutput::new();
        out.configure_rate(32_000);
        assert!(matches!(out.write(file.path()), Err(Error::Empty(_))));
    }

    #[test]
    fn test_duration() {
        let mut out = WavOutput::with_capacity(16_000);
        assert_eq!(out.duration_secs(), 0.0);
        out.configure_rate(32_000);
        for _ in 0..16_000 {
            out.write_sample(Fixed::ZERO);
        }
        assert!((out.duration_secs() - 0.5).abs() < 1e-9);
        out.clear();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 32_000);
    }
}
