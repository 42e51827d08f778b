//! Audio driver interface.

use sigma_core::Fixed;

/// Sink for the engine's output samples.
///
/// Implemented by the DAC driver on hardware and by file writers or test
/// recorders off-target. The engine never touches hardware directly.
pub trait AudioOutput {
    /// Called once before the first sample with the engine's tick rate.
    fn configure_rate(&mut self, sample_rate: u32);

    /// Accepts one sample in `[-1, 1)`.
    fn write_sample(&mut self, sample: Fixed);
}

impl<T: AudioOutput + ?Sized> AudioOutput for &mut T {
    fn configure_rate(&mut self, sample_rate: u32) {
        (**self).configure_rate(sample_rate);
    }

    fn write_sample(&mut self, sample: Fixed) {
        (**self).write_sample(sample);
    }
}
