//! Fixed-size delay line for the reverb loop.
//!
//! The buffer length is a const generic so the line lives inline in its
//! owner: no heap, no allocation after construction.

use crate::fixed::Fixed;

/// Circular delay line of `N` fixed-point samples.
///
/// # Example
///
/// ```rust
/// use sigma_core::{FixedDelayLine, FIXED_PT_HALF, Fixed};
///
/// let mut delay: FixedDelayLine<8> = FixedDelayLine::new();
/// delay.write(FIXED_PT_HALF);
/// delay.write(Fixed::ZERO);
/// assert_eq!(delay.read(1), FIXED_PT_HALF);
/// ```
#[derive(Debug, Clone)]
pub struct FixedDelayLine<const N: usize> {
    buffer: [Fixed; N],
    write_pos: usize,
}

impl<const N: usize> FixedDelayLine<N> {
    /// Creates a silent delay line.
    pub const fn new() -> Self {
        Self {
            buffer: [Fixed::ZERO; N],
            write_pos: 0,
        }
    }

    /// Maximum delay in samples.
    pub const fn max_delay(&self) -> usize {
        N - 1
    }

    /// Writes one sample at the head.
    #[inline]
    pub fn write(&mut self, sample: Fixed) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % N;
    }

    /// Reads the sample written `delay` writes ago (0 = most recent),
    /// clamped to [`max_delay`](Self::max_delay).
    #[inline]
    pub fn read(&self, delay: usize) -> Fixed {
        let delay = delay.min(N - 1);
        self.buffer[(self.write_pos + N - delay - 1) % N]
    }

    /// Reads `delay` samples back, then writes `sample`.
    #[inline]
    pub fn read_write(&mut self, sample: Fixed, delay: usize) -> Fixed {
        let output = self.read(delay);
        self.write(sample);
        output
    }

    /// Silences the line.
    pub fn clear(&mut self) {
        self.buffer = [Fixed::ZERO; N];
        self.write_pos = 0;
    }
}

impl<const N: usize> Default for FixedDelayLine<N> {
    fn default() -> Self {
        Self::new()
    }
}
