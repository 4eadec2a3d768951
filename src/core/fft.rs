//! Iterative radix-2 Cooley-Tukey FFT over power-of-two-length complex buffers.

use std::f64::consts::PI;

use crate::core::complex::Complex;
use crate::error::AudioError;

/// Forward FFT engine for a fixed transform size.
///
/// Construction precomputes the bit-reversal permutation and twiddle-factor
/// tables; both are immutable afterwards and reused by every call to
/// [`transform`](Fft::transform).
///
/// # Errors
/// `Fft::new` fails with [`AudioError::InvalidFftSize`] unless the size is a
/// positive power of two.
///
/// # Example
/// ```
/// use tonescope::{Complex, Fft};
///
/// let fft = Fft::new(8).unwrap();
/// let mut buf = vec![Complex::ZERO; 8];
/// buf[0] = Complex::new(1.0, 0.0);
/// fft.transform(&mut buf).unwrap();
/// // An impulse has unit magnitude in every bin.
/// assert!(buf.iter().all(|c| (c.magnitude() - 1.0).abs() < 1e-12));
/// ```
#[derive(Debug, Clone)]
pub struct Fft {
    size: usize,
    /// For each index, its log2(size)-bit reversed counterpart.
    bit_reverse: Vec<usize>,
    /// `exp(-2πik/size)` for k in [0, size/2).
    twiddles: Vec<Complex>,
}

impl Fft {
    /// Create an engine for transforms of exactly `size` points.
    pub fn new(size: usize) -> Result<Self, AudioError> {
        if size == 0 || !size.is_power_of_two() {
            return Err(AudioError::InvalidFftSize(size));
        }

        let bits = size.trailing_zeros();
        let bit_reverse = (0..size)
            .map(|i| {
                let mut reversed = 0usize;
                let mut x = i;
                for _ in 0..bits {
                    reversed = (reversed << 1) | (x & 1);
                    x >>= 1;
                }
                reversed
            })
            .collect();

        let twiddles = (0..size / 2)
            .map(|k| Complex::exp(-2.0 * PI * k as f64 / size as f64))
            .collect();

        Ok(Self {
            size,
            bit_reverse,
            twiddles,
        })
    }

    /// The configured transform size.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward transform of a buffer of exactly `size` points.
    ///
    /// # Errors
    /// Returns [`AudioError::BufferLengthMismatch`] if the buffer length does
    /// not equal the configured size. The buffer is left untouched in that case.
    pub fn transform(&self, buffer: &mut [Complex]) -> Result<(), AudioError> {
        if buffer.len() != self.size {
            return Err(AudioError::BufferLengthMismatch {
                provided: buffer.len(),
                expected: self.size,
            });
        }

        // Permute into bit-reversed order. Swapping only when i < j visits
        // each pair exactly once.
        for i in 0..self.size {
            let j = self.bit_reverse[i];
            if i < j {
                buffer.swap(i, j);
            }
        }

        // Butterfly stages: len = 2, 4, ..., size.
        let mut len = 2;
        while len <= self.size {
            let half = len / 2;
            let stride = self.size / len;
            let mut block = 0;
            while block < self.size {
                let mut k = 0;
                for j in block..block + half {
                    let w = self.twiddles[k];
                    let a = buffer[j];
                    let b = w * buffer[j + half];
                    buffer[j] = a + b;
                    buffer[j + half] = a - b;
                    k += stride;
                }
                block += len;
            }
            len <<= 1;
        }

        Ok(())
    }
}
