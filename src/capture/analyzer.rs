//! Sliding-window spectrum analysis: Hann window, forward FFT, dB bins.

use crate::capture::frame::SpectralFrame;
use crate::core::fft::Fft;
use crate::core::types::Sample;
use crate::core::window::{apply_window, hann_window};
use crate::core::Complex;
use crate::error::AudioError;

/// Default analysis window length in samples.
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Turns a stream of capture hops into spectral frames.
///
/// Keeps an FFT-sized analysis window; each hop of `fft_size / 2` new
/// samples slides the window by half (50% overlap), so every sample is
/// analyzed twice. The window content is normalized to `[-1, 1)`,
/// Hann-weighted, transformed, and reduced to dB magnitudes for the bins
/// below Nyquist.
pub struct SpectrumAnalyzer {
    fft: Fft,
    window: Vec<f32>,
    analysis: Vec<f32>,
    windowed: Vec<f32>,
    scratch: Vec<Complex>,
    sample_rate: u32,
}

impl SpectrumAnalyzer {
    /// # Errors
    /// [`AudioError::InvalidFftSize`] unless `fft_size` is a power of two
    /// of at least 2.
    pub fn new(fft_size: usize, sample_rate: u32) -> Result<Self, AudioError> {
        if fft_size < 2 {
            return Err(AudioError::InvalidFftSize(fft_size));
        }
        let fft = Fft::new(fft_size)?;
        Ok(Self {
            fft,
            window: hann_window(fft_size),
            analysis: vec![0.0; fft_size],
            windowed: vec![0.0; fft_size],
            scratch: vec![Complex::ZERO; fft_size],
            sample_rate,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.analysis.len()
    }

    /// Samples consumed per [`process_hop`](SpectrumAnalyzer::process_hop)
    /// call.
    pub fn hop(&self) -> usize {
        self.analysis.len() / 2
    }

    /// Slide the analysis window by one hop and compute its spectrum.
    ///
    /// # Errors
    /// [`AudioError::BufferLengthMismatch`] unless `hop_samples` holds
    /// exactly [`hop`](SpectrumAnalyzer::hop) samples.
    pub fn process_hop(&mut self, hop_samples: &[Sample]) -> Result<SpectralFrame, AudioError> {
        let hop = self.hop();
        if hop_samples.len() != hop {
            return Err(AudioError::BufferLengthMismatch {
                provided: hop_samples.len(),
                expected: hop,
            });
        }

        let size = self.analysis.len();
        self.analysis.copy_within(hop.., 0);
        for (slot, &sample) in self.analysis[size - hop..].iter_mut().zip(hop_samples) {
            *slot = f32::from(sample) / 32768.0;
        }

        // Weight a scratch copy so the sliding window itself stays raw.
        self.windowed.copy_from_slice(&self.analysis);
        apply_window(&mut self.windowed, &self.window);
        for (slot, &value) in self.scratch.iter_mut().zip(&self.windowed) {
            *slot = Complex::new(f64::from(value), 0.0);
        }
        self.fft.transform(&mut self.scratch)?;

        let half = size / 2;
        let scale = half as f64;
        let mut bins = Vec::with_capacity(half);
        for value in &self.scratch[..half] {
            bins.push(magnitude_db(value.magnitude() / scale));
        }

        Ok(SpectralFrame::new(bins, self.sample_rate, size))
    }
}

/// Log-magnitude of a normalized bin; zero magnitude maps to the
/// negative-infinity sentinel rather than a NaN.
fn magnitude_db(normalized: f64) -> f32 {
    if normalized > 0.0 {
        (20.0 * normalized.log10()) as f32
    } else {
        f32::NEG_INFINITY
    }
}
