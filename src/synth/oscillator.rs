//! Phase-accumulator sine oscillator.

use std::f64::consts::PI;

pub(crate) const TWO_PI: f64 = 2.0 * PI;

/// Running phase angle advanced once per generated sample.
///
/// Owned exclusively by the playback thread; the phase persists across
/// buffer-fill cycles so the waveform stays continuous when parameters
/// change. Callers advance per sample and [`wrap`](Oscillator::wrap) once
/// per buffer cycle to keep the angle in `[0, 2π)` without paying for a
/// modulo on every sample.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Create an oscillator starting at phase zero.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            sample_rate: sample_rate as f64,
        }
    }

    /// Current phase in radians.
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// `sin(phase)` at the current position.
    #[inline]
    pub fn sample(&self) -> f64 {
        self.phase.sin()
    }

    /// `sin(phase + offset)` without advancing.
    ///
    /// The phase-delay binaural generator derives its right channel this way
    /// from the accumulating left phase.
    #[inline]
    pub fn sample_offset(&self, offset: f64) -> f64 {
        (self.phase + offset).sin()
    }

    /// Advance the phase by one sample period of `frequency_hz`.
    #[inline]
    pub fn advance(&mut self, frequency_hz: f64) {
        self.phase += TWO_PI * frequency_hz / self.sample_rate;
    }

    /// Wrap the phase back into `[0, 2π)`.
    ///
    /// Called once per buffer-fill cycle, not per sample.
    #[inline]
    pub fn wrap(&mut self) {
        self.phase = self.phase.rem_euclid(TWO_PI);
    }
}
