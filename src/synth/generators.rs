//! Sample sources backed by the phase-accumulator synthesizer.
//!
//! Each generator implements [`SampleSource`] and is driven by the playback
//! engine's producer thread: one parameter snapshot per buffer fill, one
//! phase wrap per cycle.

use std::sync::Arc;

use crate::core::types::{Sample, PCM_MAX};
use crate::error::AudioError;
use crate::playback::SampleSource;
use crate::synth::oscillator::{Oscillator, TWO_PI};
use crate::synth::params::{ToneParams, ToneSnapshot};

/// Scale a unit-range value to 16-bit PCM: `round(value * amplitude * PCM_MAX)`.
#[inline]
fn pcm(value: f64, amplitude: f64) -> Sample {
    (value * amplitude * PCM_MAX).round() as Sample
}

/// Mono sine generator with live frequency and amplitude.
///
/// Reads the primary frequency and the left amplitude from its parameter
/// block. Fills mono buffers (one sample per frame).
pub struct ToneGenerator {
    params: Arc<ToneParams>,
    osc: Oscillator,
}

impl ToneGenerator {
    pub fn new(params: Arc<ToneParams>, sample_rate: u32) -> Self {
        Self {
            params,
            osc: Oscillator::new(sample_rate),
        }
    }
}

impl SampleSource for ToneGenerator {
    fn fill(&mut self, buffer: &mut [Sample]) {
        let snap = self.params.snapshot();
        for sample in buffer.iter_mut() {
            *sample = pcm(self.osc.sample(), snap.amplitude_left);
            self.osc.advance(snap.frequency);
        }
        self.osc.wrap();
    }
}

/// Stereo binaural generator: one shared frequency, amplitudes split by
/// balance, and the right channel offset in phase by the configured
/// millisecond delay.
///
/// Only the left phase accumulates; the right channel reads
/// `sin(phase + Δφ)` with `Δφ = 2π·f·(delayMs/1000)`, recomputed from the
/// snapshot so it follows frequency and delay changes. Fills interleaved
/// stereo buffers.
pub struct BinauralGenerator {
    params: Arc<ToneParams>,
    osc: Oscillator,
}

impl BinauralGenerator {
    pub fn new(params: Arc<ToneParams>, sample_rate: u32) -> Self {
        Self {
            params,
            osc: Oscillator::new(sample_rate),
        }
    }

    /// Right-channel phase offset in radians for a snapshot.
    #[inline]
    fn phase_offset(snap: &ToneSnapshot) -> f64 {
        TWO_PI * snap.frequency * (snap.delay_ms / 1000.0)
    }
}

impl SampleSource for BinauralGenerator {
    fn fill(&mut self, buffer: &mut [Sample]) {
        let snap = self.params.snapshot();
        let offset = Self::phase_offset(&snap);
        for frame in buffer.chunks_exact_mut(2) {
            frame[0] = pcm(self.osc.sample(), snap.amplitude_left);
            frame[1] = pcm(self.osc.sample_offset(offset), snap.amplitude_right);
            self.osc.advance(snap.frequency);
        }
        self.osc.wrap();
    }
}

/// Stereo generator with fully independent left and right tones.
///
/// Each channel carries its own frequency, amplitude, and phase
/// accumulator. Fills interleaved stereo buffers.
pub struct DualToneGenerator {
    params: Arc<ToneParams>,
    osc_left: Oscillator,
    osc_right: Oscillator,
}

impl DualToneGenerator {
    pub fn new(params: Arc<ToneParams>, sample_rate: u32) -> Self {
        Self {
            params,
            osc_left: Oscillator::new(sample_rate),
            osc_right: Oscillator::new(sample_rate),
        }
    }
}

impl SampleSource for DualToneGenerator {
    fn fill(&mut self, buffer: &mut [Sample]) {
        let snap = self.params.snapshot();
        for frame in buffer.chunks_exact_mut(2) {
            frame[0] = pcm(self.osc_left.sample(), snap.amplitude_left);
            frame[1] = pcm(self.osc_right.sample(), snap.amplitude_right);
            self.osc_left.advance(snap.frequency);
            self.osc_right.advance(snap.frequency_right);
        }
        self.osc_left.wrap();
        self.osc_right.wrap();
    }
}

/// Mono generator replaying one precomputed sine cycle through a wrapping
/// cursor.
///
/// The table is sized to `sample_rate / frequency` samples at construction;
/// frequency and amplitude are fixed for the generator's lifetime.
pub struct WavetableGenerator {
    table: Vec<Sample>,
    cursor: usize,
}

impl WavetableGenerator {
    /// Precompute one cycle of `frequency_hz` at the given rate.
    ///
    /// # Errors
    /// Returns [`AudioError::InvalidParameter`] when the cycle would contain
    /// no samples (non-positive frequency, or frequency above the sample
    /// rate).
    pub fn new(frequency_hz: f64, amplitude: f64, sample_rate: u32) -> Result<Self, AudioError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(AudioError::InvalidParameter(format!(
                "wavetable frequency must be positive, got {}",
                frequency_hz
            )));
        }
        let cycle_len = (sample_rate as f64 / frequency_hz) as usize;
        if cycle_len == 0 {
            return Err(AudioError::InvalidParameter(format!(
                "wavetable cycle is empty for {} Hz at {} Hz sample rate",
                frequency_hz, sample_rate
            )));
        }
        let table = (0..cycle_len)
            .map(|i| pcm((TWO_PI * i as f64 / cycle_len as f64).sin(), amplitude))
            .collect();
        Ok(Self { table, cursor: 0 })
    }

    /// Samples in one table cycle.
    pub fn cycle_len(&self) -> usize {
        self.table.len()
    }
}

impl SampleSource for WavetableGenerator {
    fn fill(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.table[self.cursor];
            self.cursor += 1;
            if self.cursor >= self.table.len() {
                self.cursor = 0;
            }
        }
    }
}
