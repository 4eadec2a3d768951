//! Spectral frames and the latest-frame mailbox they travel through.

use std::sync::Mutex;

/// One spectrum snapshot: dB magnitudes for the first `fft_size / 2` bins.
///
/// Silent bins carry `f32::NEG_INFINITY`.
#[derive(Debug, Clone)]
pub struct SpectralFrame {
    bins: Vec<f32>,
    sample_rate: u32,
    fft_size: usize,
}

impl SpectralFrame {
    pub(crate) fn new(bins: Vec<f32>, sample_rate: u32, fft_size: usize) -> Self {
        Self {
            bins,
            sample_rate,
            fft_size,
        }
    }

    /// Magnitudes in dB, one per bin up to the Nyquist bin (exclusive).
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Center frequency of a bin in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// Index of the loudest finite bin, or `None` for a silent frame.
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &db) in self.bins.iter().enumerate() {
            if db.is_finite() && best.map_or(true, |(_, b)| db > b) {
                best = Some((i, db));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Single-frame mailbox between the capture worker and its consumer.
///
/// Publishing replaces any unconsumed frame, so a slow consumer sees the
/// latest spectrum rather than a growing backlog; the worker never waits.
pub struct FrameSlot {
    slot: Mutex<Option<SpectralFrame>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn publish(&self, frame: SpectralFrame) {
        *self.slot.lock().unwrap() = Some(frame);
    }

    /// Remove and return the latest frame, if one is waiting.
    pub fn take(&self) -> Option<SpectralFrame> {
        self.slot.lock().unwrap().take()
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bins: Vec<f32>) -> SpectralFrame {
        SpectralFrame::new(bins, 44_100, 2048)
    }

    #[test]
    fn test_take_consumes_the_frame() {
        let slot = FrameSlot::new();
        assert!(slot.take().is_none());

        slot.publish(frame(vec![1.0, 2.0]));
        assert!(slot.take().is_some());
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_publish_replaces_unconsumed_frame() {
        let slot = FrameSlot::new();
        slot.publish(frame(vec![1.0]));
        slot.publish(frame(vec![2.0]));

        let latest = slot.take().unwrap();
        assert_eq!(latest.bins(), &[2.0]);
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_peak_bin_ignores_silent_bins() {
        let f = frame(vec![f32::NEG_INFINITY, -40.0, -12.5, -60.0]);
        assert_eq!(f.peak_bin(), Some(2));
    }

    #[test]
    fn test_peak_bin_of_silence_is_none() {
        let f = frame(vec![f32::NEG_INFINITY; 8]);
        assert_eq!(f.peak_bin(), None);
    }

    #[test]
    fn test_bin_frequency_scales_linearly() {
        let f = frame(vec![0.0; 1024]);
        assert_eq!(f.bin_frequency(0), 0.0);
        let hz_per_bin = 44_100.0 / 2048.0;
        assert!((f.bin_frequency(100) - 100.0 * hz_per_bin).abs() < 1e-3);
    }
}
