//! Core audio types and constants shared across the crate.

/// A single device-facing audio sample (16-bit signed linear PCM).
pub type Sample = i16;

/// Full-scale amplitude for 16-bit PCM output.
pub const PCM_MAX: f64 = i16::MAX as f64;

/// Default playback and capture sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default producer buffer size in frames (one buffer-fill cycle).
pub const DEFAULT_BUFFER_FRAMES: usize = 1024;

/// Lowest tone frequency exposed by the stock controls, in Hz.
pub const MIN_FREQUENCY_HZ: f64 = 44.0;

/// Highest tone frequency exposed by the stock controls, in Hz.
pub const MAX_FREQUENCY_HZ: f64 = 880.0;

/// Speaker layout of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// One sample per frame.
    Mono,
    /// Interleaved (L, R) pairs.
    Stereo,
}

impl ChannelLayout {
    /// Number of samples per frame.
    #[inline]
    pub fn count(&self) -> u16 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

/// Stream configuration passed to a device `open` call.
///
/// Encoding is fixed at 16-bit linear PCM ([`Sample`]); everything else is
/// plain data. `buffer_frames` is the size of one producer buffer-fill cycle;
/// device implementations buffer at least a few multiples of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel layout.
    pub channels: ChannelLayout,
    /// Frames per buffer-fill cycle.
    pub buffer_frames: usize,
}

impl StreamConfig {
    /// Playback configuration at the default sample rate and buffer size.
    pub fn playback(channels: ChannelLayout) -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
        }
    }

    /// Mono capture configuration sized for a spectral analysis hop
    /// (half the FFT size), at the default sample rate.
    pub fn capture(fft_size: usize) -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: ChannelLayout::Mono,
            buffer_frames: fft_size / 2,
        }
    }

    /// Samples per buffer-fill cycle (`buffer_frames * channels`).
    #[inline]
    pub fn buffer_samples(&self) -> usize {
        self.buffer_frames * self.channels.count() as usize
    }
}
