#![forbid(unsafe_code)]
//! Real-time tone synthesis, looped-sample playback, and streaming
//! spectral analysis.
//!
//! `tonescope` generates test signals (mono, binaural with a phase
//! delay, independent dual tones, wavetable loops), replays decoded
//! recordings with per-channel amplitude and an inter-channel delay, and
//! captures live audio into a sliding Hann/FFT spectrum pipeline.
//! Control is lock-free: the controlling thread stores atomic parameters
//! while each worker thread snapshots them once per buffer cycle, paced
//! by blocking device I/O.
//!
//! # Quick Start
//!
//! Generate a second of a 440 Hz tone without touching any hardware:
//!
//! ```
//! use std::sync::Arc;
//! use tonescope::playback::SampleSource;
//! use tonescope::synth::{ToneGenerator, ToneParams};
//!
//! let params = Arc::new(ToneParams::new());
//! params.set_frequency(440.0);
//! params.set_amplitude(0.8);
//!
//! let mut generator = ToneGenerator::new(Arc::clone(&params), 44_100);
//! let mut buffer = vec![0i16; 44_100];
//! generator.fill(&mut buffer);
//! assert!(buffer.iter().any(|&s| s != 0));
//! ```
//!
//! # Spectral analysis
//!
//! ```
//! use tonescope::capture::SpectrumAnalyzer;
//!
//! let mut analyzer = SpectrumAnalyzer::new(2048, 44_100).unwrap();
//! let hop: Vec<i16> = (0..analyzer.hop())
//!     .map(|i| {
//!         let phase = 2.0 * std::f64::consts::PI * 430.66 * i as f64 / 44_100.0;
//!         (phase.sin() * 20_000.0) as i16
//!     })
//!     .collect();
//! let frame = analyzer.process_hop(&hop).unwrap();
//! assert_eq!(frame.bins().len(), 1024);
//! ```
//!
//! # Playing through a device
//!
//! ```no_run
//! use std::sync::Arc;
//! use tonescope::core::types::{ChannelLayout, StreamConfig};
//! use tonescope::device::CpalOutput;
//! use tonescope::playback::PlaybackEngine;
//! use tonescope::synth::{BinauralGenerator, ToneParams};
//!
//! # fn main() -> Result<(), tonescope::AudioError> {
//! let config = StreamConfig::playback(ChannelLayout::Stereo);
//! let device = CpalOutput::open(&config)?;
//!
//! let params = Arc::new(ToneParams::new());
//! let generator = BinauralGenerator::new(Arc::clone(&params), config.sample_rate);
//!
//! let mut engine = PlaybackEngine::new(config);
//! engine.start(device, generator)?;
//! params.set_delay_ms(0.5); // audible immediately
//! engine.stop();
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod core;
pub mod device;
pub mod error;
pub mod io;
pub mod media;
pub mod playback;
pub mod state;
pub mod synth;

pub use crate::capture::{
    CaptureEngine, FrameSlot, SpectralFrame, SpectrumAnalyzer, DEFAULT_FFT_SIZE,
};
pub use crate::core::types::{
    ChannelLayout, Sample, StreamConfig, DEFAULT_BUFFER_FRAMES, DEFAULT_SAMPLE_RATE, PCM_MAX,
};
pub use crate::core::{Complex, Fft};
pub use crate::error::AudioError;
pub use crate::media::{load_file, load_file_in_background, BackgroundLoad, RecordedAudio};
pub use crate::playback::{MixerParams, PlaybackEngine, RecordedMixer, SampleSource};
pub use crate::state::PlaybackPosition;
pub use crate::synth::{
    BinauralGenerator, DualToneGenerator, ToneGenerator, ToneParams, WavetableGenerator,
};

/// Render a source offline into an interleaved buffer of `frames` frames.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tonescope::synth::{DualToneGenerator, ToneParams};
/// use tonescope::ChannelLayout;
///
/// let params = Arc::new(ToneParams::new());
/// let mut source = DualToneGenerator::new(params, 44_100);
/// let rendered = tonescope::render(&mut source, ChannelLayout::Stereo, 4_410);
/// assert_eq!(rendered.len(), 8_820);
/// ```
pub fn render(
    source: &mut dyn SampleSource,
    channels: ChannelLayout,
    frames: usize,
) -> Vec<Sample> {
    let mut buffer = vec![0; frames * channels.count() as usize];
    source.fill(&mut buffer);
    buffer
}
