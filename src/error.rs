//! Error types for the tonescope crate.

use std::fmt;

/// Errors that can occur while synthesizing, playing, capturing, or decoding audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// FFT size must be a positive power of two.
    InvalidFftSize(usize),
    /// A buffer had the wrong length for the operation.
    BufferLengthMismatch { provided: usize, expected: usize },
    /// Invalid configuration value.
    InvalidParameter(String),
    /// No usable audio output device.
    DeviceUnavailable(String),
    /// No usable audio input device (capture fails closed).
    CaptureUnavailable(String),
    /// The device rejected the requested stream configuration.
    UnsupportedConfig(String),
    /// An engine was started while its worker thread was still running.
    AlreadyRunning,
    /// Playback was requested before a recorded store finished loading.
    NotLoaded,
    /// The source contains no audio track.
    NoAudioTrack,
    /// The decoder failed.
    DecodeFailed(String),
    /// I/O error.
    IoError(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::InvalidFftSize(n) => {
                write!(f, "invalid FFT size: {} (must be a positive power of two)", n)
            }
            AudioError::BufferLengthMismatch { provided, expected } => {
                write!(
                    f,
                    "buffer length mismatch: {} samples provided, {} expected",
                    provided, expected
                )
            }
            AudioError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            AudioError::DeviceUnavailable(msg) => write!(f, "output device unavailable: {}", msg),
            AudioError::CaptureUnavailable(msg) => write!(f, "input device unavailable: {}", msg),
            AudioError::UnsupportedConfig(msg) => {
                write!(f, "unsupported stream configuration: {}", msg)
            }
            AudioError::AlreadyRunning => write!(f, "engine is already running; stop it first"),
            AudioError::NotLoaded => write!(f, "no recorded audio loaded"),
            AudioError::NoAudioTrack => write!(f, "no audio track found"),
            AudioError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
            AudioError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::IoError(err.to_string())
    }
}
