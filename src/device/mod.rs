//! Blocking audio device abstraction.
//!
//! Engines drive devices through these traits and never touch the audio
//! backend directly, which keeps worker loops testable with scripted
//! devices.

pub mod cpal;

pub use self::cpal::{CpalInput, CpalOutput};

use crate::core::types::Sample;
use crate::error::AudioError;

/// A started output sink for interleaved 16-bit PCM.
///
/// Implementations move into the producer thread; dropping one releases
/// the underlying device.
pub trait OutputDevice: Send {
    /// Begin rendering. Called once, before the first write.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Block until the whole buffer is queued, returning the sample count.
    ///
    /// This is the producer's pacing point: it runs exactly as fast as the
    /// device drains.
    fn write(&mut self, buffer: &[Sample]) -> Result<usize, AudioError>;

    /// Stop rendering. Idempotent.
    fn stop(&mut self);
}

/// A started capture source for 16-bit PCM.
pub trait InputDevice: Send {
    /// Begin capturing. Called once, before the first read.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Block until `buffer` is full or the device closes; returns the
    /// sample count actually read (partial on close). An implementation
    /// that cannot block may return short reads; the capture loop waits
    /// briefly before retrying them.
    fn read(&mut self, buffer: &mut [Sample]) -> Result<usize, AudioError>;

    /// Stop capturing. Idempotent.
    fn stop(&mut self);
}
