//! Control-plane primitives shared between a caller thread and a worker thread.
//!
//! Every engine in this crate follows the same pattern: one long-lived worker
//! thread paced by blocking device I/O, a [`StopFlag`] for cooperative
//! cancellation, and independently-updatable atomic scalars for live
//! parameters. All atomics use `Ordering::Relaxed`; no cross-field atomicity
//! is required, and workers snapshot parameters once per buffer cycle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Bounded wait applied when joining a worker thread on stop.
pub const JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Poll interval while waiting for a worker to finish.
const JOIN_POLL: Duration = Duration::from_millis(10);

/// Flag for signaling a worker thread to stop.
///
/// The worker observes it at the top of its loop, so exit lags the signal by
/// at most one blocking device write or read.
pub struct StopFlag {
    flag: AtomicBool,
}

impl StopFlag {
    pub fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// An `f64` stored as bits in an `AtomicU64`.
///
/// One instance per live parameter; readers may observe a torn *combination*
/// across parameters (old frequency with new amplitude), never a torn value.
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub(crate) fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Atomic frame cursor published by the recorded-sample mixer and polled by
/// a display consumer.
pub struct PlaybackPosition {
    frames: AtomicU64,
}

impl PlaybackPosition {
    pub fn new() -> Self {
        Self {
            frames: AtomicU64::new(0),
        }
    }

    pub fn store(&self, frames: usize) {
        self.frames.store(frames as u64, Ordering::Relaxed);
    }

    pub fn load(&self) -> usize {
        self.frames.load(Ordering::Relaxed) as usize
    }
}

impl Default for PlaybackPosition {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins a worker thread, giving up after `timeout`.
///
/// A worker blocked past the deadline is detached rather than waited on
/// forever; it still releases its device when it eventually exits, since the
/// device handle is owned by the worker closure.
pub(crate) fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            log::warn!("worker thread did not exit within {:?}; detaching", timeout);
            return;
        }
        std::thread::sleep(JOIN_POLL);
    }
    if handle.join().is_err() {
        log::error!("worker thread panicked");
    }
}
