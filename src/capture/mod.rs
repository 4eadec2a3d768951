//! Streaming capture: a consumer thread reads hops from an input device,
//! runs them through the spectrum analyzer, and publishes the latest
//! frame for display.

pub mod analyzer;
pub mod frame;

pub use analyzer::{SpectrumAnalyzer, DEFAULT_FFT_SIZE};
pub use frame::{FrameSlot, SpectralFrame};

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::device::InputDevice;
use crate::error::AudioError;
use crate::state::{join_with_timeout, StopFlag, JOIN_TIMEOUT};

/// Wait after a short read before asking the device again, so a
/// non-blocking device does not spin the consumer.
const SHORT_READ_WAIT: Duration = Duration::from_millis(1);

/// Streaming capture and analysis engine.
///
/// Mirrors the playback lifecycle: [`start`] spawns the single consumer
/// thread (failing with [`AudioError::AlreadyRunning`] while one is live),
/// [`stop`] requests a cooperative halt and joins with a bounded wait. The
/// input device moves into the worker and is released on every exit path.
/// Frames flow out through the engine's [`FrameSlot`], latest-wins.
///
/// [`start`]: CaptureEngine::start
/// [`stop`]: CaptureEngine::stop
pub struct CaptureEngine {
    fft_size: usize,
    sample_rate: u32,
    frames: Arc<FrameSlot>,
    stop: Arc<StopFlag>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CaptureEngine {
    /// # Errors
    /// [`AudioError::InvalidFftSize`] unless `fft_size` is a power of two
    /// of at least 2.
    pub fn new(fft_size: usize, sample_rate: u32) -> Result<Self, AudioError> {
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(AudioError::InvalidFftSize(fft_size));
        }
        Ok(Self {
            fft_size,
            sample_rate,
            frames: Arc::new(FrameSlot::new()),
            stop: Arc::new(StopFlag::new()),
            worker: None,
        })
    }

    /// Handle for consuming published frames.
    pub fn frames(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.frames)
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// True while the consumer thread is live.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.is_finished())
            .unwrap_or(false)
    }

    /// Start the device and spawn the consumer thread.
    ///
    /// A fresh analyzer is built per session, so stale window content never
    /// leaks across restarts. The device is started before the thread is
    /// spawned.
    ///
    /// # Errors
    /// [`AudioError::AlreadyRunning`] if a consumer is live; any error the
    /// device reports from [`InputDevice::start`].
    pub fn start<D>(&mut self, mut device: D) -> Result<(), AudioError>
    where
        D: InputDevice + 'static,
    {
        if self.is_running() {
            return Err(AudioError::AlreadyRunning);
        }
        if let Some(handle) = self.worker.take() {
            join_with_timeout(handle, JOIN_TIMEOUT);
        }

        let analyzer = SpectrumAnalyzer::new(self.fft_size, self.sample_rate)?;
        device.start()?;

        let stop = Arc::new(StopFlag::new());
        self.stop = Arc::clone(&stop);
        let frames = Arc::clone(&self.frames);

        self.worker = Some(thread::spawn(move || {
            run_consumer(device, analyzer, frames, stop);
        }));
        log::debug!(
            "capture started: {} Hz, fft size {}",
            self.sample_rate,
            self.fft_size
        );
        Ok(())
    }

    /// Request a stop and join the consumer with a bounded wait.
    ///
    /// Idempotent; a no-op before the first [`start`](CaptureEngine::start).
    pub fn stop(&mut self) {
        self.stop.set();
        if let Some(handle) = self.worker.take() {
            join_with_timeout(handle, JOIN_TIMEOUT);
            log::debug!("capture stopped");
        }
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_consumer<D>(mut device: D, mut analyzer: SpectrumAnalyzer, frames: Arc<FrameSlot>, stop: Arc<StopFlag>)
where
    D: InputDevice,
{
    let mut hop = vec![0; analyzer.hop()];
    while !stop.is_set() {
        match device.read(&mut hop) {
            Ok(n) if n == hop.len() => match analyzer.process_hop(&hop) {
                Ok(frame) => frames.publish(frame),
                Err(e) => {
                    log::error!("spectrum analysis failed: {e}");
                    break;
                }
            },
            // Short read: the device is closing or has nothing yet.
            Ok(_) => thread::sleep(SHORT_READ_WAIT),
            Err(e) => {
                log::warn!("input read failed, stopping capture: {e}");
                break;
            }
        }
    }
    device.stop();
}
