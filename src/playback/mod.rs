//! Streaming playback: a producer thread pulls samples from a
//! [`SampleSource`] and pushes them through a blocking output device.
//!
//! The device's blocking write is the backpressure point; the producer
//! runs exactly as fast as the hardware consumes.

pub mod mixer;

pub use mixer::{MixerParams, MixerSnapshot, RecordedMixer};

use std::sync::Arc;
use std::thread;

use crate::core::types::{Sample, StreamConfig};
use crate::device::OutputDevice;
use crate::error::AudioError;
use crate::state::{join_with_timeout, StopFlag, JOIN_TIMEOUT};

/// Anything that can fill an interleaved PCM buffer.
///
/// Implementations are moved into the producer thread and called once per
/// buffer cycle. The buffer layout (mono or interleaved stereo) follows the
/// engine's [`StreamConfig`]; sources snapshot their shared parameters at
/// most once per call.
pub trait SampleSource: Send {
    fn fill(&mut self, buffer: &mut [Sample]);
}

/// Streaming playback engine.
///
/// Lifecycle is `Idle -> Playing -> Stopping -> Idle`: [`start`] spawns the
/// single producer thread (failing with [`AudioError::AlreadyRunning`] while
/// one is live), [`stop`] requests a cooperative halt and joins with a
/// bounded wait. The output device moves into the worker so it is released
/// on every exit path, including panic unwind.
///
/// [`start`]: PlaybackEngine::start
/// [`stop`]: PlaybackEngine::stop
pub struct PlaybackEngine {
    config: StreamConfig,
    stop: Arc<StopFlag>,
    worker: Option<thread::JoinHandle<()>>,
}

impl PlaybackEngine {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            stop: Arc::new(StopFlag::new()),
            worker: None,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// True while the producer thread is live.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.is_finished())
            .unwrap_or(false)
    }

    /// Start the device and spawn the producer thread.
    ///
    /// The device is started before the thread is spawned, so a device
    /// failure aborts cleanly with no worker left behind.
    ///
    /// # Errors
    /// [`AudioError::AlreadyRunning`] if a producer is live; any error the
    /// device reports from [`OutputDevice::start`].
    pub fn start<D, S>(&mut self, mut device: D, source: S) -> Result<(), AudioError>
    where
        D: OutputDevice + 'static,
        S: SampleSource + 'static,
    {
        if self.is_running() {
            return Err(AudioError::AlreadyRunning);
        }
        // Reap a worker that already ran to completion.
        if let Some(handle) = self.worker.take() {
            join_with_timeout(handle, JOIN_TIMEOUT);
        }

        device.start()?;

        let stop = Arc::new(StopFlag::new());
        self.stop = Arc::clone(&stop);
        let buffer_len = self.config.buffer_samples();

        self.worker = Some(thread::spawn(move || {
            run_producer(device, source, stop, buffer_len);
        }));
        log::debug!(
            "playback started: {} Hz, {:?}, {} frames/buffer",
            self.config.sample_rate,
            self.config.channels,
            self.config.buffer_frames
        );
        Ok(())
    }

    /// Request a stop and join the producer with a bounded wait.
    ///
    /// Idempotent; a no-op before the first [`start`](PlaybackEngine::start).
    pub fn stop(&mut self) {
        self.stop.set();
        if let Some(handle) = self.worker.take() {
            join_with_timeout(handle, JOIN_TIMEOUT);
            log::debug!("playback stopped");
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_producer<D, S>(mut device: D, mut source: S, stop: Arc<StopFlag>, buffer_len: usize)
where
    D: OutputDevice,
    S: SampleSource,
{
    let mut buffer = vec![0; buffer_len];
    while !stop.is_set() {
        source.fill(&mut buffer);
        if let Err(e) = device.write(&buffer) {
            log::warn!("output write failed, stopping playback: {e}");
            break;
        }
    }
    device.stop();
    // Dropping the device here releases it on every exit path.
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        fills: Arc<AtomicUsize>,
    }

    impl SampleSource for CountingSource {
        fn fill(&mut self, buffer: &mut [Sample]) {
            self.fills.fetch_add(1, Ordering::Relaxed);
            buffer.fill(7);
        }
    }

    struct SinkDevice {
        started: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
        writes: Arc<AtomicUsize>,
    }

    impl OutputDevice for SinkDevice {
        fn start(&mut self) -> Result<(), AudioError> {
            self.started.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn write(&mut self, buffer: &[Sample]) -> Result<usize, AudioError> {
            self.writes.fetch_add(1, Ordering::Relaxed);
            // Pace the producer like real hardware would.
            thread::sleep(Duration::from_millis(1));
            Ok(buffer.len())
        }

        fn stop(&mut self) {
            self.stopped.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct FailingDevice;

    impl OutputDevice for FailingDevice {
        fn start(&mut self) -> Result<(), AudioError> {
            Err(AudioError::DeviceUnavailable("no output".into()))
        }

        fn write(&mut self, _buffer: &[Sample]) -> Result<usize, AudioError> {
            Err(AudioError::DeviceUnavailable("no output".into()))
        }

        fn stop(&mut self) {}
    }

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        )
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let (started, stopped, writes) = counters();
        let fills = Arc::new(AtomicUsize::new(0));

        let mut engine = PlaybackEngine::new(StreamConfig::playback(
            crate::core::types::ChannelLayout::Mono,
        ));
        engine
            .start(
                SinkDevice {
                    started: Arc::clone(&started),
                    stopped: Arc::clone(&stopped),
                    writes: Arc::clone(&writes),
                },
                CountingSource {
                    fills: Arc::clone(&fills),
                },
            )
            .unwrap();

        assert!(engine.is_running());
        thread::sleep(Duration::from_millis(20));
        engine.stop();

        assert!(!engine.is_running());
        assert_eq!(started.load(Ordering::Relaxed), 1);
        assert_eq!(stopped.load(Ordering::Relaxed), 1);
        assert!(fills.load(Ordering::Relaxed) >= 1);
        assert_eq!(
            fills.load(Ordering::Relaxed),
            writes.load(Ordering::Relaxed)
        );
    }

    #[test]
    fn test_second_start_fails_while_running() {
        let (started, stopped, writes) = counters();
        let fills = Arc::new(AtomicUsize::new(0));

        let mut engine = PlaybackEngine::new(StreamConfig::playback(
            crate::core::types::ChannelLayout::Mono,
        ));
        engine
            .start(
                SinkDevice {
                    started,
                    stopped,
                    writes,
                },
                CountingSource {
                    fills: Arc::clone(&fills),
                },
            )
            .unwrap();

        let (s2, p2, w2) = counters();
        let err = engine.start(
            SinkDevice {
                started: Arc::clone(&s2),
                stopped: p2,
                writes: w2,
            },
            CountingSource { fills },
        );
        assert!(matches!(err, Err(AudioError::AlreadyRunning)));
        assert_eq!(s2.load(Ordering::Relaxed), 0);
        engine.stop();
    }

    #[test]
    fn test_device_start_failure_spawns_no_worker() {
        let fills = Arc::new(AtomicUsize::new(0));
        let mut engine = PlaybackEngine::new(StreamConfig::playback(
            crate::core::types::ChannelLayout::Stereo,
        ));
        let err = engine.start(
            FailingDevice,
            CountingSource {
                fills: Arc::clone(&fills),
            },
        );
        assert!(matches!(err, Err(AudioError::DeviceUnavailable(_))));
        assert!(!engine.is_running());
        assert_eq!(fills.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let mut engine = PlaybackEngine::new(StreamConfig::playback(
            crate::core::types::ChannelLayout::Mono,
        ));
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_restart_after_stop() {
        let fills = Arc::new(AtomicUsize::new(0));
        let mut engine = PlaybackEngine::new(StreamConfig::playback(
            crate::core::types::ChannelLayout::Mono,
        ));

        for _ in 0..2 {
            let (started, stopped, writes) = counters();
            engine
                .start(
                    SinkDevice {
                        started,
                        stopped: Arc::clone(&stopped),
                        writes,
                    },
                    CountingSource {
                        fills: Arc::clone(&fills),
                    },
                )
                .unwrap();
            thread::sleep(Duration::from_millis(5));
            engine.stop();
            assert_eq!(stopped.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn test_write_error_stops_worker_and_releases_device() {
        struct ErrorAfterOne {
            stopped: Arc<AtomicUsize>,
            wrote: bool,
        }
        impl OutputDevice for ErrorAfterOne {
            fn start(&mut self) -> Result<(), AudioError> {
                Ok(())
            }
            fn write(&mut self, buffer: &[Sample]) -> Result<usize, AudioError> {
                if self.wrote {
                    Err(AudioError::DeviceUnavailable("gone".into()))
                } else {
                    self.wrote = true;
                    Ok(buffer.len())
                }
            }
            fn stop(&mut self) {
                self.stopped.fetch_add(1, Ordering::Relaxed);
            }
        }

        let stopped = Arc::new(AtomicUsize::new(0));
        let fills = Arc::new(AtomicUsize::new(0));
        let mut engine = PlaybackEngine::new(StreamConfig::playback(
            crate::core::types::ChannelLayout::Mono,
        ));
        engine
            .start(
                ErrorAfterOne {
                    stopped: Arc::clone(&stopped),
                    wrote: false,
                },
                CountingSource {
                    fills: Arc::clone(&fills),
                },
            )
            .unwrap();

        // The worker hits the write error on its second cycle and exits.
        for _ in 0..100 {
            if !engine.is_running() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!engine.is_running());
        assert_eq!(stopped.load(Ordering::Relaxed), 1);
        assert_eq!(fills.load(Ordering::Relaxed), 2);
        engine.stop();
    }
}
