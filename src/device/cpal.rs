//! cpal-backed devices, bridged through SPSC rings.
//!
//! cpal streams are not `Send`, so each device spawns a dedicated owner
//! thread that builds the stream, holds it while the session runs, and
//! drops it on close. The engine-facing handle exchanges samples with the
//! audio callback purely through the ring, which keeps the handle `Send`
//! and movable into a worker thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleRate;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

use crate::core::types::{Sample, StreamConfig};
use crate::device::{InputDevice, OutputDevice};
use crate::error::AudioError;
use crate::state::{join_with_timeout, JOIN_TIMEOUT};

/// Ring capacity in engine buffers; the slack lets the producer run ahead
/// of the callback without stalling on every cycle.
const RING_BUFFERS: usize = 4;

/// Wait between retries when the ring is full (output) or empty (input).
const RING_WAIT: Duration = Duration::from_millis(1);

/// Poll interval of the stream-owner thread waiting for close.
const OWNER_POLL: Duration = Duration::from_millis(10);

type RingProd = ringbuf::HeapProd<Sample>;
type RingCons = ringbuf::HeapCons<Sample>;

fn cpal_config(config: &StreamConfig) -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: config.channels.count(),
        sample_rate: SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    }
}

/// Default output device as a blocking [`OutputDevice`].
///
/// Closed once stopped; open a fresh one per playback session.
pub struct CpalOutput {
    producer: RingProd,
    active: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    owner: Option<thread::JoinHandle<()>>,
}

impl CpalOutput {
    /// Open the default output device with the given stream shape.
    ///
    /// The stream starts silent; [`OutputDevice::start`] ungates it.
    ///
    /// # Errors
    /// [`AudioError::DeviceUnavailable`] when no output device exists or
    /// the stream cannot start; [`AudioError::UnsupportedConfig`] when the
    /// device refuses the 16-bit stream shape.
    pub fn open(config: &StreamConfig) -> Result<Self, AudioError> {
        let rb = HeapRb::<Sample>::new(config.buffer_samples() * RING_BUFFERS);
        let (producer, mut consumer) = rb.split();

        let active = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));
        let cb_active = Arc::clone(&active);
        let owner_closed = Arc::clone(&closed);
        let stream_config = cpal_config(config);

        let (ready_tx, ready_rx) = mpsc::channel();
        let owner = thread::spawn(move || {
            let host = cpal::default_host();
            let device = match host.default_output_device() {
                Some(d) => d,
                None => {
                    let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(
                        "no output device found".into(),
                    )));
                    return;
                }
            };

            let stream = match device.build_output_stream(
                &stream_config,
                move |data: &mut [Sample], _: &cpal::OutputCallbackInfo| {
                    if !cb_active.load(Ordering::Relaxed) {
                        data.fill(0);
                        return;
                    }
                    let read = consumer.pop_slice(data);
                    // Fill underruns with silence.
                    for sample in &mut data[read..] {
                        *sample = 0;
                    }
                },
                move |err| {
                    log::error!("output stream error: {err}");
                },
                None,
            ) {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(AudioError::UnsupportedConfig(format!(
                        "failed to build output stream: {e}"
                    ))));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(format!(
                    "failed to start output stream: {e}"
                ))));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            while !owner_closed.load(Ordering::Relaxed) {
                thread::sleep(OWNER_POLL);
            }
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                producer,
                active,
                closed,
                owner: Some(owner),
            }),
            Ok(Err(e)) => {
                let _ = owner.join();
                Err(e)
            }
            Err(_) => Err(AudioError::DeviceUnavailable(
                "output device thread exited unexpectedly".into(),
            )),
        }
    }
}

impl OutputDevice for CpalOutput {
    fn start(&mut self) -> Result<(), AudioError> {
        self.active.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn write(&mut self, buffer: &[Sample]) -> Result<usize, AudioError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(AudioError::DeviceUnavailable("output stream closed".into()));
        }
        let mut offset = 0;
        while offset < buffer.len() {
            let pushed = self.producer.push_slice(&buffer[offset..]);
            if pushed == 0 {
                if self.owner.as_ref().map_or(true, |o| o.is_finished()) {
                    return Err(AudioError::DeviceUnavailable(
                        "output stream thread exited".into(),
                    ));
                }
                thread::sleep(RING_WAIT);
            }
            offset += pushed;
        }
        Ok(buffer.len())
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::Relaxed);
        self.closed.store(true, Ordering::Relaxed);
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
        if let Some(owner) = self.owner.take() {
            join_with_timeout(owner, JOIN_TIMEOUT);
        }
    }
}

/// Default input device as a blocking [`InputDevice`].
///
/// The capture callback pushes into the ring and drops samples on
/// overrun, so a stalled consumer loses data instead of stalling the
/// audio thread.
pub struct CpalInput {
    consumer: RingCons,
    active: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    owner: Option<thread::JoinHandle<()>>,
}

impl CpalInput {
    /// Open the default input device with the given stream shape.
    ///
    /// # Errors
    /// [`AudioError::CaptureUnavailable`] when no input device is
    /// accessible or the stream cannot start;
    /// [`AudioError::UnsupportedConfig`] when the device refuses the
    /// 16-bit stream shape.
    pub fn open(config: &StreamConfig) -> Result<Self, AudioError> {
        let rb = HeapRb::<Sample>::new(config.buffer_samples() * RING_BUFFERS);
        let (mut producer, consumer) = rb.split();

        let active = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));
        let cb_active = Arc::clone(&active);
        let owner_closed = Arc::clone(&closed);
        let stream_config = cpal_config(config);

        let (ready_tx, ready_rx) = mpsc::channel();
        let owner = thread::spawn(move || {
            let host = cpal::default_host();
            let device = match host.default_input_device() {
                Some(d) => d,
                None => {
                    let _ = ready_tx.send(Err(AudioError::CaptureUnavailable(
                        "no input device found".into(),
                    )));
                    return;
                }
            };

            let stream = match device.build_input_stream(
                &stream_config,
                move |data: &[Sample], _: &cpal::InputCallbackInfo| {
                    if !cb_active.load(Ordering::Relaxed) {
                        return;
                    }
                    let pushed = producer.push_slice(data);
                    if pushed < data.len() {
                        log::debug!("capture ring overrun, dropped {} samples", data.len() - pushed);
                    }
                },
                move |err| {
                    log::error!("input stream error: {err}");
                },
                None,
            ) {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(AudioError::UnsupportedConfig(format!(
                        "failed to build input stream: {e}"
                    ))));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(AudioError::CaptureUnavailable(format!(
                    "failed to start input stream: {e}"
                ))));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            while !owner_closed.load(Ordering::Relaxed) {
                thread::sleep(OWNER_POLL);
            }
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                consumer,
                active,
                closed,
                owner: Some(owner),
            }),
            Ok(Err(e)) => {
                let _ = owner.join();
                Err(e)
            }
            Err(_) => Err(AudioError::CaptureUnavailable(
                "input device thread exited unexpectedly".into(),
            )),
        }
    }
}

impl InputDevice for CpalInput {
    fn start(&mut self) -> Result<(), AudioError> {
        self.active.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn read(&mut self, buffer: &mut [Sample]) -> Result<usize, AudioError> {
        let mut filled = 0;
        while filled < buffer.len() {
            let popped = self.consumer.pop_slice(&mut buffer[filled..]);
            filled += popped;
            if filled == buffer.len() {
                break;
            }
            if self.closed.load(Ordering::Relaxed)
                || self.owner.as_ref().map_or(true, |o| o.is_finished())
            {
                // Partial count on close.
                return Ok(filled);
            }
            if popped == 0 {
                thread::sleep(RING_WAIT);
            }
        }
        Ok(filled)
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::Relaxed);
        self.closed.store(true, Ordering::Relaxed);
    }
}

impl Drop for CpalInput {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
        if let Some(owner) = self.owner.take() {
            join_with_timeout(owner, JOIN_TIMEOUT);
        }
    }
}
