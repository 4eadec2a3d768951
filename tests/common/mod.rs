#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tonescope::device::{InputDevice, OutputDevice};
use tonescope::{AudioError, Sample};

pub const SR: u32 = 44_100;

/// Generate `n` samples of a sine at `freq_hz` scaled into 16-bit range.
pub fn gen_sine_i16(freq_hz: f64, sample_rate: u32, n: usize, amplitude: f64) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * freq_hz * i as f64 / f64::from(sample_rate);
            (phase.sin() * amplitude * 32767.0).round() as Sample
        })
        .collect()
}

/// Interleave two equal-length channels.
pub fn interleave(left: &[Sample], right: &[Sample]) -> Vec<Sample> {
    left.iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect()
}

/// Output device that records everything written to it.
///
/// Each write sleeps briefly so the producer is paced like it would be
/// against real hardware.
pub struct CapturingOutput {
    written: Arc<Mutex<Vec<Sample>>>,
    writes: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl CapturingOutput {
    pub fn new() -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            writes: Arc::new(AtomicUsize::new(0)),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handles that stay valid after the device moves into the
    /// engine: (written samples, write count, stop count).
    pub fn handles(
        &self,
    ) -> (
        Arc<Mutex<Vec<Sample>>>,
        Arc<AtomicUsize>,
        Arc<AtomicUsize>,
    ) {
        (
            Arc::clone(&self.written),
            Arc::clone(&self.writes),
            Arc::clone(&self.stopped),
        )
    }
}

impl OutputDevice for CapturingOutput {
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn write(&mut self, buffer: &[Sample]) -> Result<usize, AudioError> {
        self.written.lock().unwrap().extend_from_slice(buffer);
        self.writes.fetch_add(1, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(1));
        Ok(buffer.len())
    }

    fn stop(&mut self) {
        self.stopped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Input device that replays a fixed script, then reads as closed
/// (returning 0 samples).
pub struct ScriptedInput {
    samples: Vec<Sample>,
    cursor: usize,
    stopped: Arc<AtomicUsize>,
}

impl ScriptedInput {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            cursor: 0,
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stop_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stopped)
    }
}

impl InputDevice for ScriptedInput {
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn read(&mut self, buffer: &mut [Sample]) -> Result<usize, AudioError> {
        thread::sleep(Duration::from_millis(1));
        let remaining = self.samples.len() - self.cursor;
        let n = remaining.min(buffer.len());
        buffer[..n].copy_from_slice(&self.samples[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }

    fn stop(&mut self) {
        self.stopped.fetch_add(1, Ordering::Relaxed);
    }
}
