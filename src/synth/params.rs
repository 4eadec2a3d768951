//! Live synthesis parameters shared between a control thread and the
//! playback worker.

use crate::state::AtomicF64;

/// Default tone frequency in Hz (concert A).
pub const DEFAULT_FREQUENCY_HZ: f64 = 440.0;

/// Default per-channel amplitude.
pub const DEFAULT_AMPLITUDE: f64 = 0.5;

/// Tone parameters, each an independently-updatable atomic scalar.
///
/// Writers (sliders, CLI flags) store at arbitrary times; the playback worker
/// takes one [`snapshot`](ToneParams::snapshot) per buffer-fill cycle, which
/// bounds audible parameter-change granularity to one buffer. A snapshot may
/// combine an old frequency with a new amplitude across a refresh boundary;
/// each field settles within one cycle and no compound lock exists.
///
/// Values are expected to stay inside the stock control ranges
/// ([`MIN_FREQUENCY_HZ`](crate::core::types::MIN_FREQUENCY_HZ)–
/// [`MAX_FREQUENCY_HZ`](crate::core::types::MAX_FREQUENCY_HZ) Hz,
/// amplitude 0–1); out-of-range input yields undefined amplitude scaling,
/// not an error.
pub struct ToneParams {
    frequency: AtomicF64,
    frequency_right: AtomicF64,
    amplitude_left: AtomicF64,
    amplitude_right: AtomicF64,
    delay_ms: AtomicF64,
}

/// One cycle's worth of parameter values, read once per buffer fill.
#[derive(Debug, Clone, Copy)]
pub struct ToneSnapshot {
    /// Primary (mono, or left-channel) frequency in Hz.
    pub frequency: f64,
    /// Right-channel frequency for the independent dual-tone variant.
    pub frequency_right: f64,
    pub amplitude_left: f64,
    pub amplitude_right: f64,
    /// Inter-channel delay in milliseconds for the phase-delay variant.
    pub delay_ms: f64,
}

impl ToneParams {
    pub fn new() -> Self {
        Self {
            frequency: AtomicF64::new(DEFAULT_FREQUENCY_HZ),
            frequency_right: AtomicF64::new(DEFAULT_FREQUENCY_HZ),
            amplitude_left: AtomicF64::new(DEFAULT_AMPLITUDE),
            amplitude_right: AtomicF64::new(DEFAULT_AMPLITUDE),
            delay_ms: AtomicF64::new(0.0),
        }
    }

    /// Primary (mono, or left-channel) frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency.load()
    }

    pub fn set_frequency(&self, hz: f64) {
        self.frequency.store(hz);
    }

    pub fn frequency_right(&self) -> f64 {
        self.frequency_right.load()
    }

    pub fn set_frequency_right(&self, hz: f64) {
        self.frequency_right.store(hz);
    }

    pub fn amplitude_left(&self) -> f64 {
        self.amplitude_left.load()
    }

    pub fn set_amplitude_left(&self, amplitude: f64) {
        self.amplitude_left.store(amplitude);
    }

    pub fn amplitude_right(&self) -> f64 {
        self.amplitude_right.load()
    }

    pub fn set_amplitude_right(&self, amplitude: f64) {
        self.amplitude_right.store(amplitude);
    }

    /// Set both channel amplitudes to the same value.
    pub fn set_amplitude(&self, amplitude: f64) {
        self.amplitude_left.store(amplitude);
        self.amplitude_right.store(amplitude);
    }

    /// Split amplitude as a left/right balance: right gets `balance`,
    /// left gets `1 - balance`.
    pub fn set_balance(&self, balance: f64) {
        self.amplitude_right.store(balance);
        self.amplitude_left.store(1.0 - balance);
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms.load()
    }

    pub fn set_delay_ms(&self, delay_ms: f64) {
        self.delay_ms.store(delay_ms);
    }

    /// Read every parameter once.
    pub fn snapshot(&self) -> ToneSnapshot {
        ToneSnapshot {
            frequency: self.frequency.load(),
            frequency_right: self.frequency_right.load(),
            amplitude_left: self.amplitude_left.load(),
            amplitude_right: self.amplitude_right.load(),
            delay_ms: self.delay_ms.load(),
        }
    }
}

impl Default for ToneParams {
    fn default() -> Self {
        Self::new()
    }
}
