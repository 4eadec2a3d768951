//! Tone synthesis: phase accumulator, shared parameter block, and the
//! mono/binaural/dual-tone/wavetable sample sources.

pub mod generators;
pub mod oscillator;
pub mod params;

pub use generators::{BinauralGenerator, DualToneGenerator, ToneGenerator, WavetableGenerator};
pub use oscillator::Oscillator;
pub use params::{ToneParams, ToneSnapshot, DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY_HZ};
