//! Core types, complex arithmetic, FFT engine, and window functions.

pub mod complex;
pub mod fft;
pub mod types;
pub mod window;

pub use complex::Complex;
pub use fft::Fft;
pub use types::*;
pub use window::{apply_window, hann_window};
