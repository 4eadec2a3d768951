//! File output.

pub mod wav;

pub use wav::{encode_wav, write_wav_file};
