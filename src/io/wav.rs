//! Minimal WAV output for rendering tones to disk (16-bit PCM only).

use std::io::Write;
use std::path::Path;

use crate::core::types::{ChannelLayout, Sample};
use crate::error::AudioError;

const WAV_FORMAT_PCM: u16 = 1;

/// Encode interleaved 16-bit samples as a complete WAV file image.
pub fn encode_wav(samples: &[Sample], sample_rate: u32, channels: ChannelLayout) -> Vec<u8> {
    let num_channels = channels.count();
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * u32::from(num_channels) * (u32::from(bits_per_sample) / 8);
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut out = Vec::with_capacity(file_size as usize + 8);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    out.extend_from_slice(&WAV_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    for &sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}

/// Write interleaved 16-bit samples to a WAV file.
///
/// # Errors
/// [`AudioError::IoError`] when the file cannot be created or written.
pub fn write_wav_file(
    path: &Path,
    samples: &[Sample],
    sample_rate: u32,
    channels: ChannelLayout,
) -> Result<(), AudioError> {
    let data = encode_wav(samples, sample_rate, channels);
    let mut file = std::fs::File::create(path)
        .map_err(|e| AudioError::IoError(format!("{}: {}", path.display(), e)))?;
    file.write_all(&data)
        .map_err(|e| AudioError::IoError(format!("{}: {}", path.display(), e)))?;
    Ok(())
}
