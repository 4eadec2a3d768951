//! Decoded-audio loading for the recorded-sample mixer.
//!
//! Files are decoded in full through symphonia into an interleaved-stereo
//! 16-bit store; mono sources are up-mixed by duplication. Nothing is
//! resampled: a clip keeps its native rate and the mixer decides what to
//! do about mismatches.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::core::types::Sample;
use crate::error::AudioError;

/// A fully decoded clip: interleaved stereo 16-bit PCM plus its native
/// sample rate. Immutable after load; share it via `Arc`.
pub struct RecordedAudio {
    samples: Vec<Sample>,
    sample_rate: u32,
}

impl RecordedAudio {
    /// Wrap already-interleaved stereo samples.
    ///
    /// # Errors
    /// [`AudioError::InvalidParameter`] when `samples` is empty or has an
    /// odd length (not interleaved stereo).
    pub fn new(samples: Vec<Sample>, sample_rate: u32) -> Result<Self, AudioError> {
        if samples.is_empty() {
            return Err(AudioError::InvalidParameter(
                "recorded audio must contain at least one frame".into(),
            ));
        }
        if samples.len() % 2 != 0 {
            return Err(AudioError::InvalidParameter(format!(
                "recorded audio must be interleaved stereo, got {} samples",
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved stereo samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Stereo frames in the clip.
    pub fn total_frames(&self) -> usize {
        self.samples.len() / 2
    }
}

/// Decode an entire audio file into a [`RecordedAudio`] store.
///
/// # Errors
/// - [`AudioError::IoError`] when the file cannot be opened.
/// - [`AudioError::NoAudioTrack`] when the container holds no audio.
/// - [`AudioError::DecodeFailed`] on probe or decoder failures, or when
///   the file decodes to zero samples.
pub fn load_file(path: &Path) -> Result<RecordedAudio, AudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::DecodeFailed(format!("failed to probe format: {e}")))?;

    let mut format = probed.format;

    let track = format.default_track().ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeFailed("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeFailed(format!("failed to create decoder: {e}")))?;

    // The container's declared layout can be absent or wrong; the decoded
    // buffers always know their own, and they set the interleave width.
    let mut src_channels: Option<usize> = None;
    let mut all_samples: Vec<Sample> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AudioError::DecodeFailed(format!("error reading packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // A corrupt packet is recoverable; skip it.
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(AudioError::DecodeFailed(format!("decode error: {e}"))),
        };

        if src_channels.is_none() {
            src_channels = Some(decoded.spec().channels.count());
        }
        append_samples(&decoded, &mut all_samples);
    }

    if all_samples.is_empty() {
        return Err(AudioError::DecodeFailed(
            "file decoded to zero samples".into(),
        ));
    }
    // Non-empty output means at least one buffer decoded and set the count.
    let src_channels =
        src_channels.ok_or_else(|| AudioError::DecodeFailed("unknown channel layout".into()))?;

    let samples = interleave_stereo(all_samples, src_channels);

    log::debug!(
        "decoded {} frames at {} Hz from {}",
        samples.len() / 2,
        sample_rate,
        path.display()
    );

    RecordedAudio::new(samples, sample_rate)
}

/// Run [`load_file`] on its own thread, so the caller stays responsive
/// during long decodes.
///
/// Poll the returned handle with [`BackgroundLoad::try_take`] to gate
/// playback on load completion, or block on [`BackgroundLoad::wait`].
pub fn load_file_in_background(path: PathBuf) -> BackgroundLoad {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_file(&path);
        if tx.send(result).is_err() {
            log::debug!("decode result dropped, receiver gone");
        }
    });
    BackgroundLoad { rx }
}

/// Handle to a decode running on a background thread.
///
/// One-shot: the decoded store can be taken exactly once.
pub struct BackgroundLoad {
    rx: mpsc::Receiver<Result<RecordedAudio, AudioError>>,
}

impl BackgroundLoad {
    /// Take the decoded store if the decode has finished, without blocking.
    ///
    /// # Errors
    /// [`AudioError::NotLoaded`] while the decode is still running; the
    /// decode's own error once it fails.
    pub fn try_take(&self) -> Result<RecordedAudio, AudioError> {
        match self.rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => Err(AudioError::NotLoaded),
            Err(mpsc::TryRecvError::Disconnected) => Err(AudioError::DecodeFailed(
                "decoder thread delivered no result".into(),
            )),
        }
    }

    /// Block until the decode finishes and take the store.
    ///
    /// # Errors
    /// Whatever [`load_file`] reports for the path.
    pub fn wait(self) -> Result<RecordedAudio, AudioError> {
        match self.rx.recv() {
            Ok(result) => result,
            Err(_) => Err(AudioError::DecodeFailed(
                "decoder thread delivered no result".into(),
            )),
        }
    }
}

/// Up-mix mono to interleaved stereo by duplication; anything wider is
/// already interleaved two samples per frame by [`append_samples`].
fn interleave_stereo(samples: Vec<Sample>, src_channels: usize) -> Vec<Sample> {
    if src_channels == 1 {
        samples.iter().flat_map(|&s| [s, s]).collect()
    } else {
        samples
    }
}

fn append_samples(buf: &AudioBufferRef, out: &mut Vec<Sample>) {
    match buf {
        AudioBufferRef::S16(b) => {
            let frames = b.frames();
            let chans = b.spec().channels.count().min(2);
            for f in 0..frames {
                for c in 0..chans {
                    out.push(*b.chan(c).get(f).unwrap_or(&0));
                }
            }
        }
        AudioBufferRef::F32(b) => {
            let frames = b.frames();
            let chans = b.spec().channels.count().min(2);
            for f in 0..frames {
                for c in 0..chans {
                    let sample = *b.chan(c).get(f).unwrap_or(&0.0);
                    out.push((sample * 32768.0) as Sample);
                }
            }
        }
        AudioBufferRef::S32(b) => {
            let frames = b.frames();
            let chans = b.spec().channels.count().min(2);
            for f in 0..frames {
                for c in 0..chans {
                    let sample = *b.chan(c).get(f).unwrap_or(&0);
                    out.push((sample >> 16) as Sample);
                }
            }
        }
        AudioBufferRef::U8(b) => {
            let frames = b.frames();
            let chans = b.spec().channels.count().min(2);
            for f in 0..frames {
                for c in 0..chans {
                    let sample = *b.chan(c).get(f).unwrap_or(&128);
                    out.push((i16::from(sample) - 128) << 8);
                }
            }
        }
        _ => {
            log::warn!("unsupported sample format, skipping packet");
        }
    }
}
