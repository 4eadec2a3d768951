//! Recorded-sample mixer: replays a decoded clip in a loop with
//! independent left/right amplitude and an inter-channel delay.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::types::Sample;
use crate::media::RecordedAudio;
use crate::playback::SampleSource;
use crate::state::{AtomicF64, PlaybackPosition};

/// Minimum wall-clock spacing between position reports (~30 Hz).
pub const POSITION_INTERVAL: Duration = Duration::from_millis(30);

const DEFAULT_MIX_AMPLITUDE: f64 = 0.5;

/// Live mixer controls: per-channel amplitude and right-channel delay in
/// milliseconds.
///
/// Independent atomic scalars written by the control thread and snapshot
/// once per buffer cycle by the mixer. A snapshot taken mid-update can pair
/// a new amplitude with an old delay; that is tolerated, each field settles
/// within one cycle.
pub struct MixerParams {
    amplitude_left: AtomicF64,
    amplitude_right: AtomicF64,
    delay_ms: AtomicF64,
}

impl MixerParams {
    pub fn new() -> Self {
        Self {
            amplitude_left: AtomicF64::new(DEFAULT_MIX_AMPLITUDE),
            amplitude_right: AtomicF64::new(DEFAULT_MIX_AMPLITUDE),
            delay_ms: AtomicF64::new(0.0),
        }
    }

    pub fn amplitude_left(&self) -> f64 {
        self.amplitude_left.load()
    }

    pub fn amplitude_right(&self) -> f64 {
        self.amplitude_right.load()
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms.load()
    }

    pub fn set_amplitude_left(&self, amplitude: f64) {
        self.amplitude_left.store(amplitude);
    }

    pub fn set_amplitude_right(&self, amplitude: f64) {
        self.amplitude_right.store(amplitude);
    }

    /// Split one balance control across both channels: `right = value`,
    /// `left = 1 - value`.
    pub fn set_balance(&self, value: f64) {
        self.amplitude_right.store(value);
        self.amplitude_left.store(1.0 - value);
    }

    pub fn set_delay_ms(&self, delay_ms: f64) {
        self.delay_ms.store(delay_ms);
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        MixerSnapshot {
            amplitude_left: self.amplitude_left.load(),
            amplitude_right: self.amplitude_right.load(),
            delay_ms: self.delay_ms.load(),
        }
    }
}

impl Default for MixerParams {
    fn default() -> Self {
        Self::new()
    }
}

/// One coherent read of [`MixerParams`].
#[derive(Debug, Clone, Copy)]
pub struct MixerSnapshot {
    pub amplitude_left: f64,
    pub amplitude_right: f64,
    pub delay_ms: f64,
}

/// Loops a decoded stereo clip through a circular cursor.
///
/// Per frame the cursor advances first, then the left channel reads the
/// current frame and the right channel reads `delay` frames behind it,
/// wrapping through the end of the clip. The delay in frames is derived
/// from the snapshot once per fill using the playback rate, so the echo
/// spacing follows the live control immediately.
pub struct RecordedMixer {
    audio: Arc<RecordedAudio>,
    params: Arc<MixerParams>,
    position: Arc<PlaybackPosition>,
    sample_rate: f64,
    cursor: usize,
    last_report: Option<Instant>,
}

impl RecordedMixer {
    /// `sample_rate` is the playback rate the delay control is scaled by,
    /// not the clip's native rate. A mismatched clip is played unresampled
    /// at the playback rate, with a warning.
    pub fn new(
        audio: Arc<RecordedAudio>,
        params: Arc<MixerParams>,
        position: Arc<PlaybackPosition>,
        sample_rate: u32,
    ) -> Self {
        if audio.sample_rate() != sample_rate {
            log::warn!(
                "clip rate {} Hz differs from playback rate {} Hz, playing unresampled",
                audio.sample_rate(),
                sample_rate
            );
        }
        Self {
            audio,
            params,
            position,
            sample_rate: f64::from(sample_rate),
            cursor: 0,
            last_report: None,
        }
    }

    /// Current frame index within the clip.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn report_position(&mut self) {
        let now = Instant::now();
        let due = self
            .last_report
            .map_or(true, |t| now.duration_since(t) >= POSITION_INTERVAL);
        if due {
            self.position.store(self.cursor);
            self.last_report = Some(now);
        }
    }
}

impl SampleSource for RecordedMixer {
    fn fill(&mut self, buffer: &mut [Sample]) {
        let total = self.audio.total_frames();
        if total == 0 {
            buffer.fill(0);
            return;
        }
        let snap = self.params.snapshot();
        let delay_frames = (snap.delay_ms / 1000.0 * self.sample_rate) as i64;
        let data = self.audio.samples();
        let total_i = total as i64;

        for frame in buffer.chunks_exact_mut(2) {
            self.cursor = (self.cursor + 1) % total;

            let left = data[self.cursor * 2];
            frame[0] = (f64::from(left) * snap.amplitude_left) as Sample;

            let right_index = (self.cursor as i64 - delay_frames).rem_euclid(total_i) as usize;
            let right = data[right_index * 2 + 1];
            frame[1] = (f64::from(right) * snap.amplitude_right) as Sample;
        }

        self.report_position();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: &[(Sample, Sample)]) -> Arc<RecordedAudio> {
        let samples = frames.iter().flat_map(|&(l, r)| [l, r]).collect();
        Arc::new(RecordedAudio::new(samples, 44_100).unwrap())
    }

    fn full_volume() -> Arc<MixerParams> {
        let params = MixerParams::new();
        params.set_amplitude_left(1.0);
        params.set_amplitude_right(1.0);
        Arc::new(params)
    }

    #[test]
    fn test_cursor_advances_before_reading() {
        let audio = clip(&[(10, 11), (20, 21), (30, 31)]);
        let mut mixer = RecordedMixer::new(
            audio,
            full_volume(),
            Arc::new(PlaybackPosition::new()),
            44_100,
        );

        let mut buffer = vec![0; 4];
        mixer.fill(&mut buffer);

        // Frame 0 is skipped on the first pass and played after the wrap.
        assert_eq!(buffer, vec![20, 21, 30, 31]);
        assert_eq!(mixer.cursor(), 2);
    }

    #[test]
    fn test_cursor_wraps_through_clip_end() {
        let audio = clip(&[(10, 11), (20, 21), (30, 31)]);
        let mut mixer = RecordedMixer::new(
            audio,
            full_volume(),
            Arc::new(PlaybackPosition::new()),
            44_100,
        );

        let mut buffer = vec![0; 8];
        mixer.fill(&mut buffer);

        assert_eq!(buffer, vec![20, 21, 30, 31, 10, 11, 20, 21]);
        assert_eq!(mixer.cursor(), 1);
    }

    #[test]
    fn test_delay_reads_right_channel_behind_cursor() {
        let audio = clip(&[(10, 11), (20, 21), (30, 31), (40, 41)]);
        let params = full_volume();
        // One frame of delay at 1000 Hz playback.
        params.set_delay_ms(1.0);
        let mut mixer =
            RecordedMixer::new(audio, params, Arc::new(PlaybackPosition::new()), 1_000);

        let mut buffer = vec![0; 6];
        mixer.fill(&mut buffer);

        // Left reads frames 1, 2, 3; right trails one frame behind.
        assert_eq!(buffer, vec![20, 11, 30, 21, 40, 31]);
    }

    #[test]
    fn test_delay_larger_than_cursor_wraps_backwards() {
        let audio = clip(&[(10, 11), (20, 21), (30, 31)]);
        let params = full_volume();
        params.set_delay_ms(2.0); // two frames at 1000 Hz
        let mut mixer =
            RecordedMixer::new(audio, params, Arc::new(PlaybackPosition::new()), 1_000);

        let mut buffer = vec![0; 2];
        mixer.fill(&mut buffer);

        // cursor 1, right index (1 - 2).rem_euclid(3) = 2
        assert_eq!(buffer, vec![20, 31]);
    }

    #[test]
    fn test_amplitude_truncates_toward_zero() {
        let audio = clip(&[(0, 0), (101, -101)]);
        let params = Arc::new(MixerParams::new()); // both amplitudes 0.5
        let mut mixer =
            RecordedMixer::new(audio, params, Arc::new(PlaybackPosition::new()), 44_100);

        let mut buffer = vec![0; 2];
        mixer.fill(&mut buffer);

        assert_eq!(buffer, vec![50, -50]);
    }

    #[test]
    fn test_first_fill_always_reports_position() {
        let audio = clip(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        let position = Arc::new(PlaybackPosition::new());
        let mut mixer = RecordedMixer::new(
            audio,
            full_volume(),
            Arc::clone(&position),
            44_100,
        );

        let mut buffer = vec![0; 4];
        mixer.fill(&mut buffer);

        assert_eq!(position.load(), mixer.cursor());
    }

    #[test]
    fn test_position_updates_after_interval() {
        let audio = clip(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let position = Arc::new(PlaybackPosition::new());
        let mut mixer = RecordedMixer::new(
            audio,
            full_volume(),
            Arc::clone(&position),
            44_100,
        );

        let mut buffer = vec![0; 2];
        mixer.fill(&mut buffer);
        let first = position.load();

        std::thread::sleep(POSITION_INTERVAL + Duration::from_millis(5));
        mixer.fill(&mut buffer);

        assert_ne!(position.load(), first);
        assert_eq!(position.load(), mixer.cursor());
    }

    #[test]
    fn test_back_to_back_fills_report_once() {
        let audio = clip(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let position = Arc::new(PlaybackPosition::new());
        let mut mixer = RecordedMixer::new(
            audio,
            full_volume(),
            Arc::clone(&position),
            44_100,
        );

        let mut buffer = vec![0; 2];
        mixer.fill(&mut buffer);
        let first = position.load();
        mixer.fill(&mut buffer);

        assert_eq!(position.load(), first);
        assert_ne!(mixer.cursor(), first);
    }

    #[test]
    fn test_negative_delay_reads_ahead() {
        let audio = clip(&[(10, 11), (20, 21), (30, 31)]);
        let params = full_volume();
        params.set_delay_ms(-1.0);
        let mut mixer =
            RecordedMixer::new(audio, params, Arc::new(PlaybackPosition::new()), 1_000);

        let mut buffer = vec![0; 2];
        mixer.fill(&mut buffer);

        // cursor 1, right index (1 + 1).rem_euclid(3) = 2
        assert_eq!(buffer, vec![20, 31]);
    }
}
