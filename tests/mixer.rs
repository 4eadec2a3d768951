//! Recorded-sample mixer scenarios: amplitude scaling, the delayed right
//! channel as an echo, and live control changes.

mod common;

use std::sync::Arc;

use tonescope::playback::SampleSource;
use tonescope::{MixerParams, PlaybackPosition, RecordedAudio, RecordedMixer};

fn mixer_for(
    frames: &[(i16, i16)],
    params: Arc<MixerParams>,
    sample_rate: u32,
) -> RecordedMixer {
    let samples = frames.iter().flat_map(|&(l, r)| [l, r]).collect();
    let audio = Arc::new(RecordedAudio::new(samples, sample_rate).unwrap());
    RecordedMixer::new(audio, params, Arc::new(PlaybackPosition::new()), sample_rate)
}

#[test]
fn test_channel_amplitudes_scale_independently() {
    let params = Arc::new(MixerParams::new());
    params.set_amplitude_left(0.25);
    params.set_amplitude_right(0.75);
    let mut mixer = mixer_for(&[(1_000, 1_000), (-400, -400)], params, common::SR);

    let mut buffer = vec![0; 4];
    mixer.fill(&mut buffer);

    // Playback starts at clip frame 1, then wraps to frame 0.
    assert_eq!(buffer, vec![-100, -300, 250, 750]);
}

#[test]
fn test_delay_turns_an_impulse_into_an_echo() {
    let mut frames = [(0, 0); 8];
    frames[2] = (1_000, 1_000);

    let params = Arc::new(MixerParams::new());
    params.set_amplitude_left(1.0);
    params.set_amplitude_right(1.0);
    params.set_delay_ms(3.0); // three frames at 1000 Hz
    let mut mixer = mixer_for(&frames, params, 1_000);

    let mut buffer = vec![0; 16];
    mixer.fill(&mut buffer);

    let left: Vec<i16> = buffer.iter().step_by(2).copied().collect();
    let right: Vec<i16> = buffer.iter().skip(1).step_by(2).copied().collect();

    assert_eq!(left, vec![0, 1_000, 0, 0, 0, 0, 0, 0]);
    assert_eq!(right, vec![0, 0, 0, 0, 1_000, 0, 0, 0]);
}

#[test]
fn test_balance_change_applies_on_the_next_fill() {
    let params = Arc::new(MixerParams::new());
    let mut mixer = mixer_for(&[(100, 100), (200, 200)], Arc::clone(&params), common::SR);

    let mut buffer = vec![0; 4];
    mixer.fill(&mut buffer);
    assert_eq!(buffer, vec![100, 100, 50, 50]); // default 0.5 both sides

    params.set_balance(1.0); // all right
    mixer.fill(&mut buffer);
    assert_eq!(buffer, vec![0, 200, 0, 100]);
}

#[test]
fn test_delay_change_moves_the_echo() {
    let mut frames = [(0, 0); 6];
    frames[1] = (500, 500);

    let params = Arc::new(MixerParams::new());
    params.set_amplitude_left(1.0);
    params.set_amplitude_right(1.0);
    let mut mixer = mixer_for(&frames, Arc::clone(&params), 1_000);

    // No delay: both channels see the impulse at the same output frame.
    let mut first = vec![0; 12];
    mixer.fill(&mut first);
    assert_eq!(first[0], 500);
    assert_eq!(first[1], 500);

    // Two frames of delay: on the next pass the right channel trails.
    params.set_delay_ms(2.0);
    let mut second = vec![0; 12];
    mixer.fill(&mut second);
    assert_eq!(second[0], 500); // cursor back at clip frame 1
    assert_eq!(second[1], 0);
    assert_eq!(second[5], 500); // two frames later on the right
}
