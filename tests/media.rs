//! File loading through the real decoder, fed by WAV files this crate
//! writes itself.

mod common;

use std::fs;
use std::path::PathBuf;

use tonescope::io::write_wav_file;
use tonescope::{load_file, load_file_in_background, AudioError, ChannelLayout};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tonescope_test_{}_{}", std::process::id(), name))
}

#[test]
fn test_stereo_wav_round_trip() {
    let left = common::gen_sine_i16(440.0, common::SR, 1_024, 0.8);
    let right = common::gen_sine_i16(880.0, common::SR, 1_024, 0.4);
    let written = common::interleave(&left, &right);

    let path = temp_path("stereo.wav");
    write_wav_file(&path, &written, common::SR, ChannelLayout::Stereo).unwrap();

    let audio = load_file(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(audio.sample_rate(), common::SR);
    assert_eq!(audio.total_frames(), 1_024);
    assert_eq!(audio.samples(), &written[..]);
}

#[test]
fn test_mono_wav_is_upmixed_to_stereo() {
    let mono = common::gen_sine_i16(330.0, common::SR, 512, 1.0);

    let path = temp_path("mono.wav");
    write_wav_file(&path, &mono, common::SR, ChannelLayout::Mono).unwrap();

    let audio = load_file(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(audio.total_frames(), 512);
    for (frame, &src) in audio.samples().chunks_exact(2).zip(&mono) {
        assert_eq!(frame[0], src);
        assert_eq!(frame[1], src);
    }
}

#[test]
fn test_unrecognized_file_fails_to_decode() {
    let path = temp_path("junk.txt");
    fs::write(&path, b"this is not audio at all").unwrap();

    let err = load_file(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(err, Err(AudioError::DecodeFailed(_))));
}

#[test]
fn test_background_load_delivers_over_the_channel() {
    let samples = common::gen_sine_i16(440.0, common::SR, 256, 0.5);
    let path = temp_path("background.wav");
    write_wav_file(&path, &samples, common::SR, ChannelLayout::Stereo).unwrap();

    let audio = load_file_in_background(path.clone()).wait().unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(audio.total_frames(), 128);
    assert_eq!(audio.samples(), &samples[..]);
}

#[test]
fn test_background_load_reports_missing_file() {
    let load = load_file_in_background(PathBuf::from("/nonexistent/clip.wav"));
    assert!(matches!(load.wait(), Err(AudioError::IoError(_))));
}
