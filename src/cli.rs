use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tonescope::core::types::{ChannelLayout, StreamConfig, DEFAULT_SAMPLE_RATE};
use tonescope::device::{CpalInput, CpalOutput};
use tonescope::playback::{MixerParams, PlaybackEngine, RecordedMixer, SampleSource};
use tonescope::state::PlaybackPosition;
use tonescope::synth::{
    BinauralGenerator, DualToneGenerator, ToneGenerator, ToneParams, WavetableGenerator,
    DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY_HZ,
};
use tonescope::{media, CaptureEngine, DEFAULT_FFT_SIZE};

const DEFAULT_DURATION_SECS: f64 = 5.0;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "tone" => cmd_tone(&args),
        "binaural" => cmd_binaural(&args),
        "dual" => cmd_dual(&args),
        "wavetable" => cmd_wavetable(&args),
        "play" => cmd_play(&args),
        "spectrogram" => cmd_spectrogram(&args),
        "render" => cmd_render(&args),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("ERROR: Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn cmd_tone(args: &[String]) {
    let mut frequency = DEFAULT_FREQUENCY_HZ;
    let mut amplitude = DEFAULT_AMPLITUDE;
    let mut duration_secs = DEFAULT_DURATION_SECS;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--frequency" | "-f" => {
                i += 1;
                frequency = parse_f64(args, i, "frequency");
            }
            "--amplitude" | "-a" => {
                i += 1;
                amplitude = parse_f64(args, i, "amplitude");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            other => unknown_option(other),
        }
        i += 1;
    }

    let params = Arc::new(ToneParams::new());
    params.set_frequency(frequency);
    params.set_amplitude(amplitude);

    let config = StreamConfig::playback(ChannelLayout::Mono);
    eprintln!("tone: {:.1} Hz, amplitude {:.2}", frequency, amplitude);
    let generator = ToneGenerator::new(params, config.sample_rate);
    run_playback(config, generator, duration_secs, None);
}

fn cmd_binaural(args: &[String]) {
    let mut frequency = DEFAULT_FREQUENCY_HZ;
    let mut balance: Option<f64> = None;
    let mut delay_ms = 0.0;
    let mut duration_secs = DEFAULT_DURATION_SECS;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--frequency" | "-f" => {
                i += 1;
                frequency = parse_f64(args, i, "frequency");
            }
            "--balance" | "-b" => {
                i += 1;
                balance = Some(parse_f64(args, i, "balance"));
            }
            "--delay-ms" => {
                i += 1;
                delay_ms = parse_f64(args, i, "delay-ms");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            other => unknown_option(other),
        }
        i += 1;
    }

    let params = Arc::new(ToneParams::new());
    params.set_frequency(frequency);
    if let Some(b) = balance {
        params.set_balance(b);
    }
    params.set_delay_ms(delay_ms);

    let config = StreamConfig::playback(ChannelLayout::Stereo);
    eprintln!(
        "binaural: {:.1} Hz, delay {:.2} ms, balance {:.2}",
        frequency,
        delay_ms,
        params.amplitude_right()
    );
    let generator = BinauralGenerator::new(params, config.sample_rate);
    run_playback(config, generator, duration_secs, None);
}

fn cmd_dual(args: &[String]) {
    let mut left = DEFAULT_FREQUENCY_HZ;
    let mut right = DEFAULT_FREQUENCY_HZ;
    let mut amplitude = DEFAULT_AMPLITUDE;
    let mut duration_secs = DEFAULT_DURATION_SECS;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--left" | "-l" => {
                i += 1;
                left = parse_f64(args, i, "left");
            }
            "--right" | "-r" => {
                i += 1;
                right = parse_f64(args, i, "right");
            }
            "--amplitude" | "-a" => {
                i += 1;
                amplitude = parse_f64(args, i, "amplitude");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            other => unknown_option(other),
        }
        i += 1;
    }

    let params = Arc::new(ToneParams::new());
    params.set_frequency(left);
    params.set_frequency_right(right);
    params.set_amplitude(amplitude);

    let config = StreamConfig::playback(ChannelLayout::Stereo);
    eprintln!("dual: left {:.1} Hz, right {:.1} Hz", left, right);
    let generator = DualToneGenerator::new(params, config.sample_rate);
    run_playback(config, generator, duration_secs, None);
}

fn cmd_wavetable(args: &[String]) {
    let mut frequency = DEFAULT_FREQUENCY_HZ;
    let mut amplitude = DEFAULT_AMPLITUDE;
    let mut duration_secs = DEFAULT_DURATION_SECS;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--frequency" | "-f" => {
                i += 1;
                frequency = parse_f64(args, i, "frequency");
            }
            "--amplitude" | "-a" => {
                i += 1;
                amplitude = parse_f64(args, i, "amplitude");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            other => unknown_option(other),
        }
        i += 1;
    }

    let config = StreamConfig::playback(ChannelLayout::Mono);
    let generator = match WavetableGenerator::new(frequency, amplitude, config.sample_rate) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    eprintln!(
        "wavetable: {:.1} Hz, {} samples per cycle",
        frequency,
        generator.cycle_len()
    );
    run_playback(config, generator, duration_secs, None);
}

fn cmd_play(args: &[String]) {
    if args.len() < 3 || args[2].starts_with('-') {
        eprintln!("ERROR: play requires an audio file path");
        std::process::exit(1);
    }
    let path = &args[2];
    let mut balance: Option<f64> = None;
    let mut delay_ms = 0.0;
    let mut duration_secs = DEFAULT_DURATION_SECS;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--balance" | "-b" => {
                i += 1;
                balance = Some(parse_f64(args, i, "balance"));
            }
            "--delay-ms" => {
                i += 1;
                delay_ms = parse_f64(args, i, "delay-ms");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            other => unknown_option(other),
        }
        i += 1;
    }

    // Decode off-thread; playback is gated on completion.
    let load = media::load_file_in_background(PathBuf::from(path));
    let audio = match load.wait() {
        Ok(a) => Arc::new(a),
        Err(e) => {
            eprintln!("ERROR: Failed to load {}: {}", path, e);
            std::process::exit(1);
        }
    };
    eprintln!(
        "loaded: {} frames at {} Hz",
        audio.total_frames(),
        audio.sample_rate()
    );

    let params = Arc::new(MixerParams::new());
    if let Some(b) = balance {
        params.set_balance(b);
    }
    params.set_delay_ms(delay_ms);

    let position = Arc::new(PlaybackPosition::new());
    let config = StreamConfig::playback(ChannelLayout::Stereo);
    let total_frames = audio.total_frames();
    let mixer = RecordedMixer::new(audio, params, Arc::clone(&position), config.sample_rate);
    run_playback(config, mixer, duration_secs, Some((position, total_frames)));
}

fn cmd_spectrogram(args: &[String]) {
    let mut fft_size = DEFAULT_FFT_SIZE;
    let mut duration_secs = DEFAULT_DURATION_SECS;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--fft-size" => {
                i += 1;
                fft_size = parse_usize(args, i, "fft-size");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            other => unknown_option(other),
        }
        i += 1;
    }
    check_duration(duration_secs);

    let mut engine = match CaptureEngine::new(fft_size, DEFAULT_SAMPLE_RATE) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let config = StreamConfig::capture(fft_size);
    let device = match CpalInput::open(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = engine.start(device) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
    eprintln!("capturing: fft size {}, {} Hz", fft_size, DEFAULT_SAMPLE_RATE);

    let frames = engine.frames();
    let deadline = Instant::now() + Duration::from_secs_f64(duration_secs);
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(100));
        if let Some(frame) = frames.take() {
            match frame.peak_bin() {
                Some(bin) => eprintln!(
                    "peak {:8.1} Hz  {:7.1} dB",
                    frame.bin_frequency(bin),
                    frame.bins()[bin]
                ),
                None => eprintln!("silence"),
            }
        }
    }
    engine.stop();
}

fn cmd_render(args: &[String]) {
    if args.len() < 3 || args[2].starts_with('-') {
        eprintln!("ERROR: render requires an output path");
        std::process::exit(1);
    }
    let out_path = &args[2];
    let mut frequency = DEFAULT_FREQUENCY_HZ;
    let mut amplitude = DEFAULT_AMPLITUDE;
    let mut duration_secs = DEFAULT_DURATION_SECS;
    let mut use_wavetable = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--frequency" | "-f" => {
                i += 1;
                frequency = parse_f64(args, i, "frequency");
            }
            "--amplitude" | "-a" => {
                i += 1;
                amplitude = parse_f64(args, i, "amplitude");
            }
            "--duration" | "-d" => {
                i += 1;
                duration_secs = parse_f64(args, i, "duration");
            }
            "--wavetable" => use_wavetable = true,
            other => unknown_option(other),
        }
        i += 1;
    }
    check_duration(duration_secs);

    let sample_rate = DEFAULT_SAMPLE_RATE;
    let frames = (duration_secs * f64::from(sample_rate)) as usize;

    let samples = if use_wavetable {
        let mut generator = match WavetableGenerator::new(frequency, amplitude, sample_rate) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        };
        tonescope::render(&mut generator, ChannelLayout::Mono, frames)
    } else {
        let params = Arc::new(ToneParams::new());
        params.set_frequency(frequency);
        params.set_amplitude(amplitude);
        let mut generator = ToneGenerator::new(params, sample_rate);
        tonescope::render(&mut generator, ChannelLayout::Mono, frames)
    };

    if let Err(e) = tonescope::io::wav::write_wav_file(
        Path::new(out_path),
        &samples,
        sample_rate,
        ChannelLayout::Mono,
    ) {
        eprintln!("ERROR: Failed to write {}: {}", out_path, e);
        std::process::exit(1);
    }
    eprintln!("wrote {} frames to {}", frames, out_path);
}

fn run_playback<S: SampleSource + 'static>(
    config: StreamConfig,
    source: S,
    duration_secs: f64,
    position: Option<(Arc<PlaybackPosition>, usize)>,
) {
    check_duration(duration_secs);

    let device = match CpalOutput::open(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = PlaybackEngine::new(config);
    if let Err(e) = engine.start(device, source) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    let deadline = Instant::now() + Duration::from_secs_f64(duration_secs);
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(250));
        if let Some((position, total)) = &position {
            eprintln!("position: frame {} / {}", position.load(), total);
        }
    }
    engine.stop();
}

fn check_duration(duration_secs: f64) {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        eprintln!("ERROR: duration must be positive");
        std::process::exit(1);
    }
}

fn unknown_option(option: &str) -> ! {
    eprintln!("ERROR: Unknown option: {}", option);
    std::process::exit(1);
}

fn parse_f64(args: &[String], idx: usize, name: &str) -> f64 {
    if idx >= args.len() {
        eprintln!("ERROR: --{} requires a value", name);
        std::process::exit(1);
    }
    match args[idx].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    }
}

fn parse_usize(args: &[String], idx: usize, name: &str) -> usize {
    if idx >= args.len() {
        eprintln!("ERROR: --{} requires a value", name);
        std::process::exit(1);
    }
    match args[idx].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: tonescope-cli <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tone         Mono sine tone through the default output");
    eprintln!("  binaural     Stereo tone with balance and a right-channel phase delay");
    eprintln!("  dual         Independent left/right tones");
    eprintln!("  wavetable    Precomputed single-cycle loop");
    eprintln!("  play <file>  Loop a decoded recording with balance and delay");
    eprintln!("  spectrogram  Capture the default input and report the peak bin");
    eprintln!("  render <out.wav>  Render a tone offline to a WAV file");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --frequency, -f <hz>   Tone frequency (default: 440)");
    eprintln!("  --amplitude, -a <0-1>  Amplitude (default: 0.5)");
    eprintln!("  --left, -l <hz>        Left frequency (dual)");
    eprintln!("  --right, -r <hz>       Right frequency (dual)");
    eprintln!("  --balance, -b <0-1>    Right share of the amplitude (binaural, play)");
    eprintln!("  --delay-ms <ms>        Right-channel delay (binaural, play)");
    eprintln!("  --fft-size <N>         Analysis window, power of two (default: 2048)");
    eprintln!("  --wavetable            Render through the wavetable generator");
    eprintln!("  --duration, -d <secs>  Session length (default: 5)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  tonescope-cli tone -f 220 -a 0.8");
    eprintln!("  tonescope-cli binaural -f 440 --delay-ms 0.5 -b 0.6");
    eprintln!("  tonescope-cli dual -l 440 -r 444");
    eprintln!("  tonescope-cli play clip.wav --delay-ms 20 -d 10");
    eprintln!("  tonescope-cli spectrogram --fft-size 4096");
    eprintln!("  tonescope-cli render sweep.wav -f 880 -d 2");
}
