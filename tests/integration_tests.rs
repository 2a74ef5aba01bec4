//! Integration tests for the backbeat pipeline
//!
//! These tests verify the full generation pipeline produces correct output
//! files with the expected lengths and manifest contents. Tempo is pinned
//! with `tempo_override` so beat grids are deterministic.

use backbeat::config::{Settings, StartBeatStrategy};
use backbeat::pipeline::{self, NullProgress};
use backbeat::types::ClickSpec;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Generate a sine wave WAV file for testing
///
/// Creates a mono 16-bit WAV file at the specified path.
fn generate_sine_wav(path: &Path, frequency_hz: f32, duration_secs: f32, sample_rate: u32) {
    use std::f32::consts::PI;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let amplitude = 0.5f32; // 50% amplitude to avoid clipping

    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * PI * frequency_hz * t).sin() * amplitude;
        let sample_i16 = (sample * 32767.0) as i16;
        writer.write_sample(sample_i16).expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

fn read_wav_len(path: &Path) -> usize {
    hound::WavReader::open(path)
        .expect("Failed to open WAV")
        .len() as usize
}

fn test_settings(input: &Path, output: &Path, tempo: f64) -> Settings {
    Settings {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        tempo_override: Some(tempo),
        trim_db: None,
        show_progress: false,
        ..Settings::default()
    }
}

#[test]
fn test_pipeline_produces_beat_track() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 4.0, 44100);

    let settings = test_settings(&input, output_dir.path(), 120.0);
    let result = pipeline::run(&settings, &NullProgress).expect("Pipeline failed");

    assert_eq!(result.tempo_bpm, 120.0);
    assert!(!result.skipped);

    // Beat track matches the source length exactly
    let beat_path = output_dir.path().join("song_beat.wav");
    assert!(beat_path.exists(), "Beat track not created");
    assert_eq!(read_wav_len(&beat_path), 44100 * 4);
}

#[test]
fn test_pipeline_writes_manifest() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 4.0, 22050);

    let settings = test_settings(&input, output_dir.path(), 100.0);
    let result = pipeline::run(&settings, &NullProgress).expect("Pipeline failed");

    let manifest_path = output_dir.path().join("backbeat.json");
    assert!(manifest_path.exists(), "Manifest not created");

    let content = fs::read_to_string(&manifest_path).expect("Failed to read manifest");
    let json: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");

    assert_eq!(json["tempo_bpm"].as_f64(), Some(100.0));
    assert_eq!(
        json["artifacts"].as_array().map(|a| a.len()),
        Some(result.artifacts.len())
    );
    // Every listed artifact actually exists on disk
    for artifact in &result.artifacts {
        assert!(artifact.path.exists(), "Missing artifact {:?}", artifact.path);
    }
}

#[test]
fn test_rerun_skips_then_force_regenerates() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 4.0, 22050);

    let settings = test_settings(&input, output_dir.path(), 120.0);
    assert!(!pipeline::run(&settings, &NullProgress).unwrap().skipped);
    assert!(pipeline::run(&settings, &NullProgress).unwrap().skipped);

    let mut forced = settings.clone();
    forced.force = true;
    assert!(!pipeline::run(&forced, &NullProgress).unwrap().skipped);
}

#[test]
fn test_start_beat_prefix_adds_count_in() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 2.0, 44100);

    let mut settings = test_settings(&input, output_dir.path(), 120.0);
    settings.add_start_beat = true;
    settings.start_beat_clicks = 4;
    settings.strategy = StartBeatStrategy::Prefix;

    pipeline::run(&settings, &NullProgress).expect("Pipeline failed");

    // 4 clicks at 120 BPM = 4 * 0.5s = 2s of count-in before the source
    let spliced = output_dir.path().join("song_source_with_start_beat.wav");
    assert!(spliced.exists(), "Count-in track not created");
    assert_eq!(read_wav_len(&spliced), 44100 * 2 + 44100 * 2);

    // The beat track also gets a count-in
    assert!(output_dir
        .path()
        .join("song_beat_with_start_beat.wav")
        .exists());
}

#[test]
fn test_start_beat_overlay_adds_lead_time() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 2.0, 44100);

    let mut settings = test_settings(&input, output_dir.path(), 120.0);
    settings.add_start_beat = true;
    settings.start_beat_clicks = 4;
    settings.strategy = StartBeatStrategy::Overlay;

    pipeline::run(&settings, &NullProgress).expect("Pipeline failed");

    // Overlay delays the source by the last initial beat's onset: 3 * 0.5s
    let spliced = output_dir.path().join("song_source_with_start_beat.wav");
    assert_eq!(read_wav_len(&spliced), 44100 * 2 + 44100 * 3 / 2);
}

#[test]
fn test_custom_click_spec_flows_through() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 2.0, 22050);

    let mut settings = test_settings(&input, output_dir.path(), 60.0);
    settings.click = ClickSpec {
        duration_secs: 0.05,
        frequency_hz: 880.0,
        amplitude: 0.3,
    };

    let result = pipeline::run(&settings, &NullProgress).expect("Pipeline failed");
    assert_eq!(result.tempo_bpm, 60.0);
    assert!(output_dir.path().join("song_beat.wav").exists());
}

#[test]
fn test_invalid_click_amplitude_fails() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");
    generate_sine_wav(&input, 220.0, 2.0, 22050);

    let mut settings = test_settings(&input, output_dir.path(), 120.0);
    settings.click.amplitude = 1.5;

    assert!(pipeline::run(&settings, &NullProgress).is_err());
}

#[test]
fn test_missing_input_fails_cleanly() {
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = test_settings(
        Path::new("/nonexistent/track.mp3"),
        output_dir.path(),
        120.0,
    );

    let err = pipeline::run(&settings, &NullProgress).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_trim_applies_before_beat_track() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let input = input_dir.path().join("song.wav");

    // One second of silence, then two seconds of tone
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input, spec).expect("Failed to create WAV");
    for _ in 0..22050 {
        writer.write_sample(0i16).unwrap();
    }
    for i in 0..(22050 * 2) {
        let t = i as f32 / 22050.0;
        let sample = 0.5 * (std::f32::consts::TAU * 220.0 * t).sin();
        writer.write_sample((sample * 32767.0) as i16).unwrap();
    }
    writer.finalize().expect("Failed to finalize WAV");

    let mut settings = test_settings(&input, output_dir.path(), 120.0);
    settings.trim_db = Some(20.0);

    pipeline::run(&settings, &NullProgress).expect("Pipeline failed");

    // Leading silence is trimmed, so the beat track is about two seconds
    let beat_len = read_wav_len(&output_dir.path().join("song_beat.wav"));
    assert!(
        beat_len <= 22050 * 2 && beat_len > 22050 * 2 - 2048,
        "Beat track length {} not close to trimmed length",
        beat_len
    );
}
