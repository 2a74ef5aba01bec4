//! Pipeline orchestration
//!
//! Sequences decode, trim, tempo detection, click synthesis, stem
//! separation, and mixdown into a single synchronous run. Every
//! computationally heavy concern lives behind a collaborator (detector,
//! separator, codec); this module is sequencing, naming, and bookkeeping.

use crate::analysis::{
    DemucsStemSeparator, FixedTempoDetector, PitchShifter, RubberBandPitchShifter, StemSeparator,
    StratumTempoDetector, TempoDetector,
};
use crate::audio::{self, ANALYSIS_SAMPLE_RATE};
use crate::click;
use crate::config::{Settings, StartBeatStrategy};
use crate::error::{BackbeatError, Result};
use crate::export::{self, Artifact, Manifest, RunParams};
use crate::mixdown;
use crate::pipeline::progress::{ProgressSink, Step};
use crate::types::{AudioFormat, BeatSchedule, TempoResult, Waveform};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Minimum audio duration in seconds required for reliable tempo detection
const MIN_AUDIO_DURATION_SECS: f64 = 3.0;

/// Pipeline result summary
#[derive(Debug)]
pub struct PipelineResult {
    /// Detected or overridden tempo
    pub tempo_bpm: f64,
    /// Files produced by this run (or by the satisfied previous run)
    pub artifacts: Vec<Artifact>,
    /// True when a previous run with identical parameters was reused
    pub skipped: bool,
}

/// Run the full generation pipeline with default backends
pub fn run(settings: &Settings, progress: &dyn ProgressSink) -> Result<PipelineResult> {
    let detector: Box<dyn TempoDetector> = match settings.tempo_override {
        Some(bpm) => Box::new(FixedTempoDetector::new(bpm)),
        None => Box::new(StratumTempoDetector::new()),
    };

    let separator: Option<Box<dyn StemSeparator>> = if settings.stems_enabled {
        Some(Box::new(DemucsStemSeparator::new(settings.model.clone())))
    } else {
        None
    };

    let shifter: Option<Box<dyn PitchShifter>> = if settings.shift_semitones != 0 {
        Some(Box::new(RubberBandPitchShifter::new()))
    } else {
        None
    };

    run_with_backends(
        settings,
        detector.as_ref(),
        separator.as_deref(),
        shifter.as_deref(),
        progress,
    )
}

/// Run the pipeline with caller-supplied analysis backends
pub fn run_with_backends(
    settings: &Settings,
    detector: &dyn TempoDetector,
    separator: Option<&dyn StemSeparator>,
    shifter: Option<&dyn PitchShifter>,
    progress: &dyn ProgressSink,
) -> Result<PipelineResult> {
    let run_start = Instant::now();

    validate_input(settings)?;

    // A previous run with identical parameters satisfies this one
    if !settings.force {
        if let Some(manifest) = export::read_manifest(&settings.output) {
            if manifest.satisfies(settings) {
                info!(
                    "Output already generated with identical parameters, nothing to do \
                     (use --force to regenerate)"
                );
                return Ok(PipelineResult {
                    tempo_bpm: manifest.tempo_bpm,
                    artifacts: manifest.artifacts,
                    skipped: true,
                });
            }
            debug!("Existing manifest does not match current parameters, regenerating");
        }
    }

    std::fs::create_dir_all(&settings.output)
        .map_err(|e| BackbeatError::output_error(&settings.output, e))?;

    let track_name = settings
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("track")
        .to_string();
    let out_path = |suffix: &str| -> PathBuf {
        settings.output.join(format!("{}_{}.wav", track_name, suffix))
    };

    let mut artifacts: Vec<Artifact> = Vec::new();

    // Phase 1: decode
    progress.on_step(Step::Decode, &settings.input.display().to_string());
    let decode_start = Instant::now();
    let source = audio::decode(&settings.input)?;
    info!(
        "Decoded {} ({:.2}s @ {}Hz) in {:.2}s",
        settings.input.display(),
        source.duration_secs(),
        source.sample_rate,
        decode_start.elapsed().as_secs_f64()
    );

    // Phase 2: pitch shift. The shifter is file-to-file, so the decoded
    // source goes out as a WAV copy, through the shifter, and back in;
    // every later step (trim, tempo, stems, synthesis) sees shifted audio.
    let (source, stem_input) = if settings.shift_semitones != 0 {
        let shifter = shifter.ok_or_else(BackbeatError::rubberband_not_found)?;
        progress.on_step(
            Step::PitchShift,
            &format!("{:+} semitones", settings.shift_semitones),
        );
        let shift_start = Instant::now();

        let unshifted = settings
            .output
            .join(format!("{}_unshifted.tmp.wav", track_name));
        audio::write_wav(&source, &unshifted)?;
        let shifted_path = out_path("shifted");
        let shifted = shifter.shift(&unshifted, settings.shift_semitones, &shifted_path);
        let _ = std::fs::remove_file(&unshifted);
        shifted?;

        let shifted = audio::decode(&shifted_path)?;
        info!(
            "Shifted {:+} semitones with {} in {:.2}s",
            settings.shift_semitones,
            shifter.name(),
            shift_start.elapsed().as_secs_f64()
        );
        artifacts.push(export::artifact("shifted", &shifted_path));
        (shifted, shifted_path)
    } else {
        (source, settings.input.clone())
    };

    // Phase 3: trim
    progress.on_step(Step::Trim, "");
    let source = match settings.trim_db {
        Some(top_db) => mixdown::trim_silence(&source, top_db),
        None => source,
    };
    if source.is_empty() {
        return Err(BackbeatError::AnalysisError {
            path: settings.input.clone(),
            reason: "Audio is entirely silent after trimming".to_string(),
        });
    }

    // Phase 4: tempo
    progress.on_step(Step::DetectTempo, detector.name());
    let tempo = detect_tempo(settings, detector, &source)?;
    info!(
        "Tempo: {:.2} BPM (confidence {:.2}, {} beats)",
        tempo.bpm,
        tempo.confidence,
        tempo.beat_times.len()
    );

    // Phase 5: beat track - clicks at detected beat positions, source length
    progress.on_step(Step::BeatTrack, "");
    let click_pulse = click::generate_click(&settings.click, source.sample_rate)?;
    let schedule = BeatSchedule::Onsets(tempo.beat_times.clone());
    let beat_track = click::build_overlay_track(
        &click_pulse,
        &schedule.onset_times()?,
        source.sample_rate,
        source.len(),
    )?;
    let beat_track_path = out_path("beat");
    audio::write_wav(&beat_track, &beat_track_path)?;
    artifacts.push(export::artifact("beat_track", &beat_track_path));

    // Phase 6: stems
    let stems = separate_stems(settings, &stem_input, separator, progress);

    // Phase 7: backing tracks
    let mut backing_tracks: Vec<(String, Waveform)> = Vec::new();
    if let (Some(stems), Some(exclude)) = (stems.as_ref(), settings.exclude_stem.as_deref()) {
        progress.on_step(Step::BackingTracks, exclude);
        match build_backing_tracks(settings, stems, exclude, &beat_track) {
            Ok(tracks) => {
                for (suffix, waveform) in &tracks {
                    let path = out_path(suffix);
                    audio::write_wav(waveform, &path)?;
                    artifacts.push(export::artifact("backing_track", &path));
                }
                backing_tracks = tracks;
            }
            Err(e) if e.is_recoverable() => {
                warn!("Skipping backing tracks: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    // Phase 8: start beat
    if settings.add_start_beat {
        progress.on_step(Step::StartBeat, settings.strategy.as_str());

        let mut targets: Vec<(String, &Waveform)> =
            vec![("beat".to_string(), &beat_track)];
        for (suffix, waveform) in &backing_tracks {
            targets.push((suffix.clone(), waveform));
        }
        // Without stems in play, the count-in goes on the source itself
        if backing_tracks.is_empty() {
            targets.push(("source".to_string(), &source));
        }

        for (suffix, waveform) in targets {
            let spliced = add_start_beat(settings, waveform, tempo.bpm)?;
            let path = out_path(&format!("{}_with_start_beat", suffix));
            audio::write_wav(&spliced, &path)?;
            artifacts.push(export::artifact("start_beat", &path));
        }
    }

    // Phase 9: manifest
    progress.on_step(Step::Manifest, "");
    let manifest = Manifest::new(
        RunParams::from_settings(settings),
        tempo.bpm,
        artifacts.clone(),
    );
    export::write_manifest(&manifest, &settings.output)?;

    info!(
        "Generated {} artifacts in {:.2}s",
        artifacts.len(),
        run_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        tempo_bpm: tempo.bpm,
        artifacts,
        skipped: false,
    })
}

fn validate_input(settings: &Settings) -> Result<()> {
    if !settings.input.exists() {
        return Err(BackbeatError::FileNotFound(settings.input.clone()));
    }
    if !AudioFormat::is_supported_path(&settings.input) {
        return Err(BackbeatError::UnsupportedFormat {
            path: settings.input.clone(),
            format: settings
                .input
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        });
    }
    if settings.start_beat_clicks < 1 && settings.add_start_beat {
        return Err(BackbeatError::ConfigError(
            "--clicks must be at least 1 when --add-start-beat is set".to_string(),
        ));
    }
    Ok(())
}

/// Detect tempo on a downsampled analysis copy of the source
///
/// Beat times are expressed in seconds, so they transfer unchanged back to
/// the source rate that synthesis runs at.
fn detect_tempo(
    settings: &Settings,
    detector: &dyn TempoDetector,
    source: &Waveform,
) -> Result<TempoResult> {
    if settings.tempo_override.is_none() && source.duration_secs() < MIN_AUDIO_DURATION_SECS {
        return Err(BackbeatError::AnalysisError {
            path: settings.input.clone(),
            reason: format!(
                "Audio too short ({:.1}s). Minimum {:.0}s required for reliable tempo detection. \
                 Tip: supply --tempo to skip detection.",
                source.duration_secs(),
                MIN_AUDIO_DURATION_SECS
            ),
        });
    }

    let analysis = audio::resample(source, ANALYSIS_SAMPLE_RATE);
    detector.detect(&analysis).map_err(|e| match e {
        BackbeatError::AnalysisError { reason, .. } => BackbeatError::AnalysisError {
            path: settings.input.clone(),
            reason,
        },
        other => other,
    })
}

/// Run stem separation, degrading gracefully when it is unavailable
fn separate_stems(
    settings: &Settings,
    input: &Path,
    separator: Option<&dyn StemSeparator>,
    progress: &dyn ProgressSink,
) -> Option<crate::types::StemPaths> {
    let separator = separator?;

    if !separator.is_available() {
        warn!(
            "Stem separation requested but {} is not available",
            separator.name()
        );
        return None;
    }

    progress.on_step(Step::SeparateStems, separator.name());
    let start = Instant::now();
    match separator.separate(input, &settings.stems_dir) {
        Ok(stems) => {
            info!(
                "Stems separated in {:.2}s",
                start.elapsed().as_secs_f64()
            );
            Some(stems)
        }
        Err(e) => {
            warn!("Stem separation failed: {}", e);
            None
        }
    }
}

/// Mix every stem except the excluded one; optionally layer in the beat track
fn build_backing_tracks(
    settings: &Settings,
    stems: &crate::types::StemPaths,
    exclude: &str,
    beat_track: &Waveform,
) -> Result<Vec<(String, Waveform)>> {
    let kept_paths = stems.excluding(exclude);
    let mut kept = Vec::with_capacity(kept_paths.len());
    for path in kept_paths {
        kept.push(audio::decode(path)?);
    }

    let backing = mixdown::mix_down(&kept)?;
    let mut tracks = vec![(format!("backing_no_{}", exclude), backing.clone())];

    if settings.include_beat {
        // Demucs output may not share the source rate; align the beat track
        let beat = audio::resample(beat_track, backing.sample_rate);
        let with_beat = mixdown::mix_down(&[backing, beat])?;
        tracks.push((format!("backing_no_{}_with_beat", exclude), with_beat));
    }

    Ok(tracks)
}

/// Apply the configured count-in strategy
fn add_start_beat(settings: &Settings, source: &Waveform, tempo_bpm: f64) -> Result<Waveform> {
    match settings.strategy {
        StartBeatStrategy::Prefix => click::add_start_beat_prefix(
            source,
            &settings.click,
            settings.start_beat_clicks,
            tempo_bpm,
        ),
        StartBeatStrategy::Overlay => click::add_start_beat_overlay(
            source,
            &settings.click,
            settings.start_beat_clicks,
            tempo_bpm,
        ),
    }
}
