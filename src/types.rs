//! Core data types for backbeat
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Waveform
// =============================================================================

/// A single channel of audio samples paired with its sample rate
///
/// Samples are f32, typically normalized to [-1.0, 1.0]. The synthesizer does
/// not validate normalization; callers should pre-normalize if clipping at
/// encode time is undesired.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Mono samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// An all-zero waveform of the given length
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate > 0 {
            self.samples.len() as f64 / self.sample_rate as f64
        } else {
            0.0
        }
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

// =============================================================================
// Click synthesis inputs
// =============================================================================

/// Shape of a single metronome pulse: a sine tone burst of fixed duration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClickSpec {
    /// Duration of one click in seconds
    pub duration_secs: f64,
    /// Tone frequency in Hz
    pub frequency_hz: f64,
    /// Peak amplitude in [0.0, 1.0]
    pub amplitude: f32,
}

impl Default for ClickSpec {
    /// The standard metronome click: 100ms of 440Hz at half amplitude
    fn default() -> Self {
        Self {
            duration_secs: 0.1,
            frequency_hz: 440.0,
            amplitude: 0.5,
        }
    }
}

/// Where the clicks of a click track fall in time
#[derive(Debug, Clone, PartialEq)]
pub enum BeatSchedule {
    /// A fixed count of clicks at a uniform inter-beat interval derived
    /// from a tempo estimate
    Uniform { count: usize, tempo_bpm: f64 },
    /// Explicit beat onset times in seconds, non-negative and non-decreasing,
    /// as produced by a tempo detector
    Onsets(Vec<f64>),
}

impl BeatSchedule {
    /// Resolve to explicit onset times in seconds.
    ///
    /// A uniform schedule places beat `i` at `i * 60/tempo`; explicit onsets
    /// pass through unchanged (they are validated at overlay time).
    pub fn onset_times(&self) -> crate::error::Result<Vec<f64>> {
        match self {
            BeatSchedule::Uniform { count, tempo_bpm } => {
                if *count < 1 {
                    return Err(crate::error::BackbeatError::invalid_parameter(
                        "beat count",
                        count,
                        "at least one beat is required",
                    ));
                }
                if !(*tempo_bpm > 0.0) || !tempo_bpm.is_finite() {
                    return Err(crate::error::BackbeatError::invalid_parameter(
                        "tempo",
                        tempo_bpm,
                        "tempo must be > 0 BPM",
                    ));
                }
                let interval = 60.0 / tempo_bpm;
                Ok((0..*count).map(|i| i as f64 * interval).collect())
            }
            BeatSchedule::Onsets(times) => Ok(times.clone()),
        }
    }
}

// =============================================================================
// Analysis results
// =============================================================================

/// Tempo analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempoResult {
    /// Detected tempo in beats per minute
    pub bpm: f64,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    /// Beat onset times in seconds, non-decreasing
    pub beat_times: Vec<f64>,
}

impl Default for TempoResult {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            confidence: 0.0,
            beat_times: vec![],
        }
    }
}

/// Paths to separated stem files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StemPaths {
    pub vocals: PathBuf,
    pub drums: PathBuf,
    pub bass: PathBuf,
    pub other: PathBuf,
}

impl StemPaths {
    /// All four stem paths in a fixed order
    pub fn all(&self) -> [&PathBuf; 4] {
        [&self.vocals, &self.drums, &self.bass, &self.other]
    }

    /// Stem paths excluding the named stem (e.g. "vocals")
    pub fn excluding(&self, stem: &str) -> Vec<&PathBuf> {
        [
            ("vocals", &self.vocals),
            ("drums", &self.drums),
            ("bass", &self.bass),
            ("other", &self.other),
        ]
        .into_iter()
        .filter(|(name, _)| *name != stem)
        .map(|(_, path)| path)
        .collect()
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats accepted as pipeline input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
