//! Runtime configuration settings

use crate::types::ClickSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the count-in is spliced onto the source track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartBeatStrategy {
    /// Clicks concatenated before the untouched source
    Prefix,
    /// Clicks overlaid on a grid, source delayed by the lead time
    Overlay,
}

impl StartBeatStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartBeatStrategy::Prefix => "prefix",
            StartBeatStrategy::Overlay => "overlay",
        }
    }
}

/// Runtime settings for the generation pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input audio file
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Tempo override in BPM; detection runs when None
    pub tempo_override: Option<f64>,
    /// Pitch shift in semitones; 0 disables the step
    pub shift_semitones: i32,
    /// Add a count-in to generated tracks
    pub add_start_beat: bool,
    /// Number of count-in clicks
    pub start_beat_clicks: usize,
    /// Count-in splice strategy
    pub strategy: StartBeatStrategy,
    /// Click pulse shape
    pub click: ClickSpec,
    /// Enable stem separation
    pub stems_enabled: bool,
    /// Stems output directory
    pub stems_dir: PathBuf,
    /// Demucs model name
    pub model: String,
    /// Stem excluded from the backing track
    pub exclude_stem: Option<String>,
    /// Mix the beat track into the backing track
    pub include_beat: bool,
    /// Silence trim threshold in dB below peak; None disables trimming
    pub trim_db: Option<f32>,
    /// Regenerate even when a previous run used identical parameters
    pub force: bool,
    /// Show progress output
    pub show_progress: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let strategy = match cli.strategy.as_str() {
            "overlay" => StartBeatStrategy::Overlay,
            _ => StartBeatStrategy::Prefix,
        };

        Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            tempo_override: cli.tempo,
            shift_semitones: cli.shift,
            add_start_beat: cli.add_start_beat,
            start_beat_clicks: cli.clicks,
            strategy,
            click: ClickSpec {
                duration_secs: cli.click_duration,
                frequency_hz: cli.click_freq,
                amplitude: cli.click_amplitude,
            },
            stems_enabled: cli.stems,
            stems_dir: cli.stems_dir(),
            model: cli.model.clone(),
            exclude_stem: cli.exclude.clone(),
            include_beat: cli.include_beat,
            trim_db: if cli.no_trim { None } else { Some(cli.trim_db) },
            force: cli.force,
            show_progress: !cli.quiet,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.mp3"),
            output: PathBuf::from("./output"),
            tempo_override: None,
            shift_semitones: 0,
            add_start_beat: false,
            start_beat_clicks: 4,
            strategy: StartBeatStrategy::Prefix,
            click: ClickSpec::default(),
            stems_enabled: false,
            stems_dir: PathBuf::from("./output/stems"),
            model: "htdemucs_ft".to_string(),
            exclude_stem: None,
            include_beat: false,
            trim_db: Some(crate::mixdown::DEFAULT_TRIM_DB),
            force: false,
            show_progress: true,
        }
    }
}
