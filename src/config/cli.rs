//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// backbeat - Backing-track and click-track generator
///
/// Takes a local audio file, detects its tempo, and produces a click track
/// aligned to the beat, a count-in ("start beat") version of the track, and
/// optionally a backing track mixed from demucs-separated stems.
#[derive(Parser, Debug)]
#[command(name = "backbeat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input audio file (MP3, WAV, FLAC, AIFF)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory for generated tracks
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Tempo in BPM; skips detection when given
    #[arg(long, value_name = "BPM")]
    pub tempo: Option<f64>,

    /// Pitch shift in semitones (negative shifts down); requires rubberband
    #[arg(long, value_name = "SEMITONES", default_value = "0", allow_hyphen_values = true)]
    pub shift: i32,

    /// Add a count-in of metronome clicks before the track
    #[arg(long, default_value = "false")]
    pub add_start_beat: bool,

    /// Number of count-in clicks
    #[arg(long, value_name = "N", default_value = "4")]
    pub clicks: usize,

    /// Count-in strategy: concatenated prefix, or clicks overlaid with the
    /// source delayed by the lead time
    #[arg(long, value_name = "STRATEGY", default_value = "prefix")]
    #[arg(value_parser = ["prefix", "overlay"])]
    pub strategy: String,

    /// Click tone frequency in Hz
    #[arg(long, value_name = "HZ", default_value = "440.0")]
    pub click_freq: f64,

    /// Click duration in seconds
    #[arg(long, value_name = "SECS", default_value = "0.1")]
    pub click_duration: f64,

    /// Click amplitude in [0.0, 1.0]
    #[arg(long, value_name = "AMP", default_value = "0.5")]
    pub click_amplitude: f32,

    /// Enable stem separation (vocals, drums, bass, other) via demucs
    #[arg(long, default_value = "false")]
    pub stems: bool,

    /// Demucs model to use for stem separation
    #[arg(long, value_name = "MODEL", default_value = "htdemucs_ft")]
    pub model: String,

    /// Stem to exclude when creating the backing track
    #[arg(long, value_name = "STEM")]
    #[arg(value_parser = ["vocals", "drums", "bass", "other"])]
    pub exclude: Option<String>,

    /// Also mix the beat track into the backing track
    #[arg(long, default_value = "false")]
    pub include_beat: bool,

    /// Trim threshold in dB below peak (leading/trailing silence removal)
    #[arg(long, value_name = "DB", default_value = "20.0")]
    pub trim_db: f32,

    /// Skip silence trimming entirely
    #[arg(long, default_value = "false")]
    pub no_trim: bool,

    /// Regenerate outputs even when a previous run used identical parameters
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    /// Get the effective stems output directory
    pub fn stems_dir(&self) -> PathBuf {
        self.output.join("stems")
    }
}
