//! Analysis trait abstractions
//!
//! These traits define the interface for swappable analysis backends.
//! The synthesizer consumes tempo detection purely as an oracle: a tempo
//! estimate plus beat onset times. Stem separation is a black box that
//! turns one audio file into four.

use crate::error::Result;
use crate::types::{StemPaths, TempoResult, Waveform};
use std::path::Path;

/// Tempo and beat detection backend
pub trait TempoDetector: Send + Sync {
    /// Detect tempo and beat onset times from audio samples
    ///
    /// Beat times in the result are non-negative and non-decreasing,
    /// expressed in seconds from the start of the waveform.
    fn detect(&self, waveform: &Waveform) -> Result<TempoResult>;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}

/// Pitch shifting backend
///
/// Operates file-to-file: pitch shifting runs before decode so that every
/// downstream step (tempo detection, stems, click synthesis) sees the
/// shifted audio.
pub trait PitchShifter: Send + Sync {
    /// Shift `input_path` by `semitones` (negative shifts down), writing
    /// the duration-preserving result to `output_path`
    fn shift(&self, input_path: &Path, semitones: i32, output_path: &Path) -> Result<()>;

    /// Check if the shifter is available (binary on PATH)
    fn is_available(&self) -> bool;

    /// Get the name of this shifter (for logging)
    fn name(&self) -> &'static str;
}

/// Stem separation backend
pub trait StemSeparator: Send + Sync {
    /// Separate audio into stems (vocals, drums, bass, other)
    ///
    /// # Arguments
    /// * `input_path` - Path to the source audio file
    /// * `output_dir` - Directory to write stem files
    ///
    /// # Returns
    /// Paths to the generated stem files
    fn separate(&self, input_path: &Path, output_dir: &Path) -> Result<StemPaths>;

    /// Check if the separator is available (binary on PATH, model ready)
    fn is_available(&self) -> bool;

    /// Get the name of this separator (for logging)
    fn name(&self) -> &'static str;
}
