//! Unified error types for backbeat
//!
//! Error strategy:
//! - Core synthesis errors (invalid parameters, mismatched buffers): the
//!   caller supplied bad inputs; report immediately, never retry.
//! - Per-artifact errors (decode, tempo analysis): recoverable, skip the
//!   artifact and continue the run.
//! - System errors (output, configuration): fatal, abort the run.
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF";

/// Top-level error type for backbeat operations
#[derive(Debug, Error)]
pub enum BackbeatError {
    // =========================================================================
    // Core synthesis errors - caller must correct inputs and re-invoke
    // =========================================================================
    #[error("Invalid {name}: {value}\n  {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        constraint: &'static str,
    },

    #[error("Sample rate mismatch: {left}Hz vs {right}Hz\n  Tip: Resample both waveforms to a common rate before combining them")]
    SampleRateMismatch { left: u32, right: u32 },

    #[error("Length mismatch after padding: expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    // =========================================================================
    // Recoverable errors - skip artifact, continue run
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Tempo analysis failed for '{path}': {reason}")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    // =========================================================================
    // Stem-specific errors - may disable stems and continue
    // =========================================================================
    #[error("Stem separation unavailable: {reason}\n\n  To enable stem separation, install demucs:\n    pip install demucs\n  and make sure the `demucs` binary is on your PATH")]
    StemUnavailable { reason: String },

    // =========================================================================
    // Fatal errors - abort entire run
    // =========================================================================
    // A failed shift aborts: every later step would otherwise run on the
    // unshifted audio the caller explicitly asked to transpose.
    #[error("Pitch shifting unavailable: {reason}\n\n  To enable pitch shifting, install the Rubber Band CLI:\n    apt install rubberband-cli  (or: brew install rubberband)\n  and make sure the `rubberband` binary is on your PATH")]
    PitchShiftUnavailable { reason: String },

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for backbeat operations
pub type Result<T> = std::result::Result<T, BackbeatError>;

impl BackbeatError {
    /// Returns true if this error is recoverable (skip artifact, continue run)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BackbeatError::DecodeError { .. }
                | BackbeatError::UnsupportedFormat { .. }
                | BackbeatError::AnalysisError { .. }
                | BackbeatError::FileNotFound(_)
        )
    }

    /// Returns true if this error should disable stems but continue processing
    pub fn is_stem_error(&self) -> bool {
        matches!(self, BackbeatError::StemUnavailable { .. })
    }

    /// Create an invalid-parameter error for a value that failed validation
    pub fn invalid_parameter(
        name: &'static str,
        value: impl std::fmt::Display,
        constraint: &'static str,
    ) -> Self {
        BackbeatError::InvalidParameter {
            name,
            value: value.to_string(),
            constraint,
        }
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BackbeatError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!(
                    "Permission denied. Check that you have write access to {}",
                    path.display()
                )
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        BackbeatError::OutputError { path, reason }
    }

    /// Create a stem unavailable error for a missing demucs binary
    pub fn demucs_not_found() -> Self {
        BackbeatError::StemUnavailable {
            reason: "`demucs` binary not found on PATH".to_string(),
        }
    }

    /// Create a pitch shift unavailable error for a missing rubberband binary
    pub fn rubberband_not_found() -> Self {
        BackbeatError::PitchShiftUnavailable {
            reason: "`rubberband` binary not found on PATH".to_string(),
        }
    }
}
