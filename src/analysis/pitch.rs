//! Pitch shifting backends
//!
//! `RubberBandPitchShifter` shells out to the Rubber Band CLI, which
//! shifts pitch by a semitone count while preserving duration. Like stem
//! separation, the external tool's invocation syntax lives in exactly one
//! place behind the `PitchShifter` trait.

use crate::analysis::traits::PitchShifter;
use crate::error::{BackbeatError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

/// Pitch shifter invoking the rubberband CLI
pub struct RubberBandPitchShifter {
    /// Whether the rubberband binary was found on PATH
    available: bool,
}

impl RubberBandPitchShifter {
    /// Create a shifter, probing for the binary
    pub fn new() -> Self {
        let available = probe_rubberband();
        if !available {
            warn!("rubberband binary not found on PATH, pitch shifting disabled");
        }
        Self { available }
    }
}

impl Default for RubberBandPitchShifter {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchShifter for RubberBandPitchShifter {
    fn shift(&self, input_path: &Path, semitones: i32, output_path: &Path) -> Result<()> {
        if !self.available {
            return Err(BackbeatError::rubberband_not_found());
        }
        if semitones == 0 {
            return Err(BackbeatError::invalid_parameter(
                "shift",
                semitones,
                "a zero-semitone shift is an identity; skip the step instead",
            ));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BackbeatError::output_error(parent, e))?;
        }

        info!(
            "Pitch shifting {} by {} semitones",
            input_path.display(),
            semitones
        );

        let output = Command::new("rubberband")
            .arg("--pitch")
            .arg(semitones.to_string())
            .arg(input_path)
            .arg(output_path)
            .output()
            .map_err(|e| BackbeatError::PitchShiftUnavailable {
                reason: format!("failed to run rubberband: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackbeatError::PitchShiftUnavailable {
                reason: format!(
                    "rubberband exited with {}: {}",
                    output.status,
                    stderr.trim().lines().last().unwrap_or("no output")
                ),
            });
        }

        if !output_path.is_file() {
            return Err(BackbeatError::PitchShiftUnavailable {
                reason: format!(
                    "rubberband succeeded but produced no file at {}",
                    output_path.display()
                ),
            });
        }

        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "rubberband"
    }
}

/// Check whether the rubberband binary can be invoked
fn probe_rubberband() -> bool {
    Command::new("rubberband")
        .arg("--version")
        .output()
        .is_ok()
}
