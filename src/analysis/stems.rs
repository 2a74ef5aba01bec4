//! Stem separation backends
//!
//! `DemucsStemSeparator` shells out to the demucs CLI, keeping the external
//! tool's invocation syntax in exactly one place behind the `StemSeparator`
//! trait. `PlaceholderStemSeparator` stands in when separation is disabled.

use crate::analysis::traits::StemSeparator;
use crate::error::{BackbeatError, Result};
use crate::types::StemPaths;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default demucs model (fine-tuned hybrid transformer)
pub const DEFAULT_MODEL: &str = "htdemucs_ft";

const STEM_NAMES: [&str; 4] = ["vocals", "drums", "bass", "other"];

/// Stem separator invoking the demucs CLI
pub struct DemucsStemSeparator {
    /// Demucs model name passed via `-n`
    model: String,
    /// Whether the demucs binary was found on PATH
    available: bool,
}

impl DemucsStemSeparator {
    /// Create a separator for the given model, probing for the binary
    pub fn new(model: impl Into<String>) -> Self {
        let available = probe_demucs();
        if !available {
            warn!("demucs binary not found on PATH, stem separation disabled");
        }
        Self {
            model: model.into(),
            available,
        }
    }
}

impl Default for DemucsStemSeparator {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl StemSeparator for DemucsStemSeparator {
    fn separate(&self, input_path: &Path, output_dir: &Path) -> Result<StemPaths> {
        if !self.available {
            return Err(BackbeatError::demucs_not_found());
        }

        std::fs::create_dir_all(output_dir)
            .map_err(|e| BackbeatError::output_error(output_dir, e))?;

        info!(
            "Separating stems with demucs model '{}': {}",
            self.model,
            input_path.display()
        );

        let output = Command::new("demucs")
            .arg("-n")
            .arg(&self.model)
            .arg("-o")
            .arg(output_dir)
            .arg(input_path)
            .output()
            .map_err(|e| BackbeatError::StemUnavailable {
                reason: format!("failed to run demucs: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackbeatError::StemUnavailable {
                reason: format!(
                    "demucs exited with {}: {}",
                    output.status,
                    stderr.trim().lines().last().unwrap_or("no output")
                ),
            });
        }

        // Demucs writes <output_dir>/<model>/<track_name>/<stem>.wav
        let track_name = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("track");
        let expected_dir = output_dir.join(&self.model).join(track_name);

        let stem_dir = if expected_dir.is_dir() {
            expected_dir
        } else {
            // Model aliases can change the directory name; search for the
            // stems instead of guessing.
            find_stem_dir(output_dir).ok_or_else(|| BackbeatError::StemUnavailable {
                reason: format!(
                    "demucs succeeded but no stem directory found under {}",
                    output_dir.display()
                ),
            })?
        };

        debug!("Collecting stems from {}", stem_dir.display());
        collect_stems(&stem_dir)
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "demucs"
    }
}

/// Check whether the demucs binary can be invoked
fn probe_demucs() -> bool {
    Command::new("demucs")
        .arg("--help")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Find a directory containing all four stem files
fn find_stem_dir(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .find(|dir| STEM_NAMES.iter().all(|name| dir.join(format!("{}.wav", name)).is_file()))
}

/// Build StemPaths from a directory, verifying all four files exist
fn collect_stems(dir: &Path) -> Result<StemPaths> {
    let stem = |name: &str| -> Result<PathBuf> {
        let path = dir.join(format!("{}.wav", name));
        if path.is_file() {
            Ok(path)
        } else {
            Err(BackbeatError::StemUnavailable {
                reason: format!("expected stem file missing: {}", path.display()),
            })
        }
    };

    Ok(StemPaths {
        vocals: stem("vocals")?,
        drums: stem("drums")?,
        bass: stem("bass")?,
        other: stem("other")?,
    })
}

/// Placeholder stem separator (fallback when separation is disabled)
pub struct PlaceholderStemSeparator {
    available: bool,
}

impl PlaceholderStemSeparator {
    pub fn new() -> Self {
        Self { available: false }
    }
}

impl Default for PlaceholderStemSeparator {
    fn default() -> Self {
        Self::new()
    }
}

impl StemSeparator for PlaceholderStemSeparator {
    fn separate(&self, input_path: &Path, _output_dir: &Path) -> Result<StemPaths> {
        Err(BackbeatError::StemUnavailable {
            reason: format!(
                "Stem separation not enabled for '{}'. Run with --stems",
                input_path.display()
            ),
        })
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_placeholder_is_unavailable() {
        let sep = PlaceholderStemSeparator::new();
        assert!(!sep.is_available());
        assert!(sep
            .separate(Path::new("x.mp3"), Path::new("/tmp"))
            .is_err());
    }

    #[test]
    fn test_collect_stems_complete_dir() {
        let dir = TempDir::new().unwrap();
        for name in STEM_NAMES {
            std::fs::write(dir.path().join(format!("{}.wav", name)), b"").unwrap();
        }
        let stems = collect_stems(dir.path()).unwrap();
        assert_eq!(stems.vocals, dir.path().join("vocals.wav"));
        assert_eq!(stems.all().len(), 4);
    }

    #[test]
    fn test_collect_stems_missing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vocals.wav"), b"").unwrap();
        assert!(collect_stems(dir.path()).is_err());
    }

    #[test]
    fn test_find_stem_dir_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("htdemucs_ft").join("my_track");
        std::fs::create_dir_all(&nested).unwrap();
        for name in STEM_NAMES {
            std::fs::write(nested.join(format!("{}.wav", name)), b"").unwrap();
        }
        assert_eq!(find_stem_dir(dir.path()), Some(nested));
    }

    #[test]
    fn test_find_stem_dir_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_stem_dir(dir.path()), None);
    }
}
