//! JSON manifest of a generation run
//!
//! Records what was produced, from which input, with which parameters.
//! The manifest doubles as the re-run cache: a new invocation whose
//! parameters match the recorded ones skips regeneration (unless --force).
//! Matching is parameter-addressed, never filename string-matching.

use crate::config::Settings;
use crate::error::{BackbeatError, Result};
use crate::types::ClickSpec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest schema version
const SCHEMA_VERSION: &str = "1.0";

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "backbeat.json";

/// Top-level manifest structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version for forward compatibility
    pub version: String,
    /// backbeat version that generated this file
    pub generator_version: String,
    /// Timestamp of the run
    pub generated_at: String,
    /// Parameters that produced the artifacts
    pub params: RunParams,
    /// Detected (or overridden) tempo in BPM
    pub tempo_bpm: f64,
    /// Produced artifacts
    pub artifacts: Vec<Artifact>,
}

/// The identity of a run: input plus every parameter that affects output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub input: PathBuf,
    pub tempo_override: Option<f64>,
    pub shift_semitones: i32,
    pub add_start_beat: bool,
    pub start_beat_clicks: usize,
    pub strategy: String,
    pub click_duration_secs: f64,
    pub click_frequency_hz: f64,
    pub click_amplitude: f32,
    pub stems_enabled: bool,
    pub model: String,
    pub exclude_stem: Option<String>,
    pub include_beat: bool,
    pub trim_db: Option<f32>,
}

impl RunParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            input: settings.input.clone(),
            tempo_override: settings.tempo_override,
            shift_semitones: settings.shift_semitones,
            add_start_beat: settings.add_start_beat,
            start_beat_clicks: settings.start_beat_clicks,
            strategy: settings.strategy.as_str().to_string(),
            click_duration_secs: settings.click.duration_secs,
            click_frequency_hz: settings.click.frequency_hz,
            click_amplitude: settings.click.amplitude,
            stems_enabled: settings.stems_enabled,
            model: settings.model.clone(),
            exclude_stem: settings.exclude_stem.clone(),
            include_beat: settings.include_beat,
            trim_db: settings.trim_db,
        }
    }
}

/// One produced output file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// What this file is: "beat_track", "backing_track", "start_beat", ...
    pub kind: String,
    pub path: PathBuf,
}

impl Manifest {
    pub fn new(params: RunParams, tempo_bpm: f64, artifacts: Vec<Artifact>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            params,
            tempo_bpm,
            artifacts,
        }
    }

    /// True when a rerun with these settings would reproduce this manifest's
    /// outputs, and every recorded artifact still exists on disk
    pub fn satisfies(&self, settings: &Settings) -> bool {
        self.params == RunParams::from_settings(settings)
            && self.artifacts.iter().all(|a| a.path.exists())
    }
}

/// Write the manifest to `<output_dir>/backbeat.json`
///
/// Uses the atomic write pattern: a temp file in the same directory,
/// then a rename.
pub fn write_manifest(manifest: &Manifest, output_dir: &Path) -> Result<PathBuf> {
    let output_path = output_dir.join(MANIFEST_FILE);
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| BackbeatError::OutputError {
        path: output_path.clone(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, manifest).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        BackbeatError::OutputError {
            path: output_path.clone(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, &output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        BackbeatError::OutputError {
            path: output_path.clone(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote manifest with {} artifacts to {}",
        manifest.artifacts.len(),
        output_path.display()
    );

    Ok(output_path)
}

/// Read an existing manifest from the output directory, if any
///
/// A missing or unparseable manifest means "no previous run"; it never
/// aborts the pipeline.
pub fn read_manifest(output_dir: &Path) -> Option<Manifest> {
    let path = output_dir.join(MANIFEST_FILE);
    if !path.exists() {
        debug!("No existing manifest at {}", path.display());
        return None;
    }

    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            debug!("Could not open existing manifest: {}", e);
            return None;
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(m) => Some(m),
        Err(e) => {
            debug!("Could not parse existing manifest: {}", e);
            None
        }
    }
}

/// Helper for constructing artifacts in pipeline code
pub fn artifact(kind: &str, path: impl Into<PathBuf>) -> Artifact {
    Artifact {
        kind: kind.to_string(),
        path: path.into(),
    }
}
