//! Tempo detection backends
//!
//! `StratumTempoDetector` delegates the BPM estimate to stratum-dsp
//! (autocorrelation and comb filterbank analysis) and derives a beat grid
//! by anchoring a uniform grid at the first strong onset of the energy
//! envelope. `FixedTempoDetector` skips detection entirely and lays a grid
//! at a caller-supplied tempo, for tests and for the `--tempo` override.

use crate::analysis::traits::TempoDetector;
use crate::error::{BackbeatError, Result};
use crate::types::{TempoResult, Waveform};
use stratum_dsp::{analyze_audio, AnalysisConfig};
use tracing::debug;

/// Energy-envelope window size in samples
const ENVELOPE_WINDOW: usize = 1024;
/// Hop between envelope windows
const ENVELOPE_HOP: usize = 512;
/// An onset is "strong" when its window RMS exceeds this fraction of the peak RMS
const ONSET_THRESHOLD: f32 = 0.3;

/// Tempo detector using stratum-dsp
pub struct StratumTempoDetector;

impl StratumTempoDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StratumTempoDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoDetector for StratumTempoDetector {
    fn detect(&self, waveform: &Waveform) -> Result<TempoResult> {
        debug!(
            "Analyzing tempo with stratum-dsp ({} samples, {}Hz)",
            waveform.len(),
            waveform.sample_rate
        );

        let config = AnalysisConfig::default();

        let result = analyze_audio(&waveform.samples, waveform.sample_rate, config).map_err(
            |e| BackbeatError::AnalysisError {
                path: std::path::PathBuf::new(),
                reason: format!("BPM analysis failed: {}", e),
            },
        )?;

        let bpm = result.bpm as f64;
        let confidence = result.bpm_confidence as f64;

        let beat_times = beat_grid(waveform, bpm);

        debug!(
            "Detected tempo: {:.2} BPM (confidence: {:.2}, {} beats)",
            bpm,
            confidence,
            beat_times.len()
        );

        Ok(TempoResult {
            bpm,
            confidence,
            beat_times,
        })
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}

/// Detector that trusts a caller-supplied tempo instead of analyzing
///
/// Used when the CLI is invoked with `--tempo`, and in tests where a
/// deterministic grid matters more than a real estimate.
pub struct FixedTempoDetector {
    bpm: f64,
}

impl FixedTempoDetector {
    pub fn new(bpm: f64) -> Self {
        Self { bpm }
    }
}

impl TempoDetector for FixedTempoDetector {
    fn detect(&self, waveform: &Waveform) -> Result<TempoResult> {
        if !(self.bpm > 0.0) || !self.bpm.is_finite() {
            return Err(BackbeatError::invalid_parameter(
                "tempo",
                self.bpm,
                "tempo must be > 0 BPM",
            ));
        }

        Ok(TempoResult {
            bpm: self.bpm,
            confidence: 1.0,
            beat_times: beat_grid(waveform, self.bpm),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Lay a uniform beat grid over the waveform at the given tempo.
///
/// The grid is anchored at the first strong onset of the windowed RMS
/// energy envelope, then steps by `60/bpm` seconds until the end of the
/// track. A silent or empty waveform anchors at zero.
pub fn beat_grid(waveform: &Waveform, bpm: f64) -> Vec<f64> {
    if waveform.is_empty() || waveform.sample_rate == 0 || !(bpm > 0.0) {
        return Vec::new();
    }

    let anchor = first_onset_secs(waveform);
    let duration = waveform.duration_secs();
    let interval = 60.0 / bpm;

    let mut times = Vec::new();
    let mut t = anchor;
    while t < duration {
        times.push(t);
        t += interval;
    }
    times
}

/// Time of the first envelope window whose RMS exceeds the onset threshold
fn first_onset_secs(waveform: &Waveform) -> f64 {
    let mut peak_rms = 0.0f32;
    let mut window_rms = Vec::new();

    let mut pos = 0;
    while pos < waveform.len() {
        let end = (pos + ENVELOPE_WINDOW).min(waveform.len());
        let window = &waveform.samples[pos..end];
        let rms =
            (window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32).sqrt();
        window_rms.push((pos, rms));
        peak_rms = peak_rms.max(rms);
        pos += ENVELOPE_HOP;
    }

    if peak_rms == 0.0 {
        return 0.0;
    }

    let threshold = peak_rms * ONSET_THRESHOLD;
    window_rms
        .iter()
        .find(|(_, rms)| *rms > threshold)
        .map(|(pos, _)| *pos as f64 / waveform.sample_rate as f64)
        .unwrap_or(0.0)
}
