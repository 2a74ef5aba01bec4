//! WAV output using hound
//!
//! Serializes a waveform to 16-bit PCM. This is where the additive overlap
//! policy meets reality: click overlays may carry samples outside [-1, 1],
//! and the encoder clamps them exactly once, here.

use crate::error::{BackbeatError, Result};
use crate::types::Waveform;
use std::path::Path;
use tracing::{debug, warn};

/// Write a mono waveform as a 16-bit PCM WAV file.
///
/// Samples outside [-1.0, 1.0] are clamped; a warning notes how many.
pub fn write_wav(waveform: &Waveform, path: &Path) -> Result<()> {
    if waveform.sample_rate == 0 {
        return Err(BackbeatError::invalid_parameter(
            "sample rate",
            waveform.sample_rate,
            "sample rate must be > 0 Hz",
        ));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        BackbeatError::OutputError {
            path: path.to_path_buf(),
            reason: format!("Failed to create WAV file: {}", e),
        }
    })?;

    let mut clipped = 0usize;
    for &s in &waveform.samples {
        let clamped = s.clamp(-1.0, 1.0);
        if clamped != s {
            clipped += 1;
        }
        let sample_i16 = (clamped * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| BackbeatError::OutputError {
                path: path.to_path_buf(),
                reason: format!("Failed to write sample: {}", e),
            })?;
    }

    writer.finalize().map_err(|e| BackbeatError::OutputError {
        path: path.to_path_buf(),
        reason: format!("Failed to finalize WAV: {}", e),
    })?;

    if clipped > 0 {
        warn!(
            "Clamped {} of {} samples to [-1, 1] while writing {}",
            clipped,
            waveform.len(),
            path.display()
        );
    }

    debug!(
        "Wrote {} samples ({:.2}s) to {}",
        waveform.len(),
        waveform.duration_secs(),
        path.display()
    );

    Ok(())
}
