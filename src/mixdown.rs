//! Silence trimming and stem mixdown
//!
//! The splicing collaborators around the click core: strip leading/trailing
//! silence from a decoded track before analysis, and sum separated stems
//! back into a backing track.

use crate::error::{BackbeatError, Result};
use crate::types::Waveform;
use tracing::debug;

/// Default trim threshold in dB below peak
pub const DEFAULT_TRIM_DB: f32 = 20.0;

/// Remove leading and trailing silence.
///
/// Samples quieter than `top_db` decibels below the waveform's peak are
/// considered silence. Returns a new waveform spanning the first to last
/// non-silent sample; a fully silent input trims to empty.
pub fn trim_silence(source: &Waveform, top_db: f32) -> Waveform {
    let peak = source.peak();
    if peak == 0.0 {
        return Waveform::new(Vec::new(), source.sample_rate);
    }

    let threshold = peak * 10.0f32.powf(-top_db / 20.0);

    let first = source.samples.iter().position(|s| s.abs() > threshold);
    let last = source.samples.iter().rposition(|s| s.abs() > threshold);

    match (first, last) {
        (Some(first), Some(last)) => {
            debug!(
                "Trimmed {} leading and {} trailing samples ({}dB threshold)",
                first,
                source.len() - last - 1,
                top_db
            );
            Waveform::new(source.samples[first..=last].to_vec(), source.sample_rate)
        }
        _ => Waveform::new(Vec::new(), source.sample_rate),
    }
}

/// Sum waveforms sample-for-sample into one track.
///
/// Shorter inputs are treated as zero-padded at the tail, so stems of
/// slightly different lengths still mix. If the summed peak exceeds 1.0 the
/// result is scaled down to peak at 1.0; unlike click overlays, a stem
/// mixdown is a final deliverable and must not rely on encode-time clipping.
pub fn mix_down(tracks: &[Waveform]) -> Result<Waveform> {
    let first = tracks.first().ok_or_else(|| {
        BackbeatError::invalid_parameter("track list", "empty", "at least one track is required")
    })?;

    for track in tracks {
        if track.sample_rate != first.sample_rate {
            return Err(BackbeatError::SampleRateMismatch {
                left: first.sample_rate,
                right: track.sample_rate,
            });
        }
    }

    let len = tracks.iter().map(Waveform::len).max().unwrap_or(0);
    let mut samples = vec![0.0f32; len];
    for track in tracks {
        for (i, &s) in track.samples.iter().enumerate() {
            samples[i] += s;
        }
    }

    let mut mixed = Waveform::new(samples, first.sample_rate);
    let peak = mixed.peak();
    if peak > 1.0 {
        debug!("Mixdown peak {:.3} exceeds 1.0, normalizing", peak);
        let scale = 1.0 / peak;
        for s in &mut mixed.samples {
            *s *= scale;
        }
    }

    Ok(mixed)
}
