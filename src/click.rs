//! Click-track synthesis and splicing
//!
//! Pure, stateless transforms from waveforms to waveforms: generate a single
//! metronome pulse, assemble it into a click track, and combine the result
//! with a source recording either as a count-in prefix or as an overlay at
//! detected beat positions.
//!
//! No I/O happens here. Inputs are never mutated; every operation returns a
//! new buffer. All waveforms combined in one operation must share a sample
//! rate; resampling is the decoder's job.

use crate::error::{BackbeatError, Result};
use crate::types::{BeatSchedule, ClickSpec, Waveform};

/// Generate a single click pulse: a sine tone burst.
///
/// The output has `round(duration * sample_rate)` samples following
/// `amplitude * sin(2π * frequency * t)`, starting at phase zero so the
/// burst begins and ends near a zero crossing.
pub fn generate_click(spec: &ClickSpec, sample_rate: u32) -> Result<Waveform> {
    if !(spec.duration_secs > 0.0) || !spec.duration_secs.is_finite() {
        return Err(BackbeatError::invalid_parameter(
            "click duration",
            spec.duration_secs,
            "duration must be a positive number of seconds",
        ));
    }
    if !(spec.frequency_hz > 0.0) || !spec.frequency_hz.is_finite() {
        return Err(BackbeatError::invalid_parameter(
            "click frequency",
            spec.frequency_hz,
            "frequency must be > 0 Hz",
        ));
    }
    if !(0.0..=1.0).contains(&spec.amplitude) {
        return Err(BackbeatError::invalid_parameter(
            "click amplitude",
            spec.amplitude,
            "amplitude must lie in [0.0, 1.0]",
        ));
    }
    if sample_rate == 0 {
        return Err(BackbeatError::invalid_parameter(
            "sample rate",
            sample_rate,
            "sample rate must be > 0 Hz",
        ));
    }

    let num_samples = (spec.duration_secs * sample_rate as f64).round() as usize;
    let mut samples = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        let t = i as f64 / sample_rate as f64;
        let s = (std::f64::consts::TAU * spec.frequency_hz * t).sin();
        samples.push(spec.amplitude * s as f32);
    }

    Ok(Waveform::new(samples, sample_rate))
}

/// Assemble a count-in prefix: `beat_count` repetitions of `[click, silence]`.
///
/// The silence between clicks is `max(0, floor(sr * 60/tempo) - len(click))`
/// samples, so at very fast tempos the clicks run back-to-back without gap.
/// The result is independent of any source track.
pub fn build_prefix_track(click: &Waveform, beat_count: usize, tempo_bpm: f64) -> Result<Waveform> {
    if beat_count < 1 {
        return Err(BackbeatError::invalid_parameter(
            "beat count",
            beat_count,
            "at least one count-in beat is required",
        ));
    }
    if !(tempo_bpm > 0.0) || !tempo_bpm.is_finite() {
        return Err(BackbeatError::invalid_parameter(
            "tempo",
            tempo_bpm,
            "tempo must be > 0 BPM",
        ));
    }

    let interval_secs = 60.0 / tempo_bpm;
    let interval_samples = (interval_secs * click.sample_rate as f64).floor();
    let silence_len = (interval_samples - click.len() as f64).max(0.0) as usize;

    let mut samples = Vec::with_capacity(beat_count * (click.len() + silence_len));
    for _ in 0..beat_count {
        samples.extend_from_slice(&click.samples);
        samples.extend(std::iter::repeat(0.0f32).take(silence_len));
    }

    Ok(Waveform::new(samples, click.sample_rate))
}

/// Concatenate `prefix` followed by `source`.
///
/// Total length is `len(prefix) + len(source)`; no samples from either input
/// are altered.
pub fn prepend(prefix: &Waveform, source: &Waveform) -> Result<Waveform> {
    if prefix.sample_rate != source.sample_rate {
        return Err(BackbeatError::SampleRateMismatch {
            left: prefix.sample_rate,
            right: source.sample_rate,
        });
    }

    let mut samples = Vec::with_capacity(prefix.len() + source.len());
    samples.extend_from_slice(&prefix.samples);
    samples.extend_from_slice(&source.samples);

    Ok(Waveform::new(samples, prefix.sample_rate))
}

/// Place the click at each beat onset over a zero background.
///
/// The output has exactly `total_length` samples: zero everywhere except the
/// additive superposition of `click` at each `round(time * sr)` offset.
/// Clicks that would extend past `total_length` are truncated. Beats closer
/// together than the click duration are summed without clamping; samples may
/// exceed 1.0 and are clamped once, at encode (see `audio::encoder`).
pub fn build_overlay_track(
    click: &Waveform,
    beat_times: &[f64],
    sample_rate: u32,
    total_length: usize,
) -> Result<Waveform> {
    if click.sample_rate != sample_rate {
        return Err(BackbeatError::SampleRateMismatch {
            left: click.sample_rate,
            right: sample_rate,
        });
    }
    if sample_rate == 0 {
        return Err(BackbeatError::invalid_parameter(
            "sample rate",
            sample_rate,
            "sample rate must be > 0 Hz",
        ));
    }

    // Onset times must be non-negative and non-decreasing; reject rather
    // than silently sorting.
    let mut prev = 0.0f64;
    for &t in beat_times {
        if !t.is_finite() || t < 0.0 {
            return Err(BackbeatError::invalid_parameter(
                "beat time",
                t,
                "beat onset times must be non-negative seconds",
            ));
        }
        if t < prev {
            return Err(BackbeatError::invalid_parameter(
                "beat time",
                t,
                "beat onset times must be non-decreasing",
            ));
        }
        prev = t;
    }

    let mut samples = vec![0.0f32; total_length];
    for &t in beat_times {
        let offset = (t * sample_rate as f64).round() as usize;
        for (i, &c) in click.samples.iter().enumerate() {
            let idx = offset + i;
            if idx >= total_length {
                break;
            }
            samples[idx] += c;
        }
    }

    Ok(Waveform::new(samples, sample_rate))
}

/// Sum `overlay` with `source`, left-padding the source with silence.
///
/// The source is shifted right by `len(overlay) - len(source)` samples
/// (the lead time introduced by the count-in portion of the overlay), then
/// the two equal-length waveforms are summed sample-for-sample.
pub fn overlay_and_pad(overlay: &Waveform, source: &Waveform) -> Result<Waveform> {
    if overlay.sample_rate != source.sample_rate {
        return Err(BackbeatError::SampleRateMismatch {
            left: overlay.sample_rate,
            right: source.sample_rate,
        });
    }
    if overlay.len() < source.len() {
        return Err(BackbeatError::LengthMismatch {
            expected: source.len(),
            actual: overlay.len(),
        });
    }

    let pad = overlay.len() - source.len();
    let mut samples = Vec::with_capacity(overlay.len());
    for (i, &o) in overlay.samples.iter().enumerate() {
        let s = if i >= pad { source.samples[i - pad] } else { 0.0 };
        samples.push(o + s);
    }

    Ok(Waveform::new(samples, overlay.sample_rate))
}

/// Add a count-in by pure concatenation: `beat_count` clicks at `tempo_bpm`,
/// then the untouched source.
pub fn add_start_beat_prefix(
    source: &Waveform,
    spec: &ClickSpec,
    beat_count: usize,
    tempo_bpm: f64,
) -> Result<Waveform> {
    let click = generate_click(spec, source.sample_rate)?;
    let prefix = build_prefix_track(&click, beat_count, tempo_bpm)?;
    prepend(&prefix, source)
}

/// Add a count-in by overlay: clicks at a uniform grid spanning
/// `(beat_count - 1) * 60/tempo` seconds, with the source delayed by the
/// final beat's lead time and summed underneath.
pub fn add_start_beat_overlay(
    source: &Waveform,
    spec: &ClickSpec,
    beat_count: usize,
    tempo_bpm: f64,
) -> Result<Waveform> {
    let sr = source.sample_rate;
    let schedule = BeatSchedule::Uniform {
        count: beat_count,
        tempo_bpm,
    };
    let beat_times = schedule.onset_times()?;

    // Lead time is the last initial beat's onset; the source starts there.
    let lead_secs = beat_times.last().copied().unwrap_or(0.0);
    let lead_samples = (lead_secs * sr as f64).round() as usize;
    let total_length = source.len() + lead_samples;

    let click = generate_click(spec, sr)?;
    let overlay = build_overlay_track(&click, &beat_times, sr, total_length)?;
    overlay_and_pad(&overlay, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClickSpec;

    fn spec(duration: f64, freq: f64, amp: f32) -> ClickSpec {
        ClickSpec {
            duration_secs: duration,
            frequency_hz: freq,
            amplitude: amp,
        }
    }

    #[test]
    fn test_generate_click_length_and_shape() {
        // 0.1s @ 22050Hz -> 2205 samples of 0.5*sin(2*pi*440*t)
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        assert_eq!(click.len(), 2205);
        assert_eq!(click.sample_rate, 22050);

        assert!(click.samples[0].abs() < 1e-6, "first sample should be ~0");
        for (i, &s) in click.samples.iter().enumerate().step_by(97) {
            let t = i as f64 / 22050.0;
            let expected = 0.5 * (std::f64::consts::TAU * 440.0 * t).sin() as f32;
            assert!(
                (s - expected).abs() < 1e-6,
                "sample {} was {}, expected {}",
                i,
                s,
                expected
            );
        }
    }

    #[test]
    fn test_generate_click_deterministic() {
        let a = generate_click(&spec(0.05, 880.0, 0.8), 44100).unwrap();
        let b = generate_click(&spec(0.05, 880.0, 0.8), 44100).unwrap();
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn test_generate_click_rejects_bad_parameters() {
        assert!(generate_click(&spec(0.0, 440.0, 0.5), 22050).is_err());
        assert!(generate_click(&spec(-0.1, 440.0, 0.5), 22050).is_err());
        assert!(generate_click(&spec(0.1, 0.0, 0.5), 22050).is_err());
        assert!(generate_click(&spec(0.1, -440.0, 0.5), 22050).is_err());
        assert!(generate_click(&spec(0.1, 440.0, -0.1), 22050).is_err());
        assert!(generate_click(&spec(0.1, 440.0, 1.5), 22050).is_err());
        assert!(generate_click(&spec(0.1, 440.0, 0.5), 0).is_err());
        assert!(generate_click(&spec(f64::NAN, 440.0, 0.5), 22050).is_err());
    }

    #[test]
    fn test_generate_click_zero_amplitude_is_valid() {
        // A silent click is well-defined: amplitude 0 lies inside [0, 1].
        let click = generate_click(&spec(0.1, 440.0, 0.0), 22050).unwrap();
        assert_eq!(click.len(), 2205);
        assert!(click.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_prefix_track_length() {
        // 4 beats at 120 BPM: interval 0.5s, silence 0.4s (8820 samples),
        // total 4 * (2205 + 8820) = 44100 samples, exactly 2 seconds.
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        let prefix = build_prefix_track(&click, 4, 120.0).unwrap();
        assert_eq!(prefix.len(), 44100);
        assert!((prefix.duration_secs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_prefix_track_structure() {
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        let prefix = build_prefix_track(&click, 2, 120.0).unwrap();
        let beat_len = 11025;

        // Each beat starts with the click samples
        assert_eq!(&prefix.samples[..click.len()], &click.samples[..]);
        assert_eq!(
            &prefix.samples[beat_len..beat_len + click.len()],
            &click.samples[..]
        );
        // The rest of each beat is silence
        assert!(prefix.samples[click.len()..beat_len]
            .iter()
            .all(|&s| s == 0.0));
    }

    #[test]
    fn test_prefix_track_fast_tempo_back_to_back() {
        // At 1200 BPM the interval (0.05s) is shorter than a 0.1s click:
        // silence collapses to zero and clicks run back-to-back, unclipped.
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        let prefix = build_prefix_track(&click, 3, 1200.0).unwrap();
        assert_eq!(prefix.len(), 3 * click.len());
        assert_eq!(&prefix.samples[..click.len()], &click.samples[..]);
        assert_eq!(
            &prefix.samples[click.len()..2 * click.len()],
            &click.samples[..]
        );
    }

    #[test]
    fn test_prefix_track_rejects_bad_parameters() {
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        assert!(build_prefix_track(&click, 0, 120.0).is_err());
        assert!(build_prefix_track(&click, 4, 0.0).is_err());
        assert!(build_prefix_track(&click, 4, -60.0).is_err());
    }

    #[test]
    fn test_prepend_preserves_source() {
        let prefix = Waveform::new(vec![0.1, 0.2, 0.3], 22050);
        let source = Waveform::new(vec![0.9, -0.9, 0.5, -0.5], 22050);
        let out = prepend(&prefix, &source).unwrap();

        assert_eq!(out.len(), prefix.len() + source.len());
        assert_eq!(&out.samples[..3], &prefix.samples[..]);
        assert_eq!(&out.samples[3..], &source.samples[..]);
    }

    #[test]
    fn test_prepend_sample_rate_mismatch() {
        let prefix = Waveform::new(vec![0.1], 22050);
        let source = Waveform::new(vec![0.2], 44100);
        match prepend(&prefix, &source) {
            Err(BackbeatError::SampleRateMismatch { left, right }) => {
                assert_eq!((left, right), (22050, 44100));
            }
            other => panic!("expected SampleRateMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_empty_schedule_is_silence() {
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        let out = build_overlay_track(&click, &[], 22050, 1000).unwrap();
        assert_eq!(out.len(), 1000);
        assert!(out.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_overlay_disjoint_beats() {
        // Beats at 0s, 1s, 2s with a 0.1s click: three disjoint bursts at
        // offsets 0, sr, 2*sr, zeros elsewhere.
        let sr = 22050u32;
        let click = generate_click(&spec(0.1, 440.0, 0.5), sr).unwrap();
        let total = 3 * sr as usize;
        let out = build_overlay_track(&click, &[0.0, 1.0, 2.0], sr, total).unwrap();
        assert_eq!(out.len(), total);

        for &offset in &[0usize, sr as usize, 2 * sr as usize] {
            assert_eq!(
                &out.samples[offset..offset + click.len()],
                &click.samples[..],
                "click at offset {} should match",
                offset
            );
        }
        // Gap between first click's end and second click's start is silent
        assert!(out.samples[click.len()..sr as usize]
            .iter()
            .all(|&s| s == 0.0));
    }

    #[test]
    fn test_overlay_overlapping_beats_sum() {
        // Two beats 50ms apart with a 100ms click: the overlapping region is
        // the sum of both bursts, not a clamp of either.
        let sr = 22050u32;
        let click = generate_click(&spec(0.1, 440.0, 0.5), sr).unwrap();
        let out = build_overlay_track(&click, &[0.0, 0.05], sr, sr as usize).unwrap();

        let second_offset = (0.05 * sr as f64).round() as usize;
        let i = second_offset + 100;
        let expected = click.samples[i] + click.samples[i - second_offset];
        assert!((out.samples[i] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_overlay_truncates_past_end() {
        let sr = 22050u32;
        let click = generate_click(&spec(0.1, 440.0, 0.5), sr).unwrap();
        // Beat begins 10 samples before the end of the track
        let total = 500usize;
        let t = (total - 10) as f64 / sr as f64;
        let out = build_overlay_track(&click, &[t], sr, total).unwrap();
        assert_eq!(out.len(), total);
        assert_eq!(
            &out.samples[total - 10..],
            &click.samples[..10],
            "only the first 10 click samples fit"
        );
    }

    #[test]
    fn test_overlay_rejects_bad_beat_times() {
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        assert!(build_overlay_track(&click, &[-0.5], 22050, 1000).is_err());
        assert!(build_overlay_track(&click, &[1.0, 0.5], 22050, 44100).is_err());
        assert!(build_overlay_track(&click, &[f64::NAN], 22050, 1000).is_err());
    }

    #[test]
    fn test_overlay_rejects_rate_mismatch() {
        let click = generate_click(&spec(0.1, 440.0, 0.5), 22050).unwrap();
        assert!(matches!(
            build_overlay_track(&click, &[0.0], 44100, 1000),
            Err(BackbeatError::SampleRateMismatch { .. })
        ));
    }

    #[test]
    fn test_overlay_and_pad_shifts_source() {
        let overlay = Waveform::new(vec![1.0, 1.0, 0.0, 0.0, 0.0], 22050);
        let source = Waveform::new(vec![0.5, 0.25, 0.125], 22050);
        let out = overlay_and_pad(&overlay, &source).unwrap();

        assert_eq!(out.len(), 5);
        // Source delayed by 2 samples and summed under the overlay
        assert_eq!(out.samples, vec![1.0, 1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_overlay_and_pad_rejects_rate_mismatch() {
        let overlay = Waveform::new(vec![1.0, 1.0, 0.0], 22050);
        let source = Waveform::new(vec![0.5], 44100);
        match overlay_and_pad(&overlay, &source) {
            Err(BackbeatError::SampleRateMismatch { left, right }) => {
                assert_eq!((left, right), (22050, 44100));
            }
            other => panic!("expected SampleRateMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_and_pad_length_mismatch() {
        let overlay = Waveform::new(vec![1.0, 1.0], 22050);
        let source = Waveform::new(vec![0.5, 0.5, 0.5], 22050);
        assert!(matches!(
            overlay_and_pad(&overlay, &source),
            Err(BackbeatError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_add_start_beat_prefix_roundtrip() {
        let sr = 22050u32;
        let source: Vec<f32> = (0..sr).map(|i| (i as f32 / sr as f32).sin()).collect();
        let source = Waveform::new(source, sr);

        let out = add_start_beat_prefix(&source, &ClickSpec::default(), 4, 120.0).unwrap();
        // 2 seconds of count-in plus the source, source content untouched
        assert_eq!(out.len(), 44100 + source.len());
        assert_eq!(&out.samples[44100..], &source.samples[..]);
    }

    #[test]
    fn test_add_start_beat_overlay_lead_time() {
        let sr = 22050u32;
        let source = Waveform::new(vec![0.25; sr as usize], sr);

        // 4 beats at 120 BPM: last onset at 1.5s, so 1.5s of lead time.
        let out = add_start_beat_overlay(&source, &ClickSpec::default(), 4, 120.0).unwrap();
        let lead = (1.5 * sr as f64).round() as usize;
        assert_eq!(out.len(), source.len() + lead);

        // Past the count-in and the final click, output is source plus zeros
        let click_len = (0.1 * sr as f64).round() as usize;
        assert_eq!(out.samples[lead + click_len], 0.25);
    }

    #[test]
    fn test_identity_when_nothing_requested() {
        // Zero-beat count-in is rejected rather than silently producing
        // an identity; the identity case is simply not calling the splice.
        let source = Waveform::new(vec![0.5; 100], 22050);
        assert!(add_start_beat_prefix(&source, &ClickSpec::default(), 0, 120.0).is_err());
        assert!(add_start_beat_overlay(&source, &ClickSpec::default(), 0, 120.0).is_err());
    }
}
