//! Audio decoding using symphonia
//!
//! Decodes audio files to mono f32 samples at the file's own sample rate.
//! Synthesis must run at the source rate (all waveforms combined in one
//! operation share a rate), so unlike an analysis-only tool we never force
//! a target rate at decode time. Tempo analysis works on a downsampled copy
//! produced by `resample`, which uses rubato for proper anti-aliasing.

use crate::error::{BackbeatError, Result};
use crate::types::Waveform;
use rubato::{FftFixedInOut, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Sample rate used for the tempo-analysis copy (22050 Hz)
///
/// Sufficient for beat tracking (rhythmic energy sits well below 11kHz)
/// while halving the work compared to 44.1kHz.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22050;

/// Maximum file size we'll attempt to decode (2GB)
/// Prevents OOM on extremely large files
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Decode an audio file to a mono waveform at the source sample rate
pub fn decode(path: &Path) -> Result<Waveform> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        BackbeatError::decode_error(path, format!("Failed to read file metadata: {}", e))
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(BackbeatError::decode_error(
            path,
            format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        ));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| BackbeatError::decode_error(path, format!("Failed to open file: {}", e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint the probe with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            BackbeatError::decode_error(path, format!("Failed to probe format: {}", e))
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| BackbeatError::decode_error(path, "No audio tracks found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params.sample_rate.unwrap_or(44100);
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(2);

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        sample_rate,
        channels
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| {
            BackbeatError::decode_error(path, format!("Failed to create decoder: {}", e))
        })?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break; // End of stream
            }
            Err(e) => {
                return Err(BackbeatError::decode_error(
                    path,
                    format!("Failed to read packet: {}", e),
                ));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                // Skip corrupted frames
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(BackbeatError::decode_error(
                    path,
                    format!("Decode error: {}", e),
                ));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        all_samples.extend(to_mono(sample_buf.samples(), channels));
    }

    debug!(
        "Decoded {} samples ({:.2}s)",
        all_samples.len(),
        all_samples.len() as f64 / sample_rate as f64
    );

    Ok(Waveform::new(all_samples, sample_rate))
}

/// Convert interleaved multi-channel audio to mono by averaging channels
fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// High-quality resampling using rubato
///
/// FFT-based resampling with an anti-aliasing filter, used to produce the
/// downsampled analysis copy of a track. Falls back to linear interpolation
/// if rubato cannot be initialized for the given rate pair.
pub fn resample(source: &Waveform, to_rate: u32) -> Waveform {
    if source.sample_rate == to_rate {
        return source.clone();
    }

    Waveform::new(
        resample_samples(&source.samples, source.sample_rate, to_rate),
        to_rate,
    )
}

fn resample_samples(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    // rubato consumes fixed-size chunks
    const CHUNK_SIZE: usize = 1024;

    let ratio = to_rate as f64 / from_rate as f64;
    let expected_len = (samples.len() as f64 * ratio).round() as usize;

    let mut resampler =
        match FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1) {
            Ok(r) => r,
            Err(e) => {
                debug!(
                    "rubato unavailable for {}Hz -> {}Hz ({}), interpolating",
                    from_rate, to_rate, e
                );
                return resample_linear(samples, from_rate, to_rate);
            }
        };

    let frames_in = resampler.input_frames_next();
    let mut chunk = vec![0.0f32; frames_in];
    let mut output = Vec::with_capacity(expected_len + frames_in);

    for block in samples.chunks(frames_in) {
        chunk[..block.len()].copy_from_slice(block);
        chunk[block.len()..].fill(0.0);

        match resampler.process(&[chunk.as_slice()], None) {
            Ok(resampled) => output.extend(resampled.into_iter().next().unwrap_or_default()),
            Err(e) => {
                debug!("rubato failed mid-stream ({}), interpolating instead", e);
                return resample_linear(samples, from_rate, to_rate);
            }
        }
    }

    // The final chunk was zero-padded up to the fixed size; drop whatever
    // the padding contributed past the expected output length.
    output.truncate(expected_len);
    output
}

/// Linear-interpolation resampler, used only when rubato is unavailable
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if samples.is_empty() || from_rate == to_rate {
        return samples.to_vec();
    }

    let step = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / step) as usize;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos as usize;
            match samples.get(idx + 1) {
                Some(&next) => {
                    let frac = (pos - idx as f64) as f32;
                    samples[idx] * (1.0 - frac) + next * frac
                }
                None => samples[samples.len() - 1],
            }
        })
        .collect()
}
