//! Audio I/O collaborators: symphonia decode and hound WAV encode

pub mod decoder;
pub mod encoder;

pub use decoder::{decode, resample, ANALYSIS_SAMPLE_RATE};
pub use encoder::write_wav;
