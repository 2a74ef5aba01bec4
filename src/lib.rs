//! backbeat - Backing Track & Click Track Generator
//!
//! A command-line utility that turns a song into practice material: a
//! click track aligned with the song's beats, backing tracks with a chosen
//! stem removed, and optional count-in splicing so a player knows exactly
//! when to come in.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `audio`: Decoding (symphonia), resampling (rubato), WAV output (hound)
//! - `click`: Click synthesis and count-in splicing (the numeric core)
//! - `mixdown`: Silence trimming and multi-track mixing
//! - `analysis`: Tempo detection, stem separation, and pitch shifting
//!   (with swappable backends)
//! - `pipeline`: Run orchestration and progress reporting
//! - `export`: Run manifest for parameter-addressed output reuse
//!
//! # Example
//!
//! ```no_run
//! use backbeat::config::Settings;
//! use backbeat::pipeline::{self, NullProgress};
//!
//! let settings = Settings {
//!     input: "song.mp3".into(),
//!     tempo_override: Some(120.0),
//!     add_start_beat: true,
//!     ..Settings::default()
//! };
//! let result = pipeline::run(&settings, &NullProgress).expect("Generation failed");
//! println!("Generated {} files at {:.1} BPM", result.artifacts.len(), result.tempo_bpm);
//! ```

pub mod analysis;
pub mod audio;
pub mod click;
pub mod config;
pub mod error;
pub mod export;
pub mod mixdown;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{BackbeatError, Result};
pub use types::{BeatSchedule, ClickSpec, TempoResult, Waveform};
