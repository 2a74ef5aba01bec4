//! Tempo and stem analysis
//!
//! This module provides traits for analysis backends and concrete
//! implementations. The trait abstraction allows swapping backends without
//! changing pipeline code.

pub mod pitch;
pub mod stems;
pub mod tempo;
pub mod traits;

pub use traits::{PitchShifter, StemSeparator, TempoDetector};

// Default backends
pub use pitch::RubberBandPitchShifter;
pub use stems::DemucsStemSeparator;
pub use tempo::StratumTempoDetector;

// Placeholder implementations (for testing/fallback)
pub use stems::PlaceholderStemSeparator;
pub use tempo::FixedTempoDetector;
