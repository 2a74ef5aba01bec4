//! Explicit progress reporting
//!
//! Progress flows through a callback passed into the pipeline rather than
//! any process-wide state. The CLI binds it to an indicatif bar; tests and
//! library embedders can pass `NullProgress` or their own sink. Each
//! request's sink is independent, so concurrent embedders need no locking.

/// The observable phases of a generation run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Decode,
    PitchShift,
    Trim,
    DetectTempo,
    BeatTrack,
    SeparateStems,
    BackingTracks,
    StartBeat,
    Manifest,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::Decode,
        Step::PitchShift,
        Step::Trim,
        Step::DetectTempo,
        Step::BeatTrack,
        Step::SeparateStems,
        Step::BackingTracks,
        Step::StartBeat,
        Step::Manifest,
    ];

    /// Position in the run, starting at 1
    pub fn index(&self) -> usize {
        Step::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Step::Decode => "Decoding audio",
            Step::PitchShift => "Pitch shifting",
            Step::Trim => "Trimming silence",
            Step::DetectTempo => "Detecting tempo",
            Step::BeatTrack => "Creating beat track",
            Step::SeparateStems => "Separating stems",
            Step::BackingTracks => "Creating backing tracks",
            Step::StartBeat => "Adding start beat",
            Step::Manifest => "Writing manifest",
        }
    }
}

/// Receiver for pipeline progress events
pub trait ProgressSink: Send + Sync {
    /// Called when a step begins; `detail` carries step-specific context
    fn on_step(&self, step: Step, detail: &str);
}

/// Sink that discards all progress events
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_step(&self, _step: Step, _detail: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_indices_are_ordered() {
        let indices: Vec<usize> = Step::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, (1..=Step::ALL.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_labels_are_distinct() {
        let mut labels: Vec<&str> = Step::ALL.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Step::ALL.len());
    }
}
