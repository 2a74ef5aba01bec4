//! Generation pipeline

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{run, run_with_backends, PipelineResult};
pub use progress::{NullProgress, ProgressSink, Step};
