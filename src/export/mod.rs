//! Run manifest export

pub mod manifest;

pub use manifest::{artifact, read_manifest, write_manifest, Artifact, Manifest, RunParams};
