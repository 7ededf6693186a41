//! tarsgen: Tars code generation orchestrator
//!
//! Stages a selected interface-definition artifact, runs the external
//! generator bound to its language under a timeout, and mirrors the
//! generated tree into a container next to the artifact.

pub mod artifact;
pub mod binding;
pub mod cli;
pub mod config;
pub mod error;
pub mod evict;
pub mod host;
pub mod invoker;
pub mod logging;
pub mod pipeline;
pub mod staging;
pub mod sync;

pub use artifact::{SelectedArtifact, SourceLanguage};
pub use binding::GeneratorBindings;
pub use error::GenerateError;
pub use pipeline::{ArtifactOutcome, ArtifactReport, GenerationPipeline, PipelineOptions};
