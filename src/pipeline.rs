//! Generation pipeline
//!
//! `process` takes the selected artifacts and returns one outcome per
//! artifact. Artifacts run one after another; whatever happens to one of them
//! is recorded in its outcome and never stops the rest.

use crate::artifact::{SelectedArtifact, DEFAULT_CONTAINER_SUFFIX};
use crate::binding::GeneratorBindings;
use crate::error::GenerateError;
use crate::evict::{evict, Eviction};
use crate::host::{DiagnosticsSink, ProjectHost};
use crate::invoker::{GenerationResult, GeneratorInvoker};
use crate::staging::TempWorkspace;
use crate::sync::{PreparedOutput, SyncReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// What happened to one artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    /// No generator is bound to the artifact's language; nothing was touched
    Skipped,
    /// The generator completed and its output now fills the container
    Generated {
        container: PathBuf,
        invocation_id: String,
        input_digest: String,
        exit_code: Option<i32>,
        diagnostics: String,
        eviction: Eviction,
        sync: SyncReport,
    },
    /// The generator outlived the timeout; the container was left as it was
    TimedOut {
        invocation_id: String,
        timeout_ms: u64,
    },
    /// Staging, launch or synchronization failed
    Failed { error: String },
}

impl ArtifactOutcome {
    /// Timed out and failed outcomes count as failures; skips do not
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ArtifactOutcome::TimedOut { .. } | ArtifactOutcome::Failed { .. }
        )
    }
}

/// Outcome of one artifact, with timing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactReport {
    pub artifact: SelectedArtifact,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub outcome: ArtifactOutcome,
}

/// Settings shared by every artifact in a run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub timeout: Duration,
    pub container_suffix: String,
    pub staging_root: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            timeout: crate::invoker::DEFAULT_TIMEOUT,
            container_suffix: DEFAULT_CONTAINER_SUFFIX.to_string(),
            staging_root: std::env::temp_dir(),
        }
    }
}

/// Stages, invokes, evicts and synchronizes, artifact by artifact
pub struct GenerationPipeline {
    bindings: Arc<GeneratorBindings>,
    invoker: GeneratorInvoker,
    options: PipelineOptions,
    host: Arc<dyn ProjectHost>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl GenerationPipeline {
    pub fn new(
        bindings: Arc<GeneratorBindings>,
        options: PipelineOptions,
        host: Arc<dyn ProjectHost>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            bindings,
            invoker: GeneratorInvoker::new(options.timeout),
            options,
            host,
            sink,
        }
    }

    /// Process every artifact in order
    pub fn process(&self, artifacts: &[SelectedArtifact]) -> Vec<ArtifactReport> {
        artifacts
            .iter()
            .map(|artifact| {
                let started_at = Utc::now();
                let started = Instant::now();
                let outcome = self.process_one(artifact);
                ArtifactReport {
                    artifact: artifact.clone(),
                    started_at,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    outcome,
                }
            })
            .collect()
    }

    /// Process a single artifact
    pub fn process_one(&self, artifact: &SelectedArtifact) -> ArtifactOutcome {
        let span = info_span!("artifact", path = %artifact.path.display(), language = %artifact.language);
        let _enter = span.enter();

        let Some(generator) = self.bindings.generator_for(artifact.language) else {
            debug!("No generator bound; skipping");
            return ArtifactOutcome::Skipped;
        };

        match self.generate(artifact, generator) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Generation failed");
                ArtifactOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn generate(
        &self,
        artifact: &SelectedArtifact,
        generator: &Path,
    ) -> Result<ArtifactOutcome, GenerateError> {
        let workspace = TempWorkspace::stage(&self.options.staging_root, artifact)?;
        let invocation_id = workspace.invocation_id().to_string();
        info!(
            invocation_id = %invocation_id,
            generator = %generator.display(),
            "Invoking generator"
        );

        let outcome = match self.invoker.invoke(generator, &workspace) {
            GenerationResult::Completed {
                diagnostics,
                exit_code,
            } => {
                if !diagnostics.is_empty() {
                    self.sink.emit(&artifact.path, &diagnostics);
                }
                let container = artifact.container_path(&self.options.container_suffix);
                // Copy first so a failed copy leaves the previous container in place.
                let prepared = PreparedOutput::build(workspace.dir(), &container)?;
                let eviction = evict(self.host.as_ref(), &container)?;
                let sync = prepared.install(&container, self.host.as_ref())?;
                info!(
                    invocation_id = %invocation_id,
                    container = %container.display(),
                    files = sync.files,
                    folders = sync.folders,
                    "Output synchronized"
                );
                ArtifactOutcome::Generated {
                    container,
                    invocation_id,
                    input_digest: workspace.input_digest().to_string(),
                    exit_code,
                    diagnostics,
                    eviction,
                    sync,
                }
            }
            GenerationResult::TimedOut { after } => ArtifactOutcome::TimedOut {
                invocation_id,
                timeout_ms: after.as_millis() as u64,
            },
            GenerationResult::Failed { reason } => ArtifactOutcome::Failed { error: reason },
        };

        // The output has been consumed (or abandoned); a teardown failure only warns.
        if let Err(e) = workspace.teardown() {
            warn!(error = %e, "Failed to tear down staging workspace");
        }
        Ok(outcome)
    }
}
