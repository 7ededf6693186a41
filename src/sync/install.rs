//! Builds the new container beside the old one, then swaps it in

use super::apply::{apply_plan, register_plan, SyncReport};
use super::plan::SyncPlan;
use super::walker::OutputWalker;
use crate::error::{GenerateError, SyncError};
use crate::evict::evict;
use crate::host::ProjectHost;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A complete copy of the output tree, waiting next to its container.
///
/// Dropping it without [`install`](PreparedOutput::install) removes the copy.
#[derive(Debug)]
pub struct PreparedOutput {
    dir: PathBuf,
    plan: SyncPlan,
    report: SyncReport,
    installed: bool,
}

impl PreparedOutput {
    /// Copy everything under `source_root` into a hidden sibling of `container`
    pub fn build(source_root: &Path, container: &Path) -> Result<Self, GenerateError> {
        let nodes = OutputWalker::new(source_root.to_path_buf())
            .follow_symlinks(true)
            .walk()?;
        let mut prepared = Self {
            dir: build_dir_for(container),
            plan: SyncPlan::from_nodes(nodes),
            report: SyncReport::default(),
            installed: false,
        };
        prepared.report = apply_plan(&prepared.plan, source_root, &prepared.dir)?;
        debug!(
            build_dir = %prepared.dir.display(),
            files = prepared.report.files,
            "Output copied beside container"
        );
        Ok(prepared)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Move the copy to `container` and register it with `host`.
    ///
    /// `container` must not exist. When registration fails the container is
    /// evicted again, so it is either complete or absent.
    pub fn install(
        mut self,
        container: &Path,
        host: &dyn ProjectHost,
    ) -> Result<SyncReport, GenerateError> {
        fs::rename(&self.dir, container).map_err(|source| SyncError::Rename {
            from: self.dir.clone(),
            to: container.to_path_buf(),
            source,
        })?;
        self.installed = true;

        if let Err(e) = register_plan(&self.plan, container, host) {
            warn!(container = %container.display(), error = %e, "Registration failed; removing container");
            if let Err(rollback) = evict(host, container) {
                warn!(error = %rollback, "Failed to remove partially registered container");
            }
            return Err(e);
        }
        Ok(self.report)
    }
}

impl Drop for PreparedOutput {
    fn drop(&mut self) {
        if self.installed {
            return;
        }
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.dir.display(), error = %e, "Failed to remove unused output copy"),
        }
    }
}

/// `<parent>/.<container name>.tarsgen-<uuid>`
fn build_dir_for(container: &Path) -> PathBuf {
    let name = container
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    container.with_file_name(format!(".{}.tarsgen-{}", name, Uuid::new_v4()))
}
