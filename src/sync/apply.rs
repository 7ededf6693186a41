//! Applies a sync plan to a destination container

use super::plan::{SyncOp, SyncPlan};
use crate::error::{GenerateError, SyncError};
use crate::host::ProjectHost;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::trace;

/// Counts of what a sync wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub folders: usize,
    pub files: usize,
    pub bytes: u64,
}

/// Create `dest`, then create folders and copy files into it per `plan`.
///
/// Existing files at a target path are overwritten. Symlinked sources are
/// copied as the content they point to.
pub fn apply_plan(
    plan: &SyncPlan,
    source_root: &Path,
    dest: &Path,
) -> Result<SyncReport, SyncError> {
    create_folder(dest)?;

    let mut report = SyncReport::default();
    for op in plan.ops() {
        let target = dest.join(op.relative());
        match op {
            SyncOp::CreateFolder { .. } => {
                create_folder(&target)?;
                report.folders += 1;
            }
            SyncOp::CopyFile { relative, .. } => {
                let source = source_root.join(relative);
                let copied = fs::copy(&source, &target).map_err(|e| SyncError::Copy {
                    from: source.clone(),
                    to: target.clone(),
                    source: e,
                })?;
                report.files += 1;
                report.bytes += copied;
            }
        }
        trace!(target = %target.display(), "Synced");
    }

    Ok(report)
}

/// Register `container` and every entry of `plan` below it with `host`, parents first
pub fn register_plan(
    plan: &SyncPlan,
    container: &Path,
    host: &dyn ProjectHost,
) -> Result<(), GenerateError> {
    host.add_folder(container)?;
    for op in plan.ops() {
        let target = container.join(op.relative());
        match op {
            SyncOp::CreateFolder { .. } => host.add_folder(&target)?,
            SyncOp::CopyFile { .. } => host.add_file(&target)?,
        }
    }
    Ok(())
}

fn create_folder(path: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(path).map_err(|source| SyncError::CreateFolder {
        path: path.to_path_buf(),
        source,
    })
}
