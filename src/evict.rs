//! Stale output eviction
//!
//! Before fresh output is attached, the artifact's previous container is
//! dropped from the host project and removed from disk. Absence is a normal
//! outcome, reported as [`Eviction::NothingToRemove`].

use crate::error::{GenerateError, SyncError};
use crate::host::ProjectHost;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// What eviction found at the container path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Eviction {
    Removed { project_entry: bool, directory: bool },
    NothingToRemove,
}

/// Remove the host entry and on-disk tree at `container`
pub fn evict(host: &dyn ProjectHost, container: &Path) -> Result<Eviction, GenerateError> {
    let project_entry = host.remove_entry(container)?;
    let directory = remove_path(container)?;
    debug!(
        container = %container.display(),
        project_entry,
        directory,
        "Evicted stale output"
    );

    if project_entry || directory {
        Ok(Eviction::Removed {
            project_entry,
            directory,
        })
    } else {
        Ok(Eviction::NothingToRemove)
    }
}

/// Remove a directory tree (or a stray file) at `path`; `false` when nothing was there
fn remove_path(path: &Path) -> Result<bool, SyncError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(SyncError::IoError(e)),
    };
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SyncError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
