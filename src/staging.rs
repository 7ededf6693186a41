//! Staging workspaces
//!
//! Every invocation gets its own staging directory and its own copy of the
//! artifact, both named from a fresh UUID so that concurrent invocations
//! (in this process or another) never share paths. The input copy sits next
//! to the staging directory rather than inside it: the staging directory is
//! the generator's output root and is mirrored verbatim.

use crate::artifact::SelectedArtifact;
use crate::error::GenerateError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const STAGING_PREFIX: &str = "tarsgen-";

/// Ephemeral staging state owned by one invocation
#[derive(Debug)]
pub struct TempWorkspace {
    invocation_id: Uuid,
    dir: PathBuf,
    input: PathBuf,
    input_digest: String,
    torn_down: bool,
}

impl TempWorkspace {
    /// Create the staging directory and copy the artifact's bytes under `staging_root`.
    ///
    /// A stale directory left at the staging path is removed first. If any
    /// step fails, whatever was already created is removed before returning.
    pub fn stage(staging_root: &Path, artifact: &SelectedArtifact) -> Result<Self, GenerateError> {
        let invocation_id = Uuid::new_v4();
        let name = format!("{}{}", STAGING_PREFIX, invocation_id.simple());
        let mut workspace = TempWorkspace {
            invocation_id,
            dir: staging_root.join(&name),
            input: staging_root.join(format!("{}.{}", name, artifact.extension())),
            input_digest: String::new(),
            torn_down: false,
        };

        // On error `workspace` drops here and removes the partial state.
        workspace.populate(&artifact.path).map_err(|source| GenerateError::Staging {
            artifact: artifact.path.clone(),
            source,
        })?;

        debug!(
            invocation_id = %workspace.invocation_id,
            staging_dir = %workspace.dir.display(),
            input = %workspace.input.display(),
            "Staged artifact"
        );
        Ok(workspace)
    }

    fn populate(&mut self, source: &Path) -> io::Result<()> {
        fs::create_dir_all(self.dir.parent().unwrap_or_else(|| Path::new(".")))?;
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        fs::create_dir(&self.dir)?;

        let bytes = fs::read(source)?;
        fs::write(&self.input, &bytes)?;
        self.input_digest = hex::encode(blake3::hash(&bytes).as_bytes());
        Ok(())
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Working directory of the generator and root of its output
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Staged copy of the artifact handed to the generator
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// BLAKE3 hex digest of the staged input bytes
    pub fn input_digest(&self) -> &str {
        &self.input_digest
    }

    /// Delete the staging directory and the input copy.
    ///
    /// Both removals are attempted even if the first fails; the first error
    /// is returned.
    pub fn teardown(mut self) -> Result<(), GenerateError> {
        self.torn_down = true;
        let dir_result = remove_dir_if_present(&self.dir).map_err(|source| GenerateError::Teardown {
            path: self.dir.clone(),
            source,
        });
        let input_result =
            remove_file_if_present(&self.input).map_err(|source| GenerateError::Teardown {
                path: self.input.clone(),
                source,
            });
        dir_result.and(input_result)
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        if let Err(e) = remove_dir_if_present(&self.dir) {
            warn!(path = %self.dir.display(), error = %e, "Failed to remove staging directory");
        }
        if let Err(e) = remove_file_if_present(&self.input) {
            warn!(path = %self.input.display(), error = %e, "Failed to remove staged input");
        }
    }
}

fn remove_dir_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn remove_file_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
