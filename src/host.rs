//! Host collaborators
//!
//! The pipeline never talks to an IDE directly. A front end supplies a
//! [`ProjectHost`] that mirrors container changes into its own project model
//! and a [`DiagnosticsSink`] that receives generator diagnostics. The CLI uses
//! the filesystem as its project model.

use crate::error::GenerateError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Project model operations the pipeline needs from its host
pub trait ProjectHost: Send + Sync {
    /// Drop the project entry at `path`; `Ok(false)` when the host has no such entry
    fn remove_entry(&self, path: &Path) -> Result<bool, GenerateError>;

    /// Register a folder that now exists on disk
    fn add_folder(&self, path: &Path) -> Result<(), GenerateError>;

    /// Register a file that now exists on disk
    fn add_file(&self, path: &Path) -> Result<(), GenerateError>;
}

/// Host whose project model is the filesystem itself
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemHost;

impl ProjectHost for FilesystemHost {
    fn remove_entry(&self, _path: &Path) -> Result<bool, GenerateError> {
        Ok(false)
    }

    fn add_folder(&self, _path: &Path) -> Result<(), GenerateError> {
        Ok(())
    }

    fn add_file(&self, _path: &Path) -> Result<(), GenerateError> {
        Ok(())
    }
}

/// Receives generator diagnostic text
pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, artifact: &Path, text: &str);
}

/// One diagnostic message and the artifact that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub artifact: PathBuf,
    pub text: String,
}

/// Sink that keeps every message in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, in arrival order
    pub fn messages(&self) -> Vec<Diagnostic> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn emit(&self, artifact: &Path, text: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Diagnostic {
                artifact: artifact.to_path_buf(),
                text: text.to_string(),
            });
    }
}
