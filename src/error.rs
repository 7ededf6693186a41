//! Error types for the tarsgen generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem-level errors raised while walking, copying or removing trees
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to walk output tree at {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Path {path} is not inside output root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} into place at {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sync I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by generation operations and the CLI
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Failed to stage {artifact}: {source}")]
    Staging {
        artifact: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clean up staging path {path}: {source}")]
    Teardown {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown source language: {0}")]
    UnknownLanguage(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for GenerateError {
    fn from(err: config::ConfigError) -> Self {
        GenerateError::ConfigError(err.to_string())
    }
}
