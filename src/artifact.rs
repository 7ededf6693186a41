//! Selected artifacts and the naming of their destination containers.

use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default suffix appended to an artifact's file name to name its container
pub const DEFAULT_CONTAINER_SUFFIX: &str = "_";

/// Declared source language of the project an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    CSharp,
    Cpp,
    Java,
    Go,
    Php,
    NodeJs,
}

impl SourceLanguage {
    pub const ALL: [SourceLanguage; 6] = [
        SourceLanguage::CSharp,
        SourceLanguage::Cpp,
        SourceLanguage::Java,
        SourceLanguage::Go,
        SourceLanguage::Php,
        SourceLanguage::NodeJs,
    ];

    /// Stable lowercase slug, also the config key
    pub fn slug(self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "csharp",
            SourceLanguage::Cpp => "cpp",
            SourceLanguage::Java => "java",
            SourceLanguage::Go => "go",
            SourceLanguage::Php => "php",
            SourceLanguage::NodeJs => "nodejs",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SourceLanguage {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "c#" | "cs" => "csharp",
            "c++" | "vc" => "cpp",
            "node" => "nodejs",
            other => other,
        };
        SourceLanguage::ALL
            .into_iter()
            .find(|lang| lang.slug() == alias)
            .ok_or_else(|| GenerateError::UnknownLanguage(s.to_string()))
    }
}

/// A source file selected for generation, with the language its project declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedArtifact {
    pub path: PathBuf,
    pub language: SourceLanguage,
}

impl SelectedArtifact {
    pub fn new(path: impl Into<PathBuf>, language: SourceLanguage) -> Self {
        let path = path.into();
        // Keep the caller's spelling when the file is missing; staging reports that.
        let path = dunce::canonicalize(&path).unwrap_or(path);
        Self { path, language }
    }

    /// File name of the artifact, lossily converted
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension used for the staged input copy (`tars` when the artifact has none)
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tars".to_string())
    }

    /// Name of the destination container: the artifact's file name plus `suffix`
    pub fn container_name(&self, suffix: &str) -> String {
        format!("{}{}", self.file_name(), suffix)
    }

    /// Directory holding the artifact, where its container lives
    pub fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Full path of the destination container, sibling to the artifact
    pub fn container_path(&self, suffix: &str) -> PathBuf {
        self.parent_dir().join(self.container_name(suffix))
    }
}
