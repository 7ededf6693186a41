//! Generator bindings: which executable handles which source language.
//!
//! The table is resolved once at startup from the configuration. Relative
//! executable paths are anchored at the installation directory, which
//! defaults to the directory holding the running binary.

use crate::artifact::SourceLanguage;
use crate::config::GeneratorEntry;
use crate::error::GenerateError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Default generator for C# projects, relative to the installation directory
pub fn default_csharp_generator() -> PathBuf {
    PathBuf::from("tars2cs").join(format!("tars2cs{}", std::env::consts::EXE_SUFFIX))
}

/// Directory of the running executable
pub fn installation_dir() -> Result<PathBuf, GenerateError> {
    let exe = std::env::current_exe().map_err(|e| {
        GenerateError::ConfigError(format!("Failed to locate running executable: {}", e))
    })?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        GenerateError::ConfigError(format!(
            "Executable {} has no parent directory",
            exe.display()
        ))
    })
}

/// A single resolved binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorBinding {
    pub language: SourceLanguage,
    pub executable: PathBuf,
}

impl GeneratorBinding {
    /// Whether the executable is present on disk
    pub fn is_installed(&self) -> bool {
        self.executable.is_file()
    }
}

/// Immutable language -> generator table
#[derive(Debug, Clone, Default)]
pub struct GeneratorBindings {
    bindings: BTreeMap<SourceLanguage, PathBuf>,
}

impl GeneratorBindings {
    /// Resolve configured entries against `install_dir`
    pub fn resolve(install_dir: &Path, entries: &HashMap<SourceLanguage, GeneratorEntry>) -> Self {
        let bindings = entries
            .iter()
            .filter(|(_, entry)| !entry.path.as_os_str().is_empty())
            .map(|(language, entry)| {
                let executable = if entry.path.is_absolute() {
                    entry.path.clone()
                } else {
                    install_dir.join(&entry.path)
                };
                (*language, executable)
            })
            .collect();
        Self { bindings }
    }

    /// Build from explicit executables, used by embedding front ends
    pub fn from_executables<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (SourceLanguage, PathBuf)>,
    {
        Self {
            bindings: pairs.into_iter().collect(),
        }
    }

    /// Executable bound to `language`, if any
    pub fn generator_for(&self, language: SourceLanguage) -> Option<&Path> {
        self.bindings.get(&language).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// All bindings in language order
    pub fn iter(&self) -> impl Iterator<Item = GeneratorBinding> + '_ {
        self.bindings.iter().map(|(language, executable)| GeneratorBinding {
            language: *language,
            executable: executable.clone(),
        })
    }
}
