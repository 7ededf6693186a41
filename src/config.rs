//! Configuration System
//!
//! Layered configuration for generator bindings, pipeline settings and
//! logging. Sources merge in order: built-in defaults, the global file, then
//! the workspace files. An explicit config file replaces the file sources.

use crate::artifact::{SourceLanguage, DEFAULT_CONTAINER_SUFFIX};
use crate::binding::{installation_dir, GeneratorBindings};
use crate::error::GenerateError;
use crate::logging::LoggingConfig;
use crate::pipeline::PipelineOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarsgenConfig {
    /// Pipeline settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Generator executables keyed by source language
    #[serde(default)]
    pub generators: HashMap<SourceLanguage, GeneratorEntry>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One generator executable; relative paths are anchored at the install dir
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorEntry {
    pub path: PathBuf,
}

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Seconds a generator may run before it is killed
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Appended to an artifact's file name to name its container
    #[serde(default = "default_container_suffix")]
    pub container_suffix: String,

    /// Where staging workspaces are created (default: OS temp dir)
    #[serde(default)]
    pub staging_root: Option<PathBuf>,

    /// Language assumed for artifacts given without one
    #[serde(default = "default_language")]
    pub default_language: SourceLanguage,

    /// Anchor for relative generator paths (default: directory of the executable)
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_container_suffix() -> String {
    DEFAULT_CONTAINER_SUFFIX.to_string()
}

fn default_language() -> SourceLanguage {
    SourceLanguage::CSharp
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            container_suffix: default_container_suffix(),
            staging_root: None,
            default_language: default_language(),
            install_dir: None,
        }
    }
}

impl Default for TarsgenConfig {
    fn default() -> Self {
        let mut generators = HashMap::new();
        generators.insert(
            SourceLanguage::CSharp,
            GeneratorEntry {
                path: crate::binding::default_csharp_generator(),
            },
        );
        Self {
            generation: GenerationConfig::default(),
            generators,
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Generator(SourceLanguage, String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Generator(lang, msg) => write!(f, "Generator '{}': {}", lang, msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GenerationConfig {
    /// Validate pipeline settings
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        if self.container_suffix.is_empty() {
            return Err("container_suffix cannot be empty".to_string());
        }
        if self.container_suffix.contains(['/', '\\']) {
            return Err(format!(
                "container_suffix '{}' cannot contain path separators",
                self.container_suffix
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TarsgenConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }

        let mut languages: Vec<_> = self.generators.keys().copied().collect();
        languages.sort();
        for lang in languages {
            if self.generators[&lang].path.as_os_str().is_empty() {
                errors.push(ValidationError::Generator(
                    lang,
                    "path cannot be empty".to_string(),
                ));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, joining every problem into one error
    pub fn validated(self) -> Result<Self, GenerateError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            GenerateError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    /// Installation directory used to anchor relative generator paths
    pub fn install_dir(&self) -> Result<PathBuf, GenerateError> {
        match &self.generation.install_dir {
            Some(dir) => Ok(dir.clone()),
            None => installation_dir(),
        }
    }

    /// Resolve the generator binding table
    pub fn resolve_bindings(&self) -> Result<GeneratorBindings, GenerateError> {
        let install_dir = self.install_dir()?;
        Ok(GeneratorBindings::resolve(&install_dir, &self.generators))
    }

    /// Pipeline options, with relative staging roots anchored at `workspace_root`
    pub fn pipeline_options(&self, workspace_root: &Path) -> PipelineOptions {
        let staging_root = match &self.generation.staging_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => workspace_root.join(root),
            None => std::env::temp_dir(),
        };
        PipelineOptions {
            timeout: self.generation.timeout(),
            container_suffix: self.generation.container_suffix.clone(),
            staging_root,
        }
    }
}
