//! CLI route: single route table and run context.

use crate::artifact::{SelectedArtifact, SourceLanguage};
use crate::binding::GeneratorBindings;
use crate::cli::parse::{Commands, ConfigCommands, OutputFormat};
use crate::cli::presentation::{
    format_bindings_json, format_bindings_text, format_generate_json, format_generate_text,
};
use crate::config::{ConfigLoader, TarsgenConfig};
use crate::error::GenerateError;
use crate::host::{CollectingSink, FilesystemHost};
use crate::pipeline::GenerationPipeline;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Rendered command result; `success` is false when any artifact failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// Runtime context for CLI execution: workspace, loaded config and resolved bindings.
pub struct RunContext {
    workspace_root: PathBuf,
    config: TarsgenConfig,
    bindings: Arc<GeneratorBindings>,
    color: bool,
}

impl RunContext {
    /// Load configuration (explicit file, or layered sources for the workspace) and resolve bindings.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GenerateError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(workspace_root, config)
    }

    /// Build from an already loaded configuration
    pub fn from_config(workspace_root: PathBuf, config: TarsgenConfig) -> Result<Self, GenerateError> {
        let config = config.validated()?;
        let bindings = Arc::new(config.resolve_bindings()?);
        let color = config.logging.color && std::io::stdout().is_terminal();
        Ok(Self {
            workspace_root,
            config,
            bindings,
            color,
        })
    }

    pub fn config(&self) -> &TarsgenConfig {
        &self.config
    }

    pub fn bindings(&self) -> &GeneratorBindings {
        &self.bindings
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, GenerateError> {
        match command {
            Commands::Generate {
                artifacts,
                language,
                timeout_secs,
                format,
            } => self.handle_generate(artifacts, language.as_deref(), *timeout_secs, *format),
            Commands::Bindings { format } => {
                let text = match format {
                    OutputFormat::Json => format_bindings_json(&self.bindings),
                    OutputFormat::Text => format_bindings_text(&self.bindings),
                };
                Ok(CommandOutput::ok(text))
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => {
                    let text = toml::to_string_pretty(&self.config).map_err(|e| {
                        GenerateError::ConfigError(format!("Failed to render config: {}", e))
                    })?;
                    Ok(CommandOutput::ok(text))
                }
                // Loading already validated; reaching here means the config is valid.
                ConfigCommands::Validate => Ok(CommandOutput::ok(format!(
                    "Configuration is valid ({} generator binding(s)).",
                    self.bindings.len()
                ))),
            },
        }
    }

    fn handle_generate(
        &self,
        paths: &[PathBuf],
        language: Option<&str>,
        timeout_secs: Option<u64>,
        format: OutputFormat,
    ) -> Result<CommandOutput, GenerateError> {
        let language = match language {
            Some(lang) => lang.parse::<SourceLanguage>()?,
            None => self.config.generation.default_language,
        };
        let artifacts: Vec<SelectedArtifact> = paths
            .iter()
            .map(|path| {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    self.workspace_root.join(path)
                };
                SelectedArtifact::new(path, language)
            })
            .collect();

        let mut options = self.config.pipeline_options(&self.workspace_root);
        if let Some(secs) = timeout_secs {
            if secs == 0 {
                return Err(GenerateError::ConfigError(
                    "--timeout-secs must be greater than zero".to_string(),
                ));
            }
            options.timeout = Duration::from_secs(secs);
        }

        let sink = Arc::new(CollectingSink::new());
        let pipeline = GenerationPipeline::new(
            Arc::clone(&self.bindings),
            options,
            Arc::new(FilesystemHost),
            sink.clone(),
        );
        let reports = pipeline.process(&artifacts);

        let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
        info!(total = reports.len(), failed, "Generate finished");

        let text = match format {
            OutputFormat::Json => format_generate_json(&reports),
            OutputFormat::Text => format_generate_text(&reports, &sink.messages(), self.color),
        };
        Ok(CommandOutput {
            text,
            success: failed == 0,
        })
    }
}
