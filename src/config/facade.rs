//! Config loading entry point: one loader for every front end.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::TarsgenConfig;
use crate::error::GenerateError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads configuration from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, then the workspace files under `workspace_root`
    pub fn load(workspace_root: &Path) -> Result<TarsgenConfig, GenerateError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: TarsgenConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load defaults plus a single explicit file
    pub fn load_from_file(path: &Path) -> Result<TarsgenConfig, GenerateError> {
        if !path.is_file() {
            return Err(GenerateError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: TarsgenConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()?;
        debug!(config_file = %path.display(), "Configuration loaded");
        Ok(config)
    }
}
