//! Merge rules: defaults first, later sources override earlier ones key by key.

use crate::binding::default_csharp_generator;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generation.timeout_secs", 10)?
        .set_default("generation.container_suffix", "_")?
        .set_default("generation.default_language", "csharp")?
        .set_default(
            "generators.csharp.path",
            default_csharp_generator().to_string_lossy().into_owned(),
        )
}
