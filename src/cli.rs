//! CLI domain: parse, route, output, and presentation only.
//! Generation itself lives in the pipeline; routes stay thin.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, OutputFormat};
pub use presentation::{
    format_bindings_json, format_bindings_text, format_generate_json, format_generate_text,
};
pub use route::{CommandOutput, RunContext};
