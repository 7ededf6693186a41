//! CLI presentation: text and json rendering of command results.

use crate::binding::GeneratorBindings;
use crate::evict::Eviction;
use crate::host::Diagnostic;
use crate::pipeline::{ArtifactOutcome, ArtifactReport};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_generate_text(
    reports: &[ArtifactReport],
    diagnostics: &[Diagnostic],
    color: bool,
) -> String {
    let mut output = String::new();
    for report in reports {
        let path = report.artifact.path.display();
        let line = match &report.outcome {
            ArtifactOutcome::Skipped => format!(
                "{} {} (no generator for {})",
                paint("skipped", Paint::Dim, color),
                path,
                report.artifact.language
            ),
            ArtifactOutcome::Generated {
                container,
                sync,
                eviction,
                ..
            } => {
                let replaced = match eviction {
                    Eviction::Removed { .. } => ", replaced previous output",
                    Eviction::NothingToRemove => "",
                };
                format!(
                    "{} {} -> {} ({} file(s), {} folder(s), {} bytes{}, {}ms)",
                    paint("generated", Paint::Ok, color),
                    path,
                    container.display(),
                    sync.files,
                    sync.folders,
                    sync.bytes,
                    replaced,
                    report.elapsed_ms
                )
            }
            ArtifactOutcome::TimedOut { timeout_ms, .. } => format!(
                "{} {} (generator still running after {}ms; output left untouched)",
                paint("timed out", Paint::Err, color),
                path,
                timeout_ms
            ),
            ArtifactOutcome::Failed { error } => {
                format!("{} {}: {}", paint("failed", Paint::Err, color), path, error)
            }
        };
        output.push_str(&line);
        output.push('\n');
    }

    if !diagnostics.is_empty() {
        output.push_str("\nGenerator diagnostics:\n");
        for diagnostic in diagnostics {
            output.push_str(&format!("--- {}\n", diagnostic.artifact.display()));
            output.push_str(diagnostic.text.trim_end());
            output.push('\n');
        }
    }

    let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
    output.push_str(&format!(
        "\nTotal: {} artifact(s), {} failed\n",
        reports.len(),
        failed
    ));
    output
}

pub fn format_generate_json(reports: &[ArtifactReport]) -> String {
    let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
    let out = json!({ "artifacts": reports, "total": reports.len(), "failed": failed });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_bindings_text(bindings: &GeneratorBindings) -> String {
    if bindings.is_empty() {
        return "No generator bindings configured.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Language", "Generator", "Installed"]);
    for binding in bindings.iter() {
        let installed = if binding.is_installed() { "yes" } else { "no" };
        table.add_row(vec![
            binding.language.to_string(),
            binding.executable.display().to_string(),
            installed.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_bindings_json(bindings: &GeneratorBindings) -> String {
    let list: Vec<_> = bindings
        .iter()
        .map(|binding| {
            json!({
                "language": binding.language,
                "executable": binding.executable,
                "installed": binding.is_installed(),
            })
        })
        .collect();
    let out = json!({ "bindings": list, "total": bindings.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

enum Paint {
    Ok,
    Err,
    Dim,
}

fn paint(label: &str, kind: Paint, color: bool) -> String {
    if !color {
        return label.to_string();
    }
    match kind {
        Paint::Ok => label.green().to_string(),
        Paint::Err => label.red().to_string(),
        Paint::Dim => label.dimmed().to_string(),
    }
}
