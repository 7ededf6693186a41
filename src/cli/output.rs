//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::artifact::SourceLanguage;
use crate::error::GenerateError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &GenerateError) -> String {
    match e {
        GenerateError::UnknownLanguage(lang) => {
            let known: Vec<&str> = SourceLanguage::ALL.iter().map(|l| l.slug()).collect();
            format!(
                "Unknown source language '{}'. Known languages: {}",
                lang,
                known.join(", ")
            )
        }
        other => other.to_string(),
    }
}
