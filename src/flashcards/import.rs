//! Tab-separated notes import
//!
//! Each non-blank line holds `word`, `definition`, `example` and `ipa`
//! separated by tabs. Empty columns (runs of tabs) are skipped.

use super::models::BootstrapEntry;
use crate::error::{EngineError, Result};

pub fn parse_notes(text: &str) -> Result<Vec<BootstrapEntry>> {
    let mut entries = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line
            .split('\t')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        match parts.as_slice() {
            [word, definition, example, ipa, ..] => entries.push(BootstrapEntry {
                word: word.to_string(),
                ipa: ipa.to_string(),
                definition: definition.to_string(),
                example: example.to_string(),
            }),
            _ => {
                return Err(EngineError::Validation(format!(
                    "line {}: expected word, definition, example and ipa separated by tabs",
                    line_no + 1
                )))
            }
        }
    }

    Ok(entries)
}
