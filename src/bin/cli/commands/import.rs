use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use spaced_lib::flashcards::import::parse_notes;
use spaced_lib::session::SeedOutcome;

use crate::app::App;
use crate::OutputFormat;

/// Seed an empty store from a tab-separated notes file
pub fn run(app: &mut App, path: &Path, format: &OutputFormat) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = parse_notes(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    let parsed = entries.len();

    let outcome = app.engine.seed(entries).context("Failed to save imported cards")?;

    match (format, outcome) {
        (OutputFormat::Json, SeedOutcome::Seeded(count)) => {
            println!("{}", serde_json::json!({ "imported": count }));
        }
        (OutputFormat::Json, SeedOutcome::Discarded) => {
            println!("{}", serde_json::json!({ "imported": 0, "discarded": parsed }));
        }
        (OutputFormat::Plain, SeedOutcome::Seeded(count)) => {
            println!("Imported {} cards from {}", count, path.display());
        }
        (OutputFormat::Plain, SeedOutcome::Discarded) => {
            println!(
                "Store already holds {} cards; {} notes not imported.",
                app.engine.store().len(),
                parsed
            );
        }
    }

    Ok(())
}
