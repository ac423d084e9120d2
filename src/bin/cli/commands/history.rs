use anyhow::{Context, Result};

use spaced_lib::flashcards::Card;
use spaced_lib::session::RecordSummary;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run_stats(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let stats = app.engine.stats();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            for line in terminal::render_stats(&stats, use_color) {
                println!("{}", line);
            }
            if let Some(session) = app.engine.session() {
                println!(
                    "Session in progress: {}/{} cards seen",
                    session.looked.len(),
                    session.len()
                );
            }
        }
    }
    Ok(())
}

/// Completed sessions, newest first
pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let summaries: Vec<RecordSummary> = app
        .engine
        .history()
        .iter()
        .rev()
        .map(RecordSummary::from)
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Plain => {
            if summaries.is_empty() {
                println!("No completed sessions yet.");
            }
            for summary in &summaries {
                println!("{}", terminal::render_summary(summary, use_color));
            }
        }
    }
    Ok(())
}

pub fn run_show(app: &App, id: usize, format: &OutputFormat, use_color: bool) -> Result<()> {
    let record = app
        .engine
        .record(id)
        .with_context(|| format!("No session record {}", id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Plain => {
            // Ids no longer in the store are skipped
            let cards: Vec<&Card> = record
                .card_ids
                .iter()
                .filter_map(|&card_id| app.engine.store().get(card_id).ok())
                .collect();
            for line in terminal::render_record(record, &cards, use_color) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
