use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};

use spaced_lib::flashcards::{Card, CardId, Rating};
use spaced_lib::session::{NextCard, Record, RecordSummary};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run_start(app: &mut App, size: Option<usize>, format: &OutputFormat) -> Result<()> {
    let target = app.target_size(size);
    let session = app.engine.start(target).context("Failed to start session")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(session)?),
        OutputFormat::Plain => println!("Started session with {} cards", session.len()),
    }
    Ok(())
}

pub fn run_next(app: &mut App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let next = app.engine.next().context("Failed to get next card")?;

    match (format, next) {
        (OutputFormat::Json, NextCard::Card(card)) => {
            println!("{}", serde_json::json!({ "stop": false, "card": card }));
        }
        (OutputFormat::Json, NextCard::Stop(record)) => {
            println!("{}", serde_json::json!({ "stop": true, "record": record }));
        }
        (OutputFormat::Plain, NextCard::Card(card)) => {
            println!("{}", terminal::render_front(&card, use_color));
            print_back(app, &card, use_color)?;
        }
        (OutputFormat::Plain, NextCard::Stop(record)) => {
            print_completed(&record, use_color);
        }
    }
    Ok(())
}

pub fn run_submit(
    app: &mut App,
    card_id: CardId,
    rating: &str,
    format: &OutputFormat,
) -> Result<()> {
    let rating = Rating::parse_submitted(rating).map_err(|e| anyhow!(e))?;
    let ack = app
        .engine
        .submit(card_id, rating)
        .with_context(|| format!("Failed to submit rating for card {}", card_id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&ack)?),
        OutputFormat::Plain => match rating {
            Some(rating) => println!("Card {} rated {}", card_id, rating),
            None => println!("Card {} skipped", card_id),
        },
    }
    Ok(())
}

pub fn run_discard(app: &mut App, format: &OutputFormat) -> Result<()> {
    let session = app.engine.discard().context("Failed to discard session")?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "discarded": session.len() })),
        OutputFormat::Plain => println!("Discarded session with {} cards", session.len()),
    }
    Ok(())
}

/// Line-based review loop: Enter reveals, then a rating submits.
/// End of input or `q` leaves the session saved for later.
pub fn run_review(app: &mut App, size: Option<usize>, use_color: bool) -> Result<()> {
    if app.engine.store().is_empty() {
        bail!("No cards. Run `spaced-cli init` or `spaced-cli import <file>` first.");
    }
    if app.engine.is_active() {
        println!("Resuming unfinished session");
    } else {
        let target = app.target_size(size);
        let session = app.engine.start(target).context("Failed to start session")?;
        println!("Started session with {} cards", session.len());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let card = match app.engine.next().context("Failed to get next card")? {
            NextCard::Card(card) => card,
            NextCard::Stop(record) => {
                print_completed(&record, use_color);
                return Ok(());
            }
        };

        println!();
        println!("{}", terminal::render_front(&card, use_color));
        let Some(input) = prompt(&mut lines, "[Enter] reveal, [q] quit: ")? else {
            break;
        };
        if input.trim() == "q" {
            break;
        }
        print_back(app, &card, use_color)?;

        let rating = loop {
            let Some(input) = prompt(&mut lines, "Rate [1-4, s=skip, q=quit]: ")? else {
                return paused();
            };
            let input = input.trim();
            if input == "q" {
                return paused();
            }
            match Rating::parse_submitted(if input == "s" { "skip" } else { input }) {
                Ok(rating) => break rating,
                Err(e) => println!("{}", e),
            }
        };

        app.engine
            .submit(card.id, rating)
            .with_context(|| format!("Failed to submit rating for card {}", card.id))?;
    }

    paused()
}

fn paused() -> Result<()> {
    println!("Session saved. Run `spaced-cli review` to continue.");
    Ok(())
}

/// Read one line after printing `message`; `None` at end of input
fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    message: &str,
) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    lines.next().transpose().context("Failed to read input")
}

fn print_back(app: &App, card: &Card, use_color: bool) -> Result<()> {
    for line in terminal::render_back(card, use_color) {
        println!("{}", line);
    }
    let preview = app
        .engine
        .preview(card.id)
        .context("Failed to preview intervals")?;
    println!("  {}", terminal::render_preview(&preview, use_color));
    Ok(())
}

fn print_completed(record: &Record, use_color: bool) {
    let summary = RecordSummary::from(record);
    let message = format!(
        "Session complete: {} cards in {}",
        summary.cards_reviewed,
        terminal::format_duration(summary.duration_secs)
    );
    if use_color {
        println!("{}{}{}", Color::GREEN, message, Color::RESET);
    } else {
        println!("{}", message);
    }
}
