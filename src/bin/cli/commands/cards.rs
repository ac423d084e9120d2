use anyhow::Result;
use chrono::Utc;

use spaced_lib::flashcards::{compare_cards, Card};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

/// List every card, most urgent first
pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut cards: Vec<&Card> = app.engine.store().iter().collect();
    cards.sort_by(|a, b| compare_cards(a, b));

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards. Run `spaced-cli init` or `spaced-cli import <file>` first.");
                return Ok(());
            }
            let now = Utc::now();
            for card in cards {
                println!("{}", terminal::render_card_row(card, now, use_color));
            }
        }
    }

    Ok(())
}
