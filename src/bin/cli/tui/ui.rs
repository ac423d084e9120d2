use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use spaced_lib::flashcards::algorithm::format_interval;
use spaced_lib::flashcards::Rating;
use spaced_lib::session::RecordSummary;

use super::review_state::{Phase, ReviewState};
use super::status_bar;
use crate::render::terminal::format_duration;

pub fn draw(f: &mut Frame, state: &ReviewState) {
    let size = f.area();

    // Main layout: card area + status bar
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(size);

    draw_card(f, outer[0], state);
    status_bar::draw(f, outer[1], state);
}

fn draw_card(f: &mut Frame, area: Rect, state: &ReviewState) {
    let title = match state.progress() {
        Some((seen, total)) => format!(" Review {}/{} ", seen, total),
        None => " Review ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut text = vec![Line::from("")];

    match (&state.card, state.phase) {
        (_, Phase::Done) => {
            text.push(Line::from(Span::styled(
                "  Session complete",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            if let Some(record) = &state.completed {
                let summary = RecordSummary::from(record);
                text.push(Line::from(format!(
                    "  {} cards in {}",
                    summary.cards_reviewed,
                    format_duration(summary.duration_secs)
                )));
            }
        }
        (Some(card), phase) => {
            text.push(Line::from(Span::styled(
                format!("  {}", card.word),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if phase == Phase::Back {
                text.push(Line::from(""));
                if !card.ipa.is_empty() {
                    text.push(Line::from(Span::styled(
                        format!("  {}", card.ipa),
                        Style::default().fg(Color::Cyan),
                    )));
                }
                if !card.definition.is_empty() {
                    text.push(Line::from(format!("  {}", card.definition)));
                }
                if !card.example.is_empty() {
                    text.push(Line::from(Span::styled(
                        format!("  > {}", card.example),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )));
                }
                text.push(Line::from(""));
                text.push(preview_line(&state.preview));
            }
        }
        (None, _) => {}
    }

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn preview_line(preview: &[(Rating, chrono::Duration)]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (index, (rating, wait)) in preview.iter().enumerate() {
        let color = match rating {
            Rating::Again => Color::Red,
            Rating::Hard => Color::Yellow,
            Rating::Good => Color::Green,
            Rating::Easy => Color::Blue,
        };
        spans.push(Span::styled(
            format!("{} {} ", index + 1, rating),
            Style::default().fg(color),
        ));
        spans.push(Span::styled(
            format!("{}   ", format_interval(*wait)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
