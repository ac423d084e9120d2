use chrono::{DateTime, Duration, Local, Utc};

use spaced_lib::flashcards::algorithm::format_interval;
use spaced_lib::flashcards::{Card, CardState, Rating, ReviewStats};
use spaced_lib::session::{Record, RecordSummary};

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Front of a card: the word to pronounce
pub fn render_front(card: &Card, use_color: bool) -> String {
    format!(
        "{} {}",
        paint(&card.word, Color::BOLD, use_color),
        paint(&format!("#{}", card.id), Color::GRAY, use_color)
    )
}

/// Back of a card: pronunciation, meaning and usage
pub fn render_back(card: &Card, use_color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if !card.ipa.is_empty() {
        lines.push(format!("  {}", paint(&card.ipa, Color::CYAN, use_color)));
    }
    if !card.definition.is_empty() {
        lines.extend(wrap_lines(&card.definition, "  ", 80));
    }
    if !card.example.is_empty() {
        for line in wrap_lines(&card.example, "  > ", 80) {
            lines.push(paint(&line, Color::ITALIC, use_color));
        }
    }
    lines
}

/// `again 10m | hard 1d | good 1d | easy 1d`
pub fn render_preview(preview: &[(Rating, Duration)], use_color: bool) -> String {
    preview
        .iter()
        .map(|(rating, wait)| {
            let color = match rating {
                Rating::Again => Color::RED,
                Rating::Hard => Color::YELLOW,
                Rating::Good => Color::GREEN,
                Rating::Easy => Color::BLUE,
            };
            format!(
                "{} {}",
                paint(&rating.to_string(), color, use_color),
                format_interval(*wait)
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One line per card for listings
pub fn render_card_row(card: &Card, now: DateTime<Utc>, use_color: bool) -> String {
    let state = state_label(card.schedule.state);
    let due = match card.schedule.due {
        None => "-".to_string(),
        Some(_) if card.is_due(now) => paint("due", Color::YELLOW, use_color),
        Some(due) => format_interval(due - now),
    };
    format!(
        "{:>4}  {:<20} {:<16} {:<10} {}",
        card.id,
        card.word,
        card.ipa,
        state,
        due
    )
}

pub fn state_label(state: CardState) -> &'static str {
    match state {
        CardState::New => "new",
        CardState::Learning => "learning",
        CardState::Review => "review",
        CardState::Relearning => "relearning",
    }
}

pub fn render_stats(stats: &ReviewStats, use_color: bool) -> Vec<String> {
    vec![
        format!("{} {}", paint("Cards:", Color::BOLD, use_color), stats.total_cards),
        format!("  new        {}", stats.new_cards),
        format!("  learning   {}", stats.learning_cards),
        format!("  review     {}", stats.review_cards),
        format!(
            "  due now    {}",
            paint(&stats.due_cards.to_string(), Color::YELLOW, use_color)
        ),
    ]
}

pub fn render_summary(summary: &RecordSummary, use_color: bool) -> String {
    let started = summary.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    format!(
        "{:>4}  {}  {:>3} cards  {}",
        summary.id,
        paint(&started.to_string(), Color::DIM, use_color),
        summary.cards_reviewed,
        format_duration(summary.duration_secs)
    )
}

pub fn render_record(record: &Record, cards: &[&Card], use_color: bool) -> Vec<String> {
    let summary = RecordSummary::from(record);
    let mut lines = vec![
        paint(&format!("Session {}", record.id), Color::BOLD, use_color),
        format!(
            "  started    {}",
            record.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        format!(
            "  completed  {}",
            record.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        format!("  duration   {}", format_duration(summary.duration_secs)),
        format!("  cards      {}", summary.cards_reviewed),
    ];
    for card in cards {
        lines.push(format!("    {} {}", card.word, paint(&card.ipa, Color::CYAN, use_color)));
    }
    lines
}

/// `1h 02m`, `3m 05s`, `42s`
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.len());

    for line in text.lines() {
        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(format!("{}{}", prefix, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(format!("{}{}", prefix, current_line));
        }
    }

    lines
}
