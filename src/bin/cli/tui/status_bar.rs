use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::review_state::{Phase, ReviewState};

pub fn draw(f: &mut Frame, area: Rect, state: &ReviewState) {
    // Show flash message if present
    if let Some(ref msg) = state.flash_message {
        let flash = Paragraph::new(format!(" {}", msg))
            .style(Style::default().bg(Color::Red).fg(Color::White));
        f.render_widget(flash, area);
        return;
    }

    let hints = match state.phase {
        Phase::Front => " Space: reveal  s: skip  q: quit (session is saved) ",
        Phase::Back => " 1: again  2: hard  3: good  4: easy  s: skip  q: quit ",
        Phase::Done => " Enter/q: exit ",
    };

    let status = Paragraph::new(hints).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status, area);
}
