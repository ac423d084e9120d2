use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use spaced_lib::flashcards::Rating;

use super::review_state::{Phase, ReviewState};

pub fn handle_key(state: &mut ReviewState, key: KeyEvent) {
    // Clear flash message on any keypress
    state.flash_message = None;

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.quit = true;
        return;
    }

    match state.phase {
        Phase::Front => handle_front_key(state, key),
        Phase::Back => handle_back_key(state, key),
        Phase::Done => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => state.quit = true,
            _ => {}
        },
    }
}

fn handle_front_key(state: &mut ReviewState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => state.quit = true,
        KeyCode::Char(' ') | KeyCode::Enter => state.reveal(),
        KeyCode::Char('s') => state.rate(None),
        _ => {}
    }
}

fn handle_back_key(state: &mut ReviewState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => state.quit = true,
        KeyCode::Char('s') => state.rate(None),
        KeyCode::Char(c @ '1'..='4') => {
            if let Ok(rating) = c.to_string().parse::<Rating>() {
                state.rate(Some(rating));
            }
        }
        _ => {}
    }
}
