use anyhow::{Context, Result};
use chrono::Duration;

use spaced_lib::flashcards::{Card, Rating};
use spaced_lib::session::{NextCard, Record};

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Only the word is visible
    Front,
    /// IPA, definition and rating preview are visible
    Back,
    /// The session completed
    Done,
}

pub struct ReviewState {
    pub app: App,
    pub phase: Phase,
    pub card: Option<Card>,
    pub preview: Vec<(Rating, Duration)>,
    pub completed: Option<Record>,
    pub flash_message: Option<String>,
    pub quit: bool,
}

impl ReviewState {
    /// Resume the saved session or start a new one, then load the first card
    pub fn new(mut app: App, size: Option<usize>) -> Result<Self> {
        if !app.engine.is_active() {
            let target = app.target_size(size);
            app.engine.start(target).context("Failed to start session")?;
        }

        let mut state = Self {
            app,
            phase: Phase::Front,
            card: None,
            preview: Vec::new(),
            completed: None,
            flash_message: None,
            quit: false,
        };
        state.advance()?;
        Ok(state)
    }

    /// `(seen, total)` for the running session
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.app
            .engine
            .session()
            .map(|session| (session.looked.len(), session.len()))
    }

    pub fn reveal(&mut self) {
        if self.phase != Phase::Front {
            return;
        }
        if let Some(card) = &self.card {
            match self.app.engine.preview(card.id) {
                Ok(preview) => self.preview = preview,
                Err(e) => self.flash_message = Some(e.to_string()),
            }
        }
        self.phase = Phase::Back;
    }

    /// Submit a rating (or a skip) for the shown card and move on
    pub fn rate(&mut self, rating: Option<Rating>) {
        if self.phase == Phase::Done {
            return;
        }
        let Some(card_id) = self.card.as_ref().map(|card| card.id) else {
            return;
        };
        if let Err(e) = self.app.engine.submit(card_id, rating) {
            self.flash_message = Some(format!("Failed to save rating: {}", e));
            return;
        }
        if let Err(e) = self.advance() {
            self.flash_message = Some(e.to_string());
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.preview.clear();
        match self.app.engine.next().context("Failed to get next card")? {
            NextCard::Card(card) => {
                self.card = Some(card);
                self.phase = Phase::Front;
            }
            NextCard::Stop(record) => {
                self.card = None;
                self.completed = Some(record);
                self.phase = Phase::Done;
            }
        }
        Ok(())
    }
}
