//! The active-session state machine
//!
//! An engine is either idle or running exactly one session. All mutating
//! operations take `&mut self`; callers that share an engine across tasks go
//! through [`SharedEngine`], which serializes them.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde::Serialize;

use super::builder::SessionBuilder;
use super::models::{Record, Session};
use super::records::RecordKeeper;
use crate::error::{EngineError, Result};
use crate::flashcards::algorithm::preview_intervals;
use crate::flashcards::{
    BootstrapEntry, Card, CardId, CardStore, Rating, ReviewStats, Scheduler, SchedulerError,
};
use crate::storage::{PersistenceGateway, StorageError, CURRENT_SESSION_KEY, FLASHCARDS_KEY};

/// Engine handle shared between the caller and background bootstrap
pub type SharedEngine = Arc<Mutex<SessionEngine>>;

/// What `next` hands back
#[derive(Debug, Clone, PartialEq)]
pub enum NextCard {
    /// The card to study now
    Card(Card),
    /// The session just completed and was recorded
    Stop(Record),
}

/// Acknowledgement of a submitted rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Whether the card's scheduling fields were changed
    pub updated: bool,
}

/// Result of offering a fresh card batch to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    /// The store was already populated; the batch was dropped
    Discarded,
}

pub struct SessionEngine {
    store: CardStore,
    records: RecordKeeper,
    scheduler: Box<dyn Scheduler>,
    gateway: Arc<dyn PersistenceGateway>,
    session: Option<Session>,
}

impl SessionEngine {
    pub fn new(
        store: CardStore,
        records: RecordKeeper,
        scheduler: Box<dyn Scheduler>,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Self {
        Self {
            store,
            records,
            scheduler,
            gateway,
            session: None,
        }
    }

    /// Restore cards, history and any unfinished session from the gateway
    pub fn open(gateway: Arc<dyn PersistenceGateway>, scheduler: Box<dyn Scheduler>) -> Result<Self> {
        let store = match gateway.get(FLASHCARDS_KEY) {
            Ok(bytes) => CardStore::load(&bytes)?,
            Err(StorageError::NotFound(_)) => CardStore::new(),
            Err(e) => return Err(e.into()),
        };
        let records = RecordKeeper::load(gateway.as_ref())?;

        let mut engine = Self::new(store, records, scheduler, gateway);
        engine.resume()?;
        Ok(engine)
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    fn resume(&mut self) -> Result<()> {
        let bytes = match self.gateway.get(CURRENT_SESSION_KEY) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) if self.is_consistent(&session) => {
                log::info!("Resuming session with {} cards", session.len());
                self.session = Some(session);
            }
            Ok(_) => {
                log::warn!("Dropping saved session with unknown or repeated cards");
                self.gateway.remove(CURRENT_SESSION_KEY)?;
            }
            Err(e) => {
                log::warn!("Dropping unreadable saved session: {}", e);
                self.gateway.remove(CURRENT_SESSION_KEY)?;
            }
        }
        Ok(())
    }

    fn is_consistent(&self, session: &Session) -> bool {
        let distinct: HashSet<CardId> = session.cards().iter().copied().collect();
        !session.is_empty()
            && distinct.len() == session.len()
            && session.cards().iter().all(|&id| self.store.contains(id))
            && session
                .again
                .iter()
                .chain(session.looked.iter())
                .all(|id| session.contains(id))
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn history(&self) -> &[Record] {
        self.records.records()
    }

    pub fn record(&self, id: usize) -> Result<&Record> {
        self.records.get(id)
    }

    pub fn stats(&self) -> ReviewStats {
        self.store.stats(Utc::now())
    }

    /// Whether the active session is finished. Always false when idle.
    pub fn should_stop(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |session| session.should_stop(&self.store, Utc::now()))
    }

    /// Begin a new session of up to `target_size` cards
    pub fn start(&mut self, target_size: usize) -> Result<&Session> {
        if self.session.is_some() {
            return Err(EngineError::State(
                "a session is already active; resume or discard it first".to_string(),
            ));
        }

        let session = SessionBuilder::build(&self.store, target_size, Utc::now())?;
        let bytes = serde_json::to_vec(&session)?;
        log::info!("Started session with {} cards", session.len());

        let session = self.session.insert(session);
        self.gateway.set(CURRENT_SESSION_KEY, &bytes)?;
        Ok(&*session)
    }

    /// Serve the most urgent card, or complete the session once it is done.
    ///
    /// Peeks without removing: calling twice without a submit in between
    /// returns the same card. If completion fails to persist, the error is
    /// returned but the engine is already idle and the record kept in memory.
    pub fn next(&mut self) -> Result<NextCard> {
        if self.store.is_empty() {
            return Err(EngineError::NotFound("no cards found".to_string()));
        }

        let now = Utc::now();
        let finished = match &self.session {
            Some(session) => session.should_stop(&self.store, now),
            None => return Err(EngineError::State("no session started".to_string())),
        };

        if finished {
            if let Some(session) = self.session.take() {
                return match self
                    .records
                    .complete(session, &self.store, self.gateway.as_ref(), now)
                {
                    Ok(record) => Ok(NextCard::Stop(record)),
                    Err((_, e)) => Err(e),
                };
            }
        }

        let head = self
            .session
            .as_mut()
            .and_then(|session| session.sort_and_peek(&self.store))
            .ok_or_else(|| EngineError::State("session has no cards".to_string()))?;
        Ok(NextCard::Card(self.store.get(head)?.clone()))
    }

    /// Record feedback for a served card. `None` means the learner looked at
    /// the card without rating it; nothing but the looked set changes.
    pub fn submit(&mut self, card_id: CardId, rating: Option<Rating>) -> Result<Ack> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| EngineError::Validation("no active session".to_string()))?;
        let card = self
            .store
            .get(card_id)
            .map_err(|_| EngineError::Validation(format!("unknown card {}", card_id)))?;
        if !session.contains(card_id) {
            return Err(EngineError::Validation(format!(
                "card {} is not part of the current session",
                card_id
            )));
        }

        session.looked.insert(card_id);

        let Some(rating) = rating else {
            self.persist_session()?;
            return Ok(Ack { updated: false });
        };

        log::debug!("Submitting {} for card {} ({})", rating, card_id, card.word);

        let mut outcomes = self.scheduler.repeat(&card.schedule, Utc::now())?;
        let outcome = outcomes
            .remove(&rating)
            .ok_or(SchedulerError::MissingOutcome(rating))?;

        if rating == Rating::Again {
            session.again.insert(card_id);
        } else {
            session.again.remove(card_id);
        }
        self.store.apply_scheduler_outcome(card_id, outcome)?;

        self.persist_cards()?;
        self.persist_session()?;
        Ok(Ack { updated: true })
    }

    /// Abandon the active session without recording it
    pub fn discard(&mut self) -> Result<Session> {
        let session = self
            .session
            .take()
            .ok_or_else(|| EngineError::State("no active session to discard".to_string()))?;
        log::info!("Discarded session with {} cards", session.len());
        self.gateway.remove(CURRENT_SESSION_KEY)?;
        Ok(session)
    }

    /// Populate an empty store with a fresh batch. A populated store wins:
    /// the batch is dropped rather than overwriting existing progress.
    pub fn seed(&mut self, entries: Vec<BootstrapEntry>) -> Result<SeedOutcome> {
        if !self.store.is_empty() {
            log::warn!(
                "Discarding {} fetched cards: store already holds {}",
                entries.len(),
                self.store.len()
            );
            return Ok(SeedOutcome::Discarded);
        }

        self.store = CardStore::from_entries(entries);
        self.persist_cards()?;
        log::info!("Seeded store with {} cards", self.store.len());
        Ok(SeedOutcome::Seeded(self.store.len()))
    }

    /// How long until the card comes back for each possible rating
    pub fn preview(&self, card_id: CardId) -> Result<Vec<(Rating, Duration)>> {
        let card = self.store.get(card_id)?;
        Ok(preview_intervals(
            self.scheduler.as_ref(),
            &card.schedule,
            Utc::now(),
        )?)
    }

    fn persist_cards(&self) -> Result<()> {
        let bytes = self.store.to_bytes()?;
        self.gateway.set(FLASHCARDS_KEY, &bytes)?;
        Ok(())
    }

    fn persist_session(&self) -> Result<()> {
        match &self.session {
            Some(session) => {
                let bytes = serde_json::to_vec(session)?;
                self.gateway.set(CURRENT_SESSION_KEY, &bytes)?;
            }
            None => self.gateway.remove(CURRENT_SESSION_KEY)?,
        }
        Ok(())
    }
}
