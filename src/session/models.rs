//! Data models for study sessions and their history

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::flashcards::{CardId, CardStore};

/// Set of card ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet(BTreeSet<CardId>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not already present
    pub fn insert(&mut self, id: CardId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: CardId) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.0.iter().copied()
    }
}

/// One study sitting.
///
/// The membership of `cards` is fixed at creation; only the order (re-sorted
/// before serving) and the two sets change while the session runs. Cards are
/// referenced by id so scheduling updates in the store are visible here
/// immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    cards: Vec<CardId>,
    /// Cards whose latest rating was Again
    #[serde(default, rename = "againSet", alias = "again")]
    pub again: IdSet,
    /// Cards served at least once
    #[serde(default, rename = "lookedSet", alias = "looked")]
    pub looked: IdSet,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(cards: Vec<CardId>, started_at: DateTime<Utc>) -> Self {
        Self {
            cards,
            again: IdSet::new(),
            looked: IdSet::new(),
            started_at,
        }
    }

    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains(&id)
    }

    /// Re-sort the queue in place by the store ordering and return its head
    pub fn sort_and_peek(&mut self, store: &CardStore) -> Option<CardId> {
        self.cards.sort_by(|a, b| store.ordering(*a, *b));
        self.cards.first().copied()
    }

    /// A sitting is over once no card awaits an Again retry, every card has
    /// been served, and every card has been reviewed into the future.
    pub fn should_stop(&self, store: &CardStore, now: DateTime<Utc>) -> bool {
        if !self.again.is_empty() {
            return false;
        }
        // every card needs to be looked at least once
        if self.looked.len() != self.cards.len() {
            return false;
        }
        self.cards.iter().all(|&id| match store.get(id) {
            Ok(card) => {
                let due_in_future = card.schedule.due.map_or(false, |due| due >= now);
                due_in_future && card.schedule.last_review.is_some()
            }
            Err(_) => false,
        })
    }
}

/// Immutable history entry for a completed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: usize,
    #[serde(alias = "cardIDs")]
    pub card_ids: Vec<CardId>,
    #[serde(alias = "staredAt")]
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl Record {
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }
}

/// Presentation-ready summary of a [`Record`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: usize,
    pub cards_reviewed: usize,
    pub duration_secs: i64,
    pub started_at: DateTime<Utc>,
}

impl From<&Record> for RecordSummary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            cards_reviewed: record.card_ids.len(),
            duration_secs: record.duration().num_seconds(),
            started_at: record.started_at,
        }
    }
}
