//! Draws a bounded review queue out of the card pool

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::models::Session;
use crate::error::{EngineError, Result};
use crate::flashcards::{compare_cards, Card, CardId, CardStore};

/// Share of a session reserved for already-scheduled cards
const REVIEW_SHARE: f64 = 0.2;

/// How many scheduled and new cards go into a session of `target` cards
/// given the supply in each bucket. The scheduled share is taken first;
/// when one bucket runs short the other fills the remaining slots.
pub fn split_counts(target: usize, scheduled: usize, fresh: usize) -> (usize, usize) {
    let n = target.min(scheduled + fresh);
    let mut reviewed = ((REVIEW_SHARE * n as f64).floor() as usize).min(scheduled);
    let new_count = (n - reviewed).min(fresh);
    if reviewed + new_count < n {
        reviewed = (n - new_count).min(scheduled);
    }
    (reviewed, new_count)
}

pub struct SessionBuilder;

impl SessionBuilder {
    pub fn build(store: &CardStore, target_size: usize, now: DateTime<Utc>) -> Result<Session> {
        Self::build_with_rng(store, target_size, now, &mut rand::thread_rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(
        store: &CardStore,
        target_size: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Session> {
        let (mut scheduled, mut fresh): (Vec<&Card>, Vec<&Card>) =
            store.iter().partition(|card| !card.is_new());

        scheduled.sort_by(|a, b| compare_cards(a, b));
        fresh.sort_by(|a, b| compare_cards(a, b));

        let (reviewed, new_count) = split_counts(target_size, scheduled.len(), fresh.len());
        if reviewed + new_count == 0 {
            return Err(EngineError::Validation("no cards available".to_string()));
        }

        let mut cards: Vec<CardId> = scheduled
            .iter()
            .take(reviewed)
            .chain(fresh.iter().take(new_count))
            .map(|card| card.id)
            .collect();

        // Only breaks ties: the engine re-sorts by due/state before serving
        cards.shuffle(rng);

        log::debug!(
            "Built session with {} scheduled and {} new cards",
            reviewed,
            new_count
        );

        Ok(Session::new(cards, now))
    }
}
