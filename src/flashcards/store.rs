//! In-memory owner of every flashcard and its scheduling fields

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::models::*;
use crate::error::{EngineError, Result};

/// Total order used for building sessions and for picking the next card:
/// earliest due first (unscheduled cards sort before any timestamp), then by
/// state rank.
pub fn compare_cards(a: &Card, b: &Card) -> Ordering {
    a.schedule
        .due
        .cmp(&b.schedule.due)
        .then_with(|| a.schedule.state.rank().cmp(&b.schedule.state.rank()))
}

#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from cards that already carry ids
    pub fn from_cards(cards: Vec<Card>) -> Result<Self> {
        let mut index = HashMap::with_capacity(cards.len());
        for (position, card) in cards.iter().enumerate() {
            if index.insert(card.id, position).is_some() {
                return Err(EngineError::Validation(format!(
                    "duplicate card id {}",
                    card.id
                )));
            }
        }
        Ok(Self { cards, index })
    }

    /// Build a store of fresh cards with sequential ids `0..n-1`
    pub fn from_entries(entries: Vec<BootstrapEntry>) -> Self {
        let cards: Vec<Card> = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Card::new(i as CardId, entry))
            .collect();
        let index = cards.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        Self { cards, index }
    }

    /// Deserialize a persisted card list.
    ///
    /// Ids are kept when every card carries a distinct valid one. Otherwise
    /// (first-time import of a plain word list) all cards are renumbered
    /// `0..n-1` in list order.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let mut raw: Vec<Value> = serde_json::from_slice(bytes)?;

        if !has_valid_ids(&raw) {
            log::info!("Assigning sequential ids to {} imported cards", raw.len());
            for (i, value) in raw.iter_mut().enumerate() {
                if let Some(object) = value.as_object_mut() {
                    object.insert("id".to_string(), Value::from(i as u64));
                }
            }
        }

        let cards: Vec<Card> = serde_json::from_value(Value::Array(raw))?;
        Self::from_cards(cards)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.cards)?)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: CardId) -> Result<&Card> {
        self.index
            .get(&id)
            .map(|&position| &self.cards[position])
            .ok_or_else(|| EngineError::NotFound(format!("card {}", id)))
    }

    /// Compare two cards by id with [`compare_cards`]. Unknown ids sort last.
    pub fn ordering(&self, a: CardId, b: CardId) -> Ordering {
        match (self.get(a), self.get(b)) {
            (Ok(a), Ok(b)) => compare_cards(a, b),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => Ordering::Equal,
        }
    }

    /// Replace every scheduling field of one card with a scheduler outcome
    pub fn apply_scheduler_outcome(&mut self, id: CardId, outcome: Schedule) -> Result<()> {
        let position = *self
            .index
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("card {}", id)))?;
        self.cards[position].schedule = outcome;
        Ok(())
    }

    /// Get review statistics for the whole pool
    pub fn stats(&self, now: DateTime<Utc>) -> ReviewStats {
        let mut stats = ReviewStats {
            total_cards: self.cards.len(),
            ..Default::default()
        };

        for card in &self.cards {
            match card.schedule.state {
                CardState::New => stats.new_cards += 1,
                CardState::Learning => stats.learning_cards += 1,
                CardState::Review | CardState::Relearning => stats.review_cards += 1,
            }

            if card.is_due(now) {
                stats.due_cards += 1;
            }
        }

        stats
    }
}

fn has_valid_ids(raw: &[Value]) -> bool {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter().all(|value| {
        value
            .get("id")
            .and_then(Value::as_u64)
            .filter(|&id| id <= CardId::MAX as u64)
            .map_or(false, |id| seen.insert(id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(word: &str) -> BootstrapEntry {
        BootstrapEntry {
            word: word.to_string(),
            ipa: String::new(),
            definition: String::new(),
            example: String::new(),
        }
    }

    fn card_with(id: CardId, due: Option<DateTime<Utc>>, state: CardState) -> Card {
        let mut card = Card::new(id, entry(&format!("word{}", id)));
        card.schedule.due = due;
        card.schedule.state = state;
        card
    }

    #[test]
    fn test_load_assigns_ids_on_first_import() {
        let json = r#"[
            {"word": "agree", "ipa": "əˈɡri"},
            {"word": "apple", "ipa": "ˈæpl̩"},
            {"word": "tomato", "ipa": "təˈmeɪtoʊ"}
        ]"#;
        let store = CardStore::load(json.as_bytes()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).unwrap().word, "agree");
        assert_eq!(store.get(2).unwrap().word, "tomato");
        assert!(store.iter().all(Card::is_new));
    }

    #[test]
    fn test_load_keeps_persisted_ids() {
        let json = r#"[{"id": 5, "word": "agree"}, {"id": 9, "word": "apple"}]"#;
        let store = CardStore::load(json.as_bytes()).unwrap();
        assert_eq!(store.get(5).unwrap().word, "agree");
        assert_eq!(store.get(9).unwrap().word, "apple");
        assert!(store.get(0).is_err());
    }

    #[test]
    fn test_load_renumbers_duplicate_ids() {
        let json = r#"[{"id": 1, "word": "agree"}, {"id": 1, "word": "apple"}]"#;
        let store = CardStore::load(json.as_bytes()).unwrap();
        assert_eq!(store.get(0).unwrap().word, "agree");
        assert_eq!(store.get(1).unwrap().word, "apple");
    }

    #[test]
    fn test_load_older_card_file() {
        let json = r#"[
            {"id": 0, "word": "agree", "ipa": "əˈɡri", "definition": "", "example": "",
             "due": "2025-01-04T00:00:00Z", "stability": 3.1, "difficulty": 5.2,
             "elapsed": 1, "scheduled": 3, "reps": 2, "lapses": 0, "state": 2,
             "last_review": "2025-01-01T00:00:00Z"},
            {"id": 1, "word": "apple", "ipa": "", "definition": "", "example": "",
             "due": "0001-01-01T00:00:00Z", "stability": 0, "difficulty": 0,
             "elapsed": 0, "scheduled": 0, "reps": 0, "lapses": 0, "state": 0,
             "last_review": "0001-01-01T00:00:00Z"}
        ]"#;
        let store = CardStore::load(json.as_bytes()).unwrap();

        let reviewed = store.get(0).unwrap();
        assert_eq!(reviewed.schedule.state, CardState::Review);
        assert_eq!(reviewed.schedule.elapsed_days, 1);
        assert_eq!(reviewed.schedule.scheduled_days, 3);
        assert!(reviewed.schedule.last_review.is_some());

        let fresh = store.get(1).unwrap();
        assert!(fresh.is_new());
        assert_eq!(fresh.schedule.state, CardState::New);
    }

    #[test]
    fn test_load_rejects_malformed_bytes() {
        assert!(matches!(
            CardStore::load(b"{not json"),
            Err(EngineError::Codec(_))
        ));
    }

    #[test]
    fn test_store_round_trip() {
        let now = Utc::now();
        let store = CardStore::from_cards(vec![
            card_with(0, None, CardState::New),
            card_with(1, Some(now), CardState::Review),
        ])
        .unwrap();
        let bytes = store.to_bytes().unwrap();
        let loaded = CardStore::load(&bytes).unwrap();
        assert_eq!(loaded.iter().collect::<Vec<_>>(), store.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = CardStore::from_entries(vec![entry("agree")]);
        assert!(matches!(store.get(3), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_ordering_due_then_state() {
        let now = Utc::now();
        let store = CardStore::from_cards(vec![
            card_with(0, Some(now), CardState::Relearning),
            card_with(1, Some(now), CardState::Learning),
            card_with(2, Some(now - Duration::days(1)), CardState::Review),
            card_with(3, None, CardState::New),
        ])
        .unwrap();

        let mut ids = vec![0, 1, 2, 3];
        ids.sort_by(|a, b| store.ordering(*a, *b));
        assert_eq!(ids, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_ordering_is_stable_for_equal_keys() {
        let store = CardStore::from_entries(vec![entry("a"), entry("b"), entry("c")]);
        let mut ids = vec![2, 0, 1];
        ids.sort_by(|a, b| store.ordering(*a, *b));
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn test_apply_outcome_replaces_all_fields() {
        let mut store = CardStore::from_entries(vec![entry("agree")]);
        let now = Utc::now();
        let outcome = Schedule {
            due: Some(now + Duration::days(1)),
            stability: 1.0,
            difficulty: 2.5,
            elapsed_days: 0,
            scheduled_days: 1,
            reps: 1,
            lapses: 0,
            state: CardState::Learning,
            last_review: Some(now),
        };
        store.apply_scheduler_outcome(0, outcome.clone()).unwrap();
        assert_eq!(store.get(0).unwrap().schedule, outcome);

        assert!(store.apply_scheduler_outcome(4, outcome).is_err());
    }

    #[test]
    fn test_stats() {
        let now = Utc::now();
        let store = CardStore::from_cards(vec![
            card_with(0, None, CardState::New),
            card_with(1, Some(now - Duration::hours(1)), CardState::Learning),
            card_with(2, Some(now + Duration::days(3)), CardState::Review),
            card_with(3, Some(now + Duration::days(3)), CardState::Relearning),
        ])
        .unwrap();

        let stats = store.stats(now);
        assert_eq!(stats.total_cards, 4);
        assert_eq!(stats.new_cards, 1);
        assert_eq!(stats.learning_cards, 1);
        assert_eq!(stats.review_cards, 2);
        assert_eq!(stats.due_cards, 2);
    }
}
