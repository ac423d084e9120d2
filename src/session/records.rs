//! Session history
//!
//! Completing a session writes two blobs (history, then cards) and clears
//! the resumable session slot. The writes are not atomic together; a crash
//! in between leaves a record whose card updates were not persisted.

use chrono::{DateTime, Utc};

use super::models::{Record, Session};
use crate::error::{EngineError, Result};
use crate::flashcards::CardStore;
use crate::storage::{PersistenceGateway, StorageError, CURRENT_SESSION_KEY, FLASHCARDS_KEY, RECORDS_KEY};

/// Append-only history of completed sessions
#[derive(Debug, Clone, Default)]
pub struct RecordKeeper {
    records: Vec<Record>,
}

impl RecordKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load history from the gateway; a missing key means no history yet
    pub fn load(gateway: &dyn PersistenceGateway) -> Result<Self> {
        match gateway.get(RECORDS_KEY) {
            Ok(bytes) => {
                let records: Vec<Record> = serde_json::from_slice(&bytes)?;
                Ok(Self { records })
            }
            Err(StorageError::NotFound(_)) => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Result<&Record> {
        self.records
            .get(id)
            .ok_or_else(|| EngineError::NotFound(format!("record {}", id)))
    }

    /// Turn a finished session into a history entry and persist everything.
    ///
    /// The record is appended before any write is attempted. Every write is
    /// attempted even if an earlier one fails; the first failure is returned.
    pub fn complete(
        &mut self,
        session: Session,
        store: &CardStore,
        gateway: &dyn PersistenceGateway,
        now: DateTime<Utc>,
    ) -> std::result::Result<Record, (Record, EngineError)> {
        let record = Record {
            id: self.records.len(),
            card_ids: session.cards().to_vec(),
            started_at: session.started_at,
            completed_at: now,
        };
        self.records.push(record.clone());

        log::info!(
            "Completed session {} with {} cards",
            record.id,
            record.card_ids.len()
        );

        let mut first_error: Option<EngineError> = None;
        let mut note = |result: Result<()>, what: &str| {
            if let Err(e) = result {
                log::error!("Failed to persist {} after session completion: {}", what, e);
                first_error.get_or_insert(e);
            }
        };

        note(self.persist(gateway), RECORDS_KEY);
        note(
            store
                .to_bytes()
                .and_then(|bytes| Ok(gateway.set(FLASHCARDS_KEY, &bytes)?)),
            FLASHCARDS_KEY,
        );
        note(
            gateway.remove(CURRENT_SESSION_KEY).map_err(EngineError::from),
            CURRENT_SESSION_KEY,
        );

        match first_error {
            None => Ok(record),
            Some(e) => Err((record, e)),
        }
    }

    fn persist(&self, gateway: &dyn PersistenceGateway) -> Result<()> {
        let bytes = serde_json::to_vec(&self.records)?;
        gateway.set(RECORDS_KEY, &bytes)?;
        Ok(())
    }
}
