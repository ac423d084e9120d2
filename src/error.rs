//! Error types shared by the session engine and its collaborators

use serde::Serialize;
use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::flashcards::SchedulerError;
use crate::storage::StorageError;

/// Coarse classification of an [`EngineError`], stable across versions and
/// reported to callers at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    NotFound,
    State,
    Scheduler,
    Storage,
    Codec,
    Bootstrap,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    State(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::State(_) => ErrorKind::State,
            Self::Scheduler(_) => ErrorKind::Scheduler,
            Self::Storage(StorageError::NotFound(_)) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Codec(_) => ErrorKind::Codec,
            Self::Bootstrap(_) => ErrorKind::Bootstrap,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
