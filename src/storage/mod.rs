//! Key-value persistence for cards, history and the resumable session
//!
//! Every durable blob lives under one of three keys. The engine never talks
//! to a concrete store, only to a [`PersistenceGateway`].

mod file_storage;
mod gateway;

pub use file_storage::{FileGateway, StorageError};
pub use gateway::{MemoryGateway, PersistenceGateway};

/// Serialized card list
pub const FLASHCARDS_KEY: &str = "flashcards";
/// Serialized history of completed sessions
pub const RECORDS_KEY: &str = "records";
/// Serialized active session, absent when the engine is idle
pub const CURRENT_SESSION_KEY: &str = "currentSession";

pub type Result<T> = std::result::Result<T, StorageError>;
