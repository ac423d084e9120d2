//! Spaced-repetition session engine for pronunciation flashcards
//!
//! Cards live in a [`CardStore`](flashcards::CardStore); a
//! [`SessionEngine`](session::SessionEngine) draws bounded study sessions out
//! of it, serves the most urgent card, feeds ratings to a pluggable
//! [`Scheduler`](flashcards::Scheduler) and records completed sessions. All
//! durable state goes through a [`PersistenceGateway`](storage::PersistenceGateway).

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod flashcards;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{EngineError, ErrorKind, Result};
pub use session::{SessionEngine, SharedEngine};
