//! Study sessions
//!
//! This module provides:
//! - Session and history record models
//! - The session builder (which cards go into a sitting)
//! - The session engine state machine (serve, rate, complete)
//! - The record keeper (append-only history)

pub mod builder;
pub mod engine;
pub mod models;
pub mod records;

pub use builder::SessionBuilder;
pub use engine::{Ack, NextCard, SeedOutcome, SessionEngine, SharedEngine};
pub use models::{IdSet, Record, RecordSummary, Session};
pub use records::RecordKeeper;
