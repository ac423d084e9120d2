//! Flashcards and spaced repetition scheduling
//!
//! This module provides:
//! - Card data model with its scheduling fields
//! - The in-memory card store and its due/state ordering
//! - The scheduler contract plus a default SM-2 scheduler
//! - Tab-separated notes import

pub mod algorithm;
pub mod import;
pub mod models;
pub mod store;

pub use algorithm::{Scheduler, SchedulerError, Sm2Scheduler};
pub use models::*;
pub use store::{compare_cards, CardStore};
