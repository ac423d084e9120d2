//! Scheduling contract and the default SM-2 scheduler
//!
//! The session engine only sees the [`Scheduler`] trait: given a card's
//! current scheduling fields and the review time, a scheduler projects the
//! outcome of every possible rating. [`Sm2Scheduler`] is the SuperMemo 2
//! implementation shipped with the CLI. It keeps the ease factor in
//! `difficulty` and the interval (days) in `stability` and `scheduledDays`.
//!
//! Quality mapping used by SM-2:
//! - Again: 1 (incorrect, but recognized)
//! - Hard: 3 (correct with difficulty)
//! - Good: 4 (correct with hesitation)
//! - Easy: 5 (perfect)

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::models::{CardState, Rating, Schedule};

/// Minimum ease factor allowed
const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor given to cards that were never scheduled
const DEFAULT_EASE_FACTOR: f64 = 2.5;

const DEFAULT_LEARNING_STEP_MINUTES: i64 = 10;

/// Longest interval the scheduler will hand out (about a century)
const MAX_INTERVAL_DAYS: u64 = 36_500;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("scheduler produced no outcome for rating {0}")]
    MissingOutcome(Rating),

    #[error("scheduler failed: {0}")]
    Failed(String),
}

/// One projected schedule per rating
pub type ScheduledOutcomes = HashMap<Rating, Schedule>;

/// External spaced-repetition algorithm. Must be a pure function of its
/// inputs.
pub trait Scheduler: Send + Sync {
    fn repeat(
        &self,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<ScheduledOutcomes, SchedulerError>;
}

/// SuperMemo 2 with a short learning step for failed cards
#[derive(Debug, Clone)]
pub struct Sm2Scheduler {
    learning_step: Duration,
}

impl Default for Sm2Scheduler {
    fn default() -> Self {
        Self {
            learning_step: Duration::minutes(DEFAULT_LEARNING_STEP_MINUTES),
        }
    }
}

impl Sm2Scheduler {
    pub fn new(learning_step: Duration) -> Self {
        Self { learning_step }
    }

    fn quality(rating: Rating) -> i32 {
        match rating {
            Rating::Again => 1,
            Rating::Hard => 3,
            Rating::Good => 4,
            Rating::Easy => 5,
        }
    }

    /// Calculate the next schedule for one rating
    fn next_schedule(
        &self,
        current: &Schedule,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<Schedule, SchedulerError> {
        let quality = Self::quality(rating);
        let mut ease_factor = if current.difficulty > 0.0 {
            current.difficulty
        } else {
            DEFAULT_EASE_FACTOR
        };
        let elapsed_days = current
            .last_review
            .map(|last| (now - last).num_days().max(0) as u64)
            .unwrap_or(0);

        let mut lapses = current.lapses;
        let interval: u64;
        let state;
        let due;

        if quality >= 3 {
            // scheduled_days doubles as the SM-2 repetition counter:
            // 0 after a lapse or for a fresh card, 1 after the first pass
            interval = match current.scheduled_days {
                0 => 1,
                1 => 6,
                days => (days as f64 * ease_factor)
                    .round()
                    .min(MAX_INTERVAL_DAYS as f64) as u64,
            }
            .min(MAX_INTERVAL_DAYS);
            state = match (current.state, current.scheduled_days) {
                (CardState::New | CardState::Learning, 0) => CardState::Learning,
                _ => CardState::Review,
            };

            // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
            let q = (5 - quality) as f64;
            ease_factor = (ease_factor + (0.1 - q * (0.08 + q * 0.02))).max(MIN_EASE_FACTOR);
            due = now.checked_add_signed(Duration::days(interval as i64));
        } else {
            interval = 0;
            ease_factor = (ease_factor - 0.2).max(MIN_EASE_FACTOR);
            state = match current.state {
                CardState::Review | CardState::Relearning => CardState::Relearning,
                CardState::New | CardState::Learning => CardState::Learning,
            };
            if current.state == CardState::Review {
                lapses += 1;
            }
            due = now.checked_add_signed(self.learning_step);
        }
        let due = due.ok_or_else(|| {
            SchedulerError::Failed(format!("due date out of range for rating {}", rating))
        })?;

        Ok(Schedule {
            due: Some(due),
            stability: interval as f64,
            difficulty: ease_factor,
            elapsed_days,
            scheduled_days: interval,
            reps: current.reps + 1,
            lapses,
            state,
            last_review: Some(now),
        })
    }
}

impl Scheduler for Sm2Scheduler {
    fn repeat(
        &self,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<ScheduledOutcomes, SchedulerError> {
        Rating::ALL
            .iter()
            .map(|&rating| Ok((rating, self.next_schedule(schedule, rating, now)?)))
            .collect()
    }
}

/// Time until the card would be due again, for each rating.
/// Used to show users what each rating would do.
pub fn preview_intervals(
    scheduler: &dyn Scheduler,
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> Result<Vec<(Rating, Duration)>, SchedulerError> {
    let outcomes = scheduler.repeat(schedule, now)?;
    Rating::ALL
        .iter()
        .map(|&rating| {
            let outcome = outcomes
                .get(&rating)
                .ok_or(SchedulerError::MissingOutcome(rating))?;
            let wait = outcome.due.map(|due| due - now).unwrap_or_else(Duration::zero);
            Ok((rating, wait))
        })
        .collect()
}

/// Format an interval to a short human-readable string
pub fn format_interval(interval: Duration) -> String {
    let minutes = interval.num_minutes();
    let days = interval.num_days();
    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if days < 1 {
        format!("{}h", interval.num_hours())
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(schedule: &Schedule, rating: Rating) -> Schedule {
        let now = Utc::now();
        let outcomes = Sm2Scheduler::default().repeat(schedule, now).unwrap();
        outcomes[&rating].clone()
    }

    #[test]
    fn test_projects_every_rating() {
        let outcomes = Sm2Scheduler::default()
            .repeat(&Schedule::default(), Utc::now())
            .unwrap();
        assert_eq!(outcomes.len(), 4);
        for rating in Rating::ALL {
            assert!(outcomes.contains_key(&rating));
        }
    }

    #[test]
    fn test_first_review_correct() {
        let result = project(&Schedule::default(), Rating::Good);

        assert_eq!(result.scheduled_days, 1);
        assert_eq!(result.state, CardState::Learning);
        assert_eq!(result.reps, 1);
        assert!(result.last_review.is_some());
    }

    #[test]
    fn test_second_review_correct() {
        let current = Schedule {
            scheduled_days: 1,
            reps: 1,
            difficulty: 2.5,
            state: CardState::Learning,
            ..Default::default()
        };

        let result = project(&current, Rating::Good);

        assert_eq!(result.scheduled_days, 6);
        assert_eq!(result.state, CardState::Review);
    }

    #[test]
    fn test_subsequent_review_correct() {
        let current = Schedule {
            scheduled_days: 10,
            reps: 5,
            difficulty: 2.5,
            state: CardState::Review,
            ..Default::default()
        };

        let result = project(&current, Rating::Good);

        // 10 * 2.5 = 25
        assert_eq!(result.scheduled_days, 25);
        assert_eq!(result.stability, 25.0);
    }

    #[test]
    fn test_review_incorrect_relearns_soon() {
        let now = Utc::now();
        let current = Schedule {
            scheduled_days: 30,
            reps: 5,
            difficulty: 2.5,
            state: CardState::Review,
            ..Default::default()
        };

        let outcomes = Sm2Scheduler::default().repeat(&current, now).unwrap();
        let result = &outcomes[&Rating::Again];

        assert_eq!(result.scheduled_days, 0);
        assert_eq!(result.state, CardState::Relearning);
        assert_eq!(result.lapses, 1);
        assert_eq!(result.due, Some(now + Duration::minutes(10)));
    }

    #[test]
    fn test_long_interval_is_capped() {
        let now = Utc::now();
        let current = Schedule {
            scheduled_days: 40_000_000,
            reps: 90,
            difficulty: 2.5,
            state: CardState::Review,
            ..Default::default()
        };

        let outcomes = Sm2Scheduler::default().repeat(&current, now).unwrap();
        let result = &outcomes[&Rating::Easy];

        assert_eq!(result.scheduled_days, MAX_INTERVAL_DAYS);
        assert_eq!(
            result.due,
            Some(now + Duration::days(MAX_INTERVAL_DAYS as i64))
        );
    }

    #[test]
    fn test_due_out_of_range_is_an_error() {
        let scheduler = Sm2Scheduler::new(Duration::days(1));
        let result = scheduler.repeat(&Schedule::default(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(SchedulerError::Failed(_))));
    }

    #[test]
    fn test_ease_factor_minimum() {
        let current = Schedule {
            difficulty: 1.4,
            scheduled_days: 10,
            reps: 5,
            state: CardState::Review,
            ..Default::default()
        };

        // Multiple incorrect responses should not go below minimum
        let result = project(&current, Rating::Again);
        assert!(result.difficulty >= MIN_EASE_FACTOR);

        let result2 = project(&result, Rating::Again);
        assert!(result2.difficulty >= MIN_EASE_FACTOR);
    }

    #[test]
    fn test_preview_intervals() {
        let now = Utc::now();
        let preview = preview_intervals(&Sm2Scheduler::default(), &Schedule::default(), now).unwrap();
        assert_eq!(preview[0], (Rating::Again, Duration::minutes(10)));
        assert_eq!(preview[2], (Rating::Good, Duration::days(1)));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::seconds(20)), "now");
        assert_eq!(format_interval(Duration::minutes(10)), "10m");
        assert_eq!(format_interval(Duration::hours(5)), "5h");
        assert_eq!(format_interval(Duration::days(1)), "1d");
        assert_eq!(format_interval(Duration::days(5)), "5d");
        assert_eq!(format_interval(Duration::days(7)), "1w");
        assert_eq!(format_interval(Duration::days(14)), "2w");
        assert_eq!(format_interval(Duration::days(30)), "1mo");
        assert_eq!(format_interval(Duration::days(90)), "3mo");
        assert_eq!(format_interval(Duration::days(365)), "1y");
        assert_eq!(format_interval(Duration::days(730)), "2y");
    }
}
