//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sequential card identifier, assigned once at first load
pub type CardId = u32;

/// Lifecycle stage of a card in the spaced repetition system.
///
/// Written as a lowercase name. Reads also accept the integer codes 0 to 3
/// (new, learning, review, relearning) found in older card files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CardState {
    /// Never reviewed
    #[default]
    New,
    /// In initial learning phase
    Learning,
    /// Regular spaced review
    Review,
    /// Failed and re-learning
    Relearning,
}

impl CardState {
    /// Tie-break rank used when two cards share a due timestamp
    pub fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Learning => 1,
            Self::Review => 2,
            Self::Relearning => 3,
        }
    }

    fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::New),
            1 => Some(Self::Learning),
            2 => Some(Self::Review),
            3 => Some(Self::Relearning),
            _ => None,
        }
    }
}

impl FromStr for CardState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "learning" => Ok(Self::Learning),
            "review" => Ok(Self::Review),
            "relearning" => Ok(Self::Relearning),
            other => Err(format!("unknown card state '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for CardState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Token {
            Code(u64),
            Name(String),
        }

        match Token::deserialize(deserializer)? {
            Token::Code(code) => Self::from_code(code).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown card state code {}", code))
            }),
            Token::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Learner feedback on recall quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Parse a submitted rating where `skip`, `none` or `0` stand for "looked
    /// at the card without rating it".
    pub fn parse_submitted(input: &str) -> Result<Option<Rating>, String> {
        match input.trim().to_lowercase().as_str() {
            "skip" | "none" | "0" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" | "1" => Ok(Self::Again),
            "hard" | "2" => Ok(Self::Hard),
            "good" | "3" => Ok(Self::Good),
            "easy" | "4" => Ok(Self::Easy),
            other => Err(format!("unknown rating '{}'", other)),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        };
        f.write_str(label)
    }
}

/// Scheduling fields of a card.
///
/// Only ever replaced as a whole with the outcome produced by a scheduler, so
/// a card is never left with a mix of old and new values.
///
/// Card files written by the earlier app load as is: `elapsed`, `scheduled`
/// and `last_review` are read as aliases, `state` may be an integer code and
/// a year-one zero time reads as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// `None` until the card is first scheduled
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default, alias = "elapsed")]
    pub elapsed_days: u64,
    #[serde(default, alias = "scheduled")]
    pub scheduled_days: u64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    #[serde(default)]
    pub state: CardState,
    /// `None` when the card was never reviewed
    #[serde(
        default,
        alias = "last_review",
        deserialize_with = "deserialize_timestamp"
    )]
    pub last_review: Option<DateTime<Utc>>,
}

/// Accepts null, a missing field, or the year-one "zero time" written by
/// older exports, all meaning "unset".
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|t| t.year() > 1))
}

/// A pronunciation flashcard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub word: String,
    /// Phonetic transcription
    #[serde(default)]
    pub ipa: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: String,
    #[serde(flatten)]
    pub schedule: Schedule,
}

impl Card {
    pub fn new(id: CardId, entry: BootstrapEntry) -> Self {
        Self {
            id,
            word: entry.word,
            ipa: entry.ipa,
            definition: entry.definition,
            example: entry.example,
            schedule: Schedule::default(),
        }
    }

    /// A card counts as new until it has a due date
    pub fn is_new(&self) -> bool {
        self.schedule.due.is_none()
    }

    /// Check if the card is due for review
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.schedule.due.map_or(true, |due| due <= now)
    }
}

/// Card content as delivered by a bootstrap source or a notes import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapEntry {
    pub word: String,
    #[serde(default)]
    pub ipa: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: String,
}

/// Statistics over the whole card pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub due_cards: usize,
}
