//! Typed request/response boundary for driving an engine over JSON
//!
//! Requests are validated into a [`Command`] before the engine is touched, so
//! a malformed id or rating never causes a partial mutation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, ErrorKind, Result};
use crate::flashcards::{CardId, Rating};
use crate::session::{NextCard, RecordSummary, SessionEngine};

/// Raw request as it arrives on the wire, tagged by `op`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EngineRequest {
    Start {
        #[serde(default, rename = "targetSize")]
        target_size: Option<i64>,
    },
    Next,
    Submit {
        #[serde(rename = "cardId")]
        card_id: i64,
        /// Rating name, `1..=4`, or null / `0` / `"skip"` for no rating
        #[serde(default)]
        rating: Option<RatingInput>,
    },
    Discard,
    Stats,
    History,
    Record {
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Number(i64),
    Text(String),
}

/// A request whose values have been checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(usize),
    Next,
    Submit(CardId, Option<Rating>),
    Discard,
    Stats,
    History,
    Record(usize),
}

impl Command {
    pub fn from_request(request: EngineRequest, default_target: usize) -> Result<Self> {
        let command = match request {
            EngineRequest::Start { target_size } => {
                let size = match target_size {
                    None => default_target,
                    Some(n) if n >= 1 => usize::try_from(n)
                        .map_err(|_| EngineError::Validation(format!("target size {} too large", n)))?,
                    Some(n) => {
                        return Err(EngineError::Validation(format!(
                            "target size must be at least 1, got {}",
                            n
                        )))
                    }
                };
                Self::Start(size)
            }
            EngineRequest::Next => Self::Next,
            EngineRequest::Submit { card_id, rating } => {
                let card_id = CardId::try_from(card_id)
                    .map_err(|_| EngineError::Validation(format!("invalid card id {}", card_id)))?;
                let rating = match rating {
                    None => None,
                    Some(RatingInput::Number(n)) => Rating::parse_submitted(&n.to_string())
                        .map_err(EngineError::Validation)?,
                    Some(RatingInput::Text(text)) => {
                        Rating::parse_submitted(&text).map_err(EngineError::Validation)?
                    }
                };
                Self::Submit(card_id, rating)
            }
            EngineRequest::Discard => Self::Discard,
            EngineRequest::Stats => Self::Stats,
            EngineRequest::History => Self::History,
            EngineRequest::Record { id } => {
                let id = usize::try_from(id)
                    .map_err(|_| EngineError::Validation(format!("invalid record id {}", id)))?;
                Self::Record(id)
            }
        };
        Ok(command)
    }
}

/// Success/payload/stop/error envelope returned for every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Set when `next` completed the session; the payload is the record
    pub stop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl EngineResponse {
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            stop: false,
            error: None,
            kind: None,
        }
    }

    pub fn stopped(payload: Value) -> Self {
        Self {
            stop: true,
            ..Self::ok(payload)
        }
    }

    pub fn failed(err: &EngineError) -> Self {
        Self {
            success: false,
            payload: None,
            stop: false,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }
}

impl From<Result<EngineResponse>> for EngineResponse {
    fn from(result: Result<EngineResponse>) -> Self {
        result.unwrap_or_else(|e| Self::failed(&e))
    }
}

/// Validate and run one request
pub fn dispatch(
    engine: &mut SessionEngine,
    request: EngineRequest,
    default_target: usize,
) -> EngineResponse {
    Command::from_request(request, default_target)
        .and_then(|command| execute(engine, command))
        .into()
}

/// Parse a JSON request and run it. Unparseable input is a validation error.
pub fn handle_json(engine: &mut SessionEngine, input: &str, default_target: usize) -> EngineResponse {
    match serde_json::from_str::<EngineRequest>(input) {
        Ok(request) => dispatch(engine, request, default_target),
        Err(e) => EngineResponse::failed(&EngineError::Validation(format!(
            "malformed request: {}",
            e
        ))),
    }
}

fn execute(engine: &mut SessionEngine, command: Command) -> Result<EngineResponse> {
    let response = match command {
        Command::Start(size) => {
            let session = engine.start(size)?;
            EngineResponse::ok(serde_json::to_value(session)?)
        }
        Command::Next => match engine.next()? {
            NextCard::Card(card) => EngineResponse::ok(serde_json::to_value(card)?),
            NextCard::Stop(record) => EngineResponse::stopped(serde_json::to_value(record)?),
        },
        Command::Submit(card_id, rating) => {
            let ack = engine.submit(card_id, rating)?;
            EngineResponse::ok(serde_json::to_value(ack)?)
        }
        Command::Discard => {
            let session = engine.discard()?;
            EngineResponse::ok(serde_json::json!({ "discarded": session.len() }))
        }
        Command::Stats => EngineResponse::ok(serde_json::to_value(engine.stats())?),
        Command::History => {
            let summaries: Vec<RecordSummary> =
                engine.history().iter().rev().map(RecordSummary::from).collect();
            EngineResponse::ok(serde_json::to_value(summaries)?)
        }
        Command::Record(id) => EngineResponse::ok(serde_json::to_value(engine.record(id)?)?),
    };
    Ok(response)
}
