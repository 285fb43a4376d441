use thiserror::Error;
use uuid::Uuid;

use crate::domain::actor::{ActorId, Capability};

/// Unified error type for engine, domain, and storage layers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("shift already open for {venue} / {shift_type}")]
    ShiftAlreadyOpen { venue: String, shift_type: String },
    #[error("shift not found: {0}")]
    ShiftNotFound(Uuid),
    #[error("shift already closed: {0}")]
    ShiftAlreadyClosed(Uuid),
    #[error("shift {0} is closed and no longer accepts writes")]
    ShiftClosed(Uuid),
    #[error("checklist incomplete for shift {shift_id}: {} required item(s) outstanding", .outstanding.len())]
    ChecklistIncomplete {
        shift_id: Uuid,
        outstanding: Vec<Uuid>,
    },
    #[error("item {item_id} is not part of the checklist for shift {shift_id}")]
    UnknownItem { shift_id: Uuid, item_id: Uuid },
    #[error("checklist already initialized for shift {0}")]
    AlreadyInitialized(Uuid),
    #[error("actor {actor} lacks the {capability:?} capability")]
    CapabilityDenied {
        actor: ActorId,
        capability: Capability,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Persistence(err.to_string())
    }
}
