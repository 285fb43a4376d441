use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, Venue};
use crate::domain::shift::ShiftType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

/// Uniqueness key for export records: one row per (date, shift type, venue).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub venue: Venue,
}

impl SyncKey {
    pub fn new(date: NaiveDate, shift_type: ShiftType, venue: Venue) -> Self {
        Self {
            date,
            shift_type,
            venue,
        }
    }
}

/// Exactly-once export marker toward the accounting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub venue: Venue,
    pub status: SyncStatus,
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncRecord {
    pub fn new(key: SyncKey, payload: serde_json::Value, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: key.date,
            shift_type: key.shift_type,
            venue: key.venue,
            status: SyncStatus::Pending,
            payload,
            response: None,
            error: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn key(&self) -> SyncKey {
        SyncKey::new(self.date, self.shift_type, self.venue.clone())
    }

    pub fn mark_success(&mut self, response: Option<String>, as_of: DateTime<Utc>) {
        self.status = SyncStatus::Success;
        self.response = response;
        self.error = None;
        self.updated_at = as_of;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>, as_of: DateTime<Utc>) {
        self.status = SyncStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = as_of;
    }

    /// Re-arms a failed or stale registration for another dispatch attempt.
    pub fn reset_pending(&mut self, payload: serde_json::Value, as_of: DateTime<Utc>) {
        self.status = SyncStatus::Pending;
        self.payload = payload;
        self.error = None;
        self.updated_at = as_of;
    }
}

impl Identifiable for SyncRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}
