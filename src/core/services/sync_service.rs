//! Exactly-once export bookkeeping toward the accounting collaborator.

use crate::core::clock::Clock;
use crate::domain::book::ShiftBook;
use crate::domain::sync::{SyncKey, SyncRecord, SyncStatus};
use crate::errors::{EngineError, Result};

/// Result of a registration attempt. `dispatch` is false when a prior
/// successful export exists, so the caller must not re-send.
#[derive(Debug, Clone)]
pub struct SyncRegistration {
    pub record: SyncRecord,
    pub dispatch: bool,
}

/// Guards against duplicate accounting submissions. The network call itself
/// belongs to the collaborator; only the uniqueness gate and the recorded
/// outcome live here.
pub struct SyncService;

impl SyncService {
    /// Registers an export intent for the (date, shift type, venue) key.
    /// An existing successful record is returned untouched; failed or
    /// pending records are re-armed in place for another attempt.
    pub fn register_sync(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        key: SyncKey,
        payload: serde_json::Value,
    ) -> Result<SyncRegistration> {
        let now = clock.now();
        if let Some(existing) = book.sync_record_mut(&key) {
            if existing.status == SyncStatus::Success {
                tracing::debug!(venue = %key.venue, date = %key.date, "sync already succeeded, skipping");
                return Ok(SyncRegistration {
                    record: existing.clone(),
                    dispatch: false,
                });
            }
            existing.reset_pending(payload, now);
            let record = existing.clone();
            book.touch();
            return Ok(SyncRegistration {
                record,
                dispatch: true,
            });
        }
        let record = SyncRecord::new(key, payload, now);
        book.add_sync_record(record.clone());
        Ok(SyncRegistration {
            record,
            dispatch: true,
        })
    }

    /// Records a successful dispatch reported by the collaborator.
    pub fn mark_success(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        key: &SyncKey,
        response: Option<String>,
    ) -> Result<SyncRecord> {
        let now = clock.now();
        let record = book
            .sync_record_mut(key)
            .ok_or_else(|| no_record(key))?;
        record.mark_success(response, now);
        let updated = record.clone();
        book.touch();
        Ok(updated)
    }

    /// Records a failed dispatch; a later `register_sync` may retry it.
    pub fn mark_failed(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        key: &SyncKey,
        error: impl Into<String>,
    ) -> Result<SyncRecord> {
        let now = clock.now();
        let record = book
            .sync_record_mut(key)
            .ok_or_else(|| no_record(key))?;
        record.mark_failed(error, now);
        let updated = record.clone();
        book.touch();
        Ok(updated)
    }
}

fn no_record(key: &SyncKey) -> EngineError {
    EngineError::InvalidInput(format!(
        "no sync record for {} / {} / {}",
        key.date, key.shift_type, key.venue
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SystemClock;
    use crate::domain::common::Venue;
    use crate::domain::shift::ShiftType;
    use chrono::NaiveDate;
    use serde_json::json;

    fn key() -> SyncKey {
        SyncKey::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ShiftType::Morning,
            Venue::new("Рио"),
        )
    }

    #[test]
    fn success_makes_registration_idempotent() {
        let mut book = ShiftBook::new("sync");
        let first =
            SyncService::register_sync(&mut book, &SystemClock, key(), json!({"revenue": 100}))
                .unwrap();
        assert!(first.dispatch);
        SyncService::mark_success(&mut book, &SystemClock, &key(), Some("ok".into())).unwrap();

        let second =
            SyncService::register_sync(&mut book, &SystemClock, key(), json!({"revenue": 999}))
                .unwrap();
        assert!(!second.dispatch);
        assert_eq!(second.record.id, first.record.id);
        assert_eq!(second.record.payload, json!({"revenue": 100}));
        assert_eq!(book.sync_records.len(), 1);
    }

    #[test]
    fn failed_registration_is_rearmed_in_place() {
        let mut book = ShiftBook::new("sync");
        let first =
            SyncService::register_sync(&mut book, &SystemClock, key(), json!({"try": 1})).unwrap();
        SyncService::mark_failed(&mut book, &SystemClock, &key(), "timeout").unwrap();

        let retry =
            SyncService::register_sync(&mut book, &SystemClock, key(), json!({"try": 2})).unwrap();
        assert!(retry.dispatch);
        assert_eq!(retry.record.id, first.record.id);
        assert_eq!(retry.record.status, SyncStatus::Pending);
        assert_eq!(retry.record.payload, json!({"try": 2}));
        assert!(retry.record.error.is_none());
        assert_eq!(book.sync_records.len(), 1);
    }

    #[test]
    fn different_slots_get_distinct_records() {
        let mut book = ShiftBook::new("sync");
        SyncService::register_sync(&mut book, &SystemClock, key(), json!({})).unwrap();
        let evening = SyncKey::new(key().date, ShiftType::Evening, key().venue);
        SyncService::register_sync(&mut book, &SystemClock, evening, json!({})).unwrap();
        assert_eq!(book.sync_records.len(), 2);
    }

    #[test]
    fn outcome_for_unknown_key_is_rejected() {
        let mut book = ShiftBook::new("sync");
        let err = SyncService::mark_success(&mut book, &SystemClock, &key(), None)
            .expect_err("unknown key must fail");
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
