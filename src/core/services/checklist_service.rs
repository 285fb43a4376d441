//! Per-shift checklist completion state and the closure gate.

use uuid::Uuid;

use crate::core::clock::Clock;
use crate::domain::book::ShiftBook;
use crate::domain::checklist::ChecklistProgress;
use crate::errors::{EngineError, Result};

/// Completion summary for one shift. Required items gate closure;
/// non-required items only inform the reminder collaborator.
#[derive(Debug, Clone)]
pub struct CompletionState {
    pub checked_count: usize,
    pub total_count: usize,
    pub all_required_checked: bool,
    pub outstanding_required: Vec<Uuid>,
}

impl CompletionState {
    /// Whole-percent completion across all applicable items.
    pub fn percent(&self) -> u8 {
        if self.total_count == 0 {
            return 100;
        }
        ((self.checked_count * 100) / self.total_count) as u8
    }
}

pub struct ChecklistService;

impl ChecklistService {
    /// Seeds one unchecked progress row per applicable item. Called once at
    /// shift open; a second call for the same shift is an error.
    pub fn initialize(book: &mut ShiftBook, shift_id: Uuid, item_ids: &[Uuid]) -> Result<()> {
        if book.shift(shift_id).is_none() {
            return Err(EngineError::ShiftNotFound(shift_id));
        }
        if book.has_progress(shift_id) {
            return Err(EngineError::AlreadyInitialized(shift_id));
        }
        for item_id in item_ids {
            book.add_progress(ChecklistProgress::new(shift_id, *item_id));
        }
        Ok(())
    }

    /// Checks off one item, stamping the check time and any note or
    /// attachment reference supplied by the capture collaborator.
    pub fn mark_checked(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        shift_id: Uuid,
        item_id: Uuid,
        note: Option<String>,
        attachment: Option<String>,
    ) -> Result<()> {
        let shift = book
            .shift(shift_id)
            .ok_or(EngineError::ShiftNotFound(shift_id))?;
        if shift.is_closed() {
            return Err(EngineError::ShiftClosed(shift_id));
        }
        let now = clock.now();
        let row = book
            .progress_entry_mut(shift_id, item_id)
            .ok_or(EngineError::UnknownItem { shift_id, item_id })?;
        row.mark(now, note, attachment);
        book.touch();
        Ok(())
    }

    /// Completion counts plus the outstanding required item ids.
    pub fn completion(book: &ShiftBook, shift_id: Uuid) -> Result<CompletionState> {
        if book.shift(shift_id).is_none() {
            return Err(EngineError::ShiftNotFound(shift_id));
        }
        let mut checked_count = 0;
        let mut total_count = 0;
        let mut outstanding_required = Vec::new();
        for row in book.progress_for(shift_id) {
            total_count += 1;
            if row.checked {
                checked_count += 1;
                continue;
            }
            let required = book
                .item(row.item_id)
                .map(|item| item.required)
                .unwrap_or(false);
            if required {
                outstanding_required.push(row.item_id);
            }
        }
        Ok(CompletionState {
            checked_count,
            total_count,
            all_required_checked: outstanding_required.is_empty(),
            outstanding_required,
        })
    }

    /// The closure gate: true once every required item is checked.
    pub fn can_close(book: &ShiftBook, shift_id: Uuid) -> Result<bool> {
        Ok(Self::completion(book, shift_id)?.all_required_checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SystemClock;
    use crate::domain::actor::ActorId;
    use crate::domain::checklist::ChecklistItem;
    use crate::domain::common::Venue;
    use crate::domain::shift::{RegisterBalances, Shift, ShiftType};
    use chrono::{NaiveDate, Utc};

    fn book_with_open_shift(items: Vec<ChecklistItem>) -> (ShiftBook, Uuid) {
        let mut book = ShiftBook::new("checklist");
        let item_ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        for item in items {
            book.add_item(item);
        }
        let shift = Shift::new(
            Venue::new("Рио"),
            ShiftType::Morning,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ActorId(1),
            Utc::now(),
            RegisterBalances::default(),
        );
        let shift_id = book.add_shift(shift);
        ChecklistService::initialize(&mut book, shift_id, &item_ids).unwrap();
        (book, shift_id)
    }

    #[test]
    fn double_initialize_is_rejected() {
        let (mut book, shift_id) =
            book_with_open_shift(vec![ChecklistItem::new("opening", "Lights", 1)]);
        let err = ChecklistService::initialize(&mut book, shift_id, &[])
            .expect_err("second initialize must fail");
        assert!(matches!(err, EngineError::AlreadyInitialized(id) if id == shift_id));
    }

    #[test]
    fn required_items_gate_closure() {
        let required = ChecklistItem::new("closing", "Count drawer", 1).require();
        let required_id = required.id;
        let optional = ChecklistItem::new("closing", "Water plants", 2);
        let (mut book, shift_id) = book_with_open_shift(vec![required, optional]);

        let state = ChecklistService::completion(&book, shift_id).unwrap();
        assert_eq!(state.total_count, 2);
        assert_eq!(state.outstanding_required, vec![required_id]);
        assert!(!state.all_required_checked);

        ChecklistService::mark_checked(&mut book, &SystemClock, shift_id, required_id, None, None)
            .unwrap();
        let state = ChecklistService::completion(&book, shift_id).unwrap();
        assert!(state.all_required_checked);
        assert_eq!(state.checked_count, 1);
        assert_eq!(state.percent(), 50);
        assert!(ChecklistService::can_close(&book, shift_id).unwrap());
    }

    #[test]
    fn unknown_item_is_rejected() {
        let (mut book, shift_id) =
            book_with_open_shift(vec![ChecklistItem::new("opening", "Lights", 1)]);
        let err = ChecklistService::mark_checked(
            &mut book,
            &SystemClock,
            shift_id,
            Uuid::new_v4(),
            None,
            None,
        )
        .expect_err("foreign item must be rejected");
        assert!(matches!(err, EngineError::UnknownItem { .. }));
    }

    #[test]
    fn empty_checklist_reports_complete() {
        let (book, shift_id) = book_with_open_shift(Vec::new());
        let state = ChecklistService::completion(&book, shift_id).unwrap();
        assert_eq!(state.total_count, 0);
        assert!(state.all_required_checked);
        assert_eq!(state.percent(), 100);
    }
}
