//! Shift lifecycle orchestration: open, close, and in-shift cash writes.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::services::{CashService, CatalogService, ChecklistService};
use crate::domain::actor::{Actor, Capability, CapabilitySet};
use crate::domain::book::ShiftBook;
use crate::domain::common::Venue;
use crate::domain::movement::Register;
use crate::domain::shift::{
    ClosingSnapshot, DeclaredRevenue, RegisterBalances, Shift, ShiftPhase, ShiftType,
};
use crate::errors::{EngineError, Result};
use crate::money::Money;

pub struct ShiftService;

impl ShiftService {
    /// Opens a shift for the (venue, shift type) slot: snapshots opening
    /// balances for both registers and seeds the checklist from the catalog.
    /// At most one open shift may exist per slot at any time.
    pub fn open_shift(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        actor: &Actor,
        venue: Venue,
        shift_type: ShiftType,
        shift_date: NaiveDate,
    ) -> Result<Uuid> {
        require_capability(actor, Capability::ManageShifts)?;
        if book.open_shift_for(&venue, shift_type).is_some() {
            return Err(EngineError::ShiftAlreadyOpen {
                venue: venue.to_string(),
                shift_type: shift_type.to_string(),
            });
        }
        let now = clock.now();
        let opening = RegisterBalances::new(
            CashService::balance_as_of(book, &venue, Register::Official, None),
            CashService::balance_as_of(book, &venue, Register::Box, None),
        );
        let item_ids: Vec<Uuid> = CatalogService::applicable_items(book, &venue, shift_type)
            .iter()
            .map(|item| item.id)
            .collect();
        let shift = Shift::new(venue.clone(), shift_type, shift_date, actor.id, now, opening);
        let shift_id = book.add_shift(shift);
        ChecklistService::initialize(book, shift_id, &item_ids)?;
        tracing::info!(%venue, %shift_type, %shift_date, %shift_id, "shift opened");
        Ok(shift_id)
    }

    /// Closes a shift: requires every required checklist item checked,
    /// snapshots closing balances as of now, and commits the full closing
    /// record in one step. A failed attempt leaves the shift open and the
    /// book untouched.
    pub fn close_shift(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        shift_id: Uuid,
        actor: &Actor,
        declared: DeclaredRevenue,
    ) -> Result<ClosingSnapshot> {
        require_capability(actor, Capability::ManageShifts)?;
        let venue = {
            let shift = book
                .shift(shift_id)
                .ok_or(EngineError::ShiftNotFound(shift_id))?;
            if shift.is_closed() {
                return Err(EngineError::ShiftAlreadyClosed(shift_id));
            }
            shift.venue.clone()
        };
        let completion = ChecklistService::completion(book, shift_id)?;
        if !completion.all_required_checked {
            return Err(EngineError::ChecklistIncomplete {
                shift_id,
                outstanding: completion.outstanding_required,
            });
        }
        let now = clock.now();
        let closing = RegisterBalances::new(
            CashService::balance_as_of(book, &venue, Register::Official, Some(now)),
            CashService::balance_as_of(book, &venue, Register::Box, Some(now)),
        );
        let shift = book
            .shift_mut(shift_id)
            .ok_or(EngineError::ShiftNotFound(shift_id))?;
        shift.close(now, declared, closing, actor.id);
        let snapshot = snapshot_of(shift)?;
        book.touch();
        tracing::info!(
            venue = %snapshot.venue,
            shift_type = %snapshot.shift_type,
            %shift_id,
            declared_total = %snapshot.declared_total(),
            "shift closed"
        );
        Ok(snapshot)
    }

    /// Records an expense against the live shift as a negative movement.
    /// The box register is working cash and demands the cash-handling
    /// capability.
    pub fn record_expense(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        shift_id: Uuid,
        register: Register,
        amount: Money,
        reason: &str,
        actor: &Actor,
    ) -> Result<Uuid> {
        match register {
            Register::Box => require_capability(actor, Capability::HandleCash)?,
            Register::Official => require_capability(actor, Capability::ManageShifts)?,
        }
        if amount <= Money::ZERO {
            return Err(EngineError::InvalidInput(
                "expense amount must be positive".into(),
            ));
        }
        let venue = {
            let shift = book
                .shift(shift_id)
                .ok_or(EngineError::ShiftNotFound(shift_id))?;
            if shift.is_closed() {
                return Err(EngineError::ShiftClosed(shift_id));
            }
            shift.venue.clone()
        };
        CashService::apply_movement(
            book,
            clock,
            &venue,
            register,
            -amount,
            Some(shift_id),
            reason,
            actor.id,
        )
    }

    /// Derived operational phase for reminder and UI collaborators. Only
    /// `Open` and `Closed` are persisted states.
    pub fn phase(book: &ShiftBook, shift_id: Uuid) -> Result<ShiftPhase> {
        let shift = book
            .shift(shift_id)
            .ok_or(EngineError::ShiftNotFound(shift_id))?;
        if shift.is_closed() {
            return Ok(ShiftPhase::Closed);
        }
        let completion = ChecklistService::completion(book, shift_id)?;
        if completion.all_required_checked {
            Ok(ShiftPhase::Open)
        } else if completion.checked_count == 0 {
            Ok(ShiftPhase::ChecklistPending)
        } else {
            Ok(ShiftPhase::ClosingBlocked)
        }
    }

    /// Rebuilds the closing snapshot of an already-closed shift, as consumed
    /// by payroll and accounting collaborators.
    pub fn closing_snapshot(book: &ShiftBook, shift_id: Uuid) -> Result<ClosingSnapshot> {
        let shift = book
            .shift(shift_id)
            .ok_or(EngineError::ShiftNotFound(shift_id))?;
        if shift.is_open() {
            return Err(EngineError::InvalidInput(format!(
                "shift {shift_id} is still open and has no closing snapshot"
            )));
        }
        snapshot_of(shift)
    }
}

fn require_capability(actor: &Actor, capability: Capability) -> Result<()> {
    if actor.has_capability(capability) {
        Ok(())
    } else {
        Err(EngineError::CapabilityDenied {
            actor: actor.id,
            capability,
        })
    }
}

fn snapshot_of(shift: &Shift) -> Result<ClosingSnapshot> {
    let missing = || {
        EngineError::Persistence(format!(
            "closed shift {} is missing closing fields",
            shift.id
        ))
    };
    Ok(ClosingSnapshot {
        shift_id: shift.id,
        venue: shift.venue.clone(),
        shift_type: shift.shift_type,
        shift_date: shift.shift_date,
        declared: shift.declared.ok_or_else(missing)?,
        opening: shift.opening,
        closing: shift.closing.ok_or_else(missing)?,
        deltas: shift.register_deltas.ok_or_else(missing)?,
        closed_at: shift.closed_at.ok_or_else(missing)?,
        confirmed_by: shift.confirmed_by.ok_or_else(missing)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SystemClock;
    use crate::domain::actor::ActorId;
    use crate::domain::checklist::ChecklistItem;

    fn manager() -> Actor {
        Actor::new(ActorId(10))
            .with_capability(Capability::ManageShifts)
            .with_capability(Capability::HandleCash)
    }

    fn shift_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn open_rio_morning(book: &mut ShiftBook) -> Uuid {
        ShiftService::open_shift(
            book,
            &SystemClock,
            &manager(),
            Venue::new("Рио"),
            ShiftType::Morning,
            shift_date(),
        )
        .unwrap()
    }

    #[test]
    fn second_open_for_same_slot_is_rejected() {
        let mut book = ShiftBook::new("shifts");
        open_rio_morning(&mut book);
        let err = ShiftService::open_shift(
            &mut book,
            &SystemClock,
            &manager(),
            Venue::new("Рио"),
            ShiftType::Morning,
            shift_date(),
        )
        .expect_err("duplicate open must fail");
        assert!(matches!(err, EngineError::ShiftAlreadyOpen { .. }));

        // A different slot at the same venue is unaffected.
        ShiftService::open_shift(
            &mut book,
            &SystemClock,
            &manager(),
            Venue::new("Рио"),
            ShiftType::Evening,
            shift_date(),
        )
        .unwrap();
    }

    #[test]
    fn close_is_gated_on_required_items() {
        let mut book = ShiftBook::new("shifts");
        let required = ChecklistItem::new("closing", "Count drawer", 1).require();
        let required_id = required.id;
        book.add_item(required);
        let shift_id = open_rio_morning(&mut book);

        let err = ShiftService::close_shift(
            &mut book,
            &SystemClock,
            shift_id,
            &manager(),
            DeclaredRevenue::default(),
        )
        .expect_err("close with outstanding required item must fail");
        match err {
            EngineError::ChecklistIncomplete { outstanding, .. } => {
                assert_eq!(outstanding, vec![required_id]);
            }
            other => panic!("expected ChecklistIncomplete, got {other:?}"),
        }
        assert!(book.shift(shift_id).unwrap().is_open());

        ChecklistService::mark_checked(&mut book, &SystemClock, shift_id, required_id, None, None)
            .unwrap();
        let snapshot = ShiftService::close_shift(
            &mut book,
            &SystemClock,
            shift_id,
            &manager(),
            DeclaredRevenue::default(),
        )
        .unwrap();
        assert_eq!(snapshot.shift_id, shift_id);
        assert!(book.shift(shift_id).unwrap().is_closed());

        let err = ShiftService::close_shift(
            &mut book,
            &SystemClock,
            shift_id,
            &manager(),
            DeclaredRevenue::default(),
        )
        .expect_err("double close must fail");
        assert!(matches!(err, EngineError::ShiftAlreadyClosed(_)));
    }

    #[test]
    fn expense_against_closed_shift_is_rejected() {
        let mut book = ShiftBook::new("shifts");
        let shift_id = open_rio_morning(&mut book);
        ShiftService::close_shift(
            &mut book,
            &SystemClock,
            shift_id,
            &manager(),
            DeclaredRevenue::default(),
        )
        .unwrap();

        let err = ShiftService::record_expense(
            &mut book,
            &SystemClock,
            shift_id,
            Register::Box,
            Money::from_major(100),
            "late expense",
            &manager(),
        )
        .expect_err("expense after close must fail");
        assert!(matches!(err, EngineError::ShiftClosed(_)));
    }

    #[test]
    fn box_expense_requires_cash_handling() {
        let mut book = ShiftBook::new("shifts");
        let shift_id = open_rio_morning(&mut book);
        let admin_only = Actor::new(ActorId(77)).with_capability(Capability::ManageShifts);

        let err = ShiftService::record_expense(
            &mut book,
            &SystemClock,
            shift_id,
            Register::Box,
            Money::from_major(100),
            "supplies",
            &admin_only,
        )
        .expect_err("box expense without HandleCash must fail");
        assert!(matches!(err, EngineError::CapabilityDenied { .. }));
    }

    #[test]
    fn phase_tracks_checklist_progress() {
        let mut book = ShiftBook::new("shifts");
        let first = ChecklistItem::new("closing", "Count drawer", 1).require();
        let second = ChecklistItem::new("closing", "Lock up", 2).require();
        let first_id = first.id;
        book.add_item(first);
        book.add_item(second);
        let shift_id = open_rio_morning(&mut book);

        assert_eq!(
            ShiftService::phase(&book, shift_id).unwrap(),
            ShiftPhase::ChecklistPending
        );
        ChecklistService::mark_checked(&mut book, &SystemClock, shift_id, first_id, None, None)
            .unwrap();
        assert_eq!(
            ShiftService::phase(&book, shift_id).unwrap(),
            ShiftPhase::ClosingBlocked
        );
    }
}
