//! Double-register cash ledger: append-only movements plus the cached
//! balance projection.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::domain::actor::ActorId;
use crate::domain::book::ShiftBook;
use crate::domain::common::Venue;
use crate::domain::movement::{CashMovement, Register};
use crate::errors::{EngineError, Result};
use crate::money::Money;

pub struct CashService;

impl CashService {
    /// Appends a signed movement and updates the cached balance for the
    /// (venue, register) pair in the same call, so the cache never observes
    /// a movement without its balance effect.
    pub fn apply_movement(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        venue: &Venue,
        register: Register,
        delta: Money,
        shift_id: Option<Uuid>,
        reason: &str,
        actor: ActorId,
    ) -> Result<Uuid> {
        if reason.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "movement reason must not be empty".into(),
            ));
        }
        let current = book
            .balance(venue, register)
            .map(|balance| balance.balance)
            .unwrap_or(Money::ZERO);
        if current.checked_add(delta).is_none() {
            return Err(EngineError::InvalidInput(format!(
                "movement of {delta} overflows the {venue}/{register} balance"
            )));
        }
        let now = clock.now();
        let movement = CashMovement::new(
            venue.clone(),
            register,
            delta,
            shift_id,
            reason,
            actor,
            now,
        );
        let movement_id = movement.id;
        book.balance_mut(venue, register, now).apply(delta, now);
        book.add_movement(movement);
        tracing::debug!(
            venue = %venue,
            register = %register,
            %delta,
            %actor,
            "cash movement applied"
        );
        Ok(movement_id)
    }

    /// Live cached balance when `as_of` is omitted; otherwise the exact fold
    /// of movements with `created_at <= as_of`. Point-in-time reads keep
    /// closing snapshots independent of adjacent live activity.
    pub fn balance_as_of(
        book: &ShiftBook,
        venue: &Venue,
        register: Register,
        as_of: Option<DateTime<Utc>>,
    ) -> Money {
        match as_of {
            Some(cutoff) => book
                .movements_for(venue, register)
                .filter(|movement| movement.created_at <= cutoff)
                .map(|movement| movement.delta)
                .sum(),
            None => book
                .balance(venue, register)
                .map(|balance| balance.balance)
                .unwrap_or(Money::ZERO),
        }
    }

    /// Rebuilds the cached row from the movement log and returns the exact
    /// sum. The cache is a projection; the log is the source of truth.
    pub fn recompute_balance(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        venue: &Venue,
        register: Register,
    ) -> Money {
        let total: Money = book
            .movements_for(venue, register)
            .map(|movement| movement.delta)
            .sum();
        let now = clock.now();
        let cached = book.balance_mut(venue, register, now);
        cached.balance = total;
        cached.updated_at = now;
        book.touch();
        total
    }

    /// Appends the offsetting movement for an earlier entry, with a reason
    /// referencing the original. Movements are never edited or deleted.
    pub fn reverse_movement(
        book: &mut ShiftBook,
        clock: &dyn Clock,
        movement_id: Uuid,
        actor: ActorId,
    ) -> Result<Uuid> {
        let original = book
            .movement(movement_id)
            .ok_or_else(|| EngineError::InvalidInput(format!("movement {movement_id} not found")))?
            .clone();
        let reason = format!("reversal of {}: {}", original.id, original.reason);
        Self::apply_movement(
            book,
            clock,
            &original.venue,
            original.register,
            -original.delta,
            original.shift_id,
            &reason,
            actor,
        )
    }
}
