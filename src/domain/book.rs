use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::checklist::{ChecklistItem, ChecklistProgress};
use crate::domain::common::{NamedEntity, Venue};
use crate::domain::movement::{CashBalance, CashMovement, Register};
use crate::domain::shift::{Shift, ShiftType};
use crate::domain::sync::{SyncKey, SyncRecord};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Persisted aggregate holding every record collection the engine owns.
///
/// Exclusive `&mut` access is the transaction boundary: every service call
/// validates before it mutates, so a failed call leaves the book untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftBook {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub progress: Vec<ChecklistProgress>,
    #[serde(default)]
    pub movements: Vec<CashMovement>,
    #[serde(default)]
    pub balances: Vec<CashBalance>,
    #[serde(default)]
    pub sync_records: Vec<SyncRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "ShiftBook::schema_version_default")]
    pub schema_version: u8,
}

impl ShiftBook {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
            shifts: Vec::new(),
            progress: Vec::new(),
            movements: Vec::new(),
            balances: Vec::new(),
            sync_records: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_item(&mut self, item: ChecklistItem) -> Uuid {
        let id = item.id;
        self.items.push(item);
        self.touch();
        id
    }

    pub fn item(&self, id: Uuid) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut ChecklistItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn add_shift(&mut self, shift: Shift) -> Uuid {
        let id = shift.id;
        self.shifts.push(shift);
        self.touch();
        id
    }

    pub fn shift(&self, id: Uuid) -> Option<&Shift> {
        self.shifts.iter().find(|shift| shift.id == id)
    }

    pub fn shift_mut(&mut self, id: Uuid) -> Option<&mut Shift> {
        self.shifts.iter_mut().find(|shift| shift.id == id)
    }

    /// The single open shift for a (venue, shift type) slot, if any. The
    /// open-shift uniqueness invariant is enforced against this lookup.
    pub fn open_shift_for(&self, venue: &Venue, shift_type: ShiftType) -> Option<&Shift> {
        self.shifts
            .iter()
            .find(|shift| shift.is_open() && &shift.venue == venue && shift.shift_type == shift_type)
    }

    pub fn add_progress(&mut self, row: ChecklistProgress) -> Uuid {
        let id = row.id;
        self.progress.push(row);
        self.touch();
        id
    }

    pub fn progress_for(&self, shift_id: Uuid) -> impl Iterator<Item = &ChecklistProgress> {
        self.progress.iter().filter(move |row| row.shift_id == shift_id)
    }

    pub fn has_progress(&self, shift_id: Uuid) -> bool {
        self.progress.iter().any(|row| row.shift_id == shift_id)
    }

    pub fn progress_entry_mut(
        &mut self,
        shift_id: Uuid,
        item_id: Uuid,
    ) -> Option<&mut ChecklistProgress> {
        self.progress
            .iter_mut()
            .find(|row| row.shift_id == shift_id && row.item_id == item_id)
    }

    pub fn add_movement(&mut self, movement: CashMovement) -> Uuid {
        let id = movement.id;
        self.movements.push(movement);
        self.touch();
        id
    }

    pub fn movement(&self, id: Uuid) -> Option<&CashMovement> {
        self.movements.iter().find(|movement| movement.id == id)
    }

    pub fn movements_for(
        &self,
        venue: &Venue,
        register: Register,
    ) -> impl Iterator<Item = &CashMovement> {
        let venue = venue.clone();
        self.movements
            .iter()
            .filter(move |movement| movement.venue == venue && movement.register == register)
    }

    pub fn balance(&self, venue: &Venue, register: Register) -> Option<&CashBalance> {
        self.balances
            .iter()
            .find(|balance| &balance.venue == venue && balance.register == register)
    }

    /// Cached balance row for the pair, created zeroed on first touch.
    pub fn balance_mut(
        &mut self,
        venue: &Venue,
        register: Register,
        as_of: DateTime<Utc>,
    ) -> &mut CashBalance {
        let position = self
            .balances
            .iter()
            .position(|balance| &balance.venue == venue && balance.register == register);
        match position {
            Some(index) => &mut self.balances[index],
            None => {
                self.balances
                    .push(CashBalance::new(venue.clone(), register, as_of));
                self.balances.last_mut().unwrap()
            }
        }
    }

    pub fn add_sync_record(&mut self, record: SyncRecord) -> Uuid {
        let id = record.id;
        self.sync_records.push(record);
        self.touch();
        id
    }

    pub fn sync_record(&self, key: &SyncKey) -> Option<&SyncRecord> {
        self.sync_records.iter().find(|record| &record.key() == key)
    }

    pub fn sync_record_mut(&mut self, key: &SyncKey) -> Option<&mut SyncRecord> {
        self.sync_records
            .iter_mut()
            .find(|record| &record.key() == key)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl NamedEntity for ShiftBook {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::ActorId;
    use crate::domain::shift::RegisterBalances;
    use chrono::NaiveDate;

    fn sample_shift(venue: &str, shift_type: ShiftType) -> Shift {
        Shift::new(
            Venue::new(venue),
            shift_type,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ActorId(1),
            Utc::now(),
            RegisterBalances::default(),
        )
    }

    #[test]
    fn open_shift_lookup_matches_slot_only() {
        let mut book = ShiftBook::new("clubs");
        let rio_morning = sample_shift("Рио", ShiftType::Morning);
        let rio_id = rio_morning.id;
        book.add_shift(rio_morning);
        book.add_shift(sample_shift("Центр", ShiftType::Morning));

        let found = book
            .open_shift_for(&Venue::new("Рио"), ShiftType::Morning)
            .expect("open shift");
        assert_eq!(found.id, rio_id);
        assert!(book
            .open_shift_for(&Venue::new("Рио"), ShiftType::Evening)
            .is_none());
    }

    #[test]
    fn balance_mut_creates_zero_row_once() {
        let mut book = ShiftBook::new("clubs");
        let venue = Venue::new("Рио");
        let now = Utc::now();
        book.balance_mut(&venue, Register::Box, now);
        book.balance_mut(&venue, Register::Box, now);
        assert_eq!(book.balances.len(), 1);
        assert!(book.balance(&venue, Register::Box).unwrap().balance.is_zero());
    }
}
