//! Domain records for shifts, checklists, cash registers, and export
//! bookkeeping.

pub mod actor;
pub mod book;
pub mod checklist;
pub mod common;
pub mod movement;
pub mod shift;
pub mod sync;

pub use actor::{Actor, ActorId, Capability, CapabilitySet};
pub use book::{ShiftBook, CURRENT_SCHEMA_VERSION};
pub use checklist::{ChecklistItem, ChecklistProgress};
pub use common::{Displayable, Identifiable, NamedEntity, Venue};
pub use movement::{CashBalance, CashMovement, Register};
pub use shift::{
    ClosingSnapshot, DeclaredRevenue, RegisterBalances, Shift, ShiftPhase, ShiftStatus, ShiftType,
};
pub use sync::{SyncKey, SyncRecord, SyncStatus};
