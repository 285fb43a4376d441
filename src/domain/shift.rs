use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::actor::ActorId;
use crate::domain::common::{Displayable, Identifiable, Venue};
use crate::domain::movement::Register;
use crate::money::Money;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Morning,
    Evening,
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Morning => f.write_str("morning"),
            ShiftType::Evening => f.write_str("evening"),
        }
    }
}

/// Persisted lifecycle state. A rejected close attempt leaves the shift
/// `Open`; nothing in between is ever written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Closed,
}

/// Derived operational view over an open shift, computed from checklist
/// state on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftPhase {
    Open,
    ChecklistPending,
    ClosingBlocked,
    Closed,
}

/// Revenue the operator reports at close time, split by payment channel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclaredRevenue {
    pub cash: Money,
    pub card: Money,
    pub qr: Money,
    pub alt_card: Money,
}

impl DeclaredRevenue {
    pub fn total(&self) -> Money {
        self.cash + self.card + self.qr + self.alt_card
    }
}

/// Balances of both registers of one venue at a single point in time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterBalances {
    pub official: Money,
    #[serde(rename = "box")]
    pub box_cash: Money,
}

impl RegisterBalances {
    pub fn new(official: Money, box_cash: Money) -> Self {
        Self { official, box_cash }
    }

    pub fn get(&self, register: Register) -> Money {
        match register {
            Register::Official => self.official,
            Register::Box => self.box_cash,
        }
    }

    /// Per-register difference `self - other`.
    pub fn minus(&self, other: &RegisterBalances) -> RegisterBalances {
        RegisterBalances {
            official: self.official - other.official,
            box_cash: self.box_cash - other.box_cash,
        }
    }
}

/// A bounded work period at one venue. Mutated only through the shift
/// service; `Closed` is terminal and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub venue: Venue,
    pub shift_type: ShiftType,
    pub shift_date: NaiveDate,
    pub opened_by: ActorId,
    pub status: ShiftStatus,
    pub opened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared: Option<DeclaredRevenue>,
    pub opening: RegisterBalances,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<RegisterBalances>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_deltas: Option<RegisterBalances>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_by: Option<ActorId>,
}

impl Shift {
    pub fn new(
        venue: Venue,
        shift_type: ShiftType,
        shift_date: NaiveDate,
        opened_by: ActorId,
        opened_at: DateTime<Utc>,
        opening: RegisterBalances,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            venue,
            shift_type,
            shift_date,
            opened_by,
            status: ShiftStatus::Open,
            opened_at,
            closed_at: None,
            declared: None,
            opening,
            closing: None,
            register_deltas: None,
            confirmed_by: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == ShiftStatus::Closed
    }

    /// Stamps the full closing snapshot in one step. Callers validate the
    /// checklist gate and compute balances before invoking this.
    pub(crate) fn close(
        &mut self,
        closed_at: DateTime<Utc>,
        declared: DeclaredRevenue,
        closing: RegisterBalances,
        confirmed_by: ActorId,
    ) {
        self.register_deltas = Some(closing.minus(&self.opening));
        self.declared = Some(declared);
        self.closing = Some(closing);
        self.closed_at = Some(closed_at);
        self.confirmed_by = Some(confirmed_by);
        self.status = ShiftStatus::Closed;
    }
}

impl Identifiable for Shift {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Shift {
    fn display_label(&self) -> String {
        format!(
            "{} {} {} [{:?}]",
            self.venue, self.shift_type, self.shift_date, self.status
        )
    }
}

/// Reconciliation record produced by a successful close. Read by payroll
/// and notification collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingSnapshot {
    pub shift_id: Uuid,
    pub venue: Venue,
    pub shift_type: ShiftType,
    pub shift_date: NaiveDate,
    pub declared: DeclaredRevenue,
    pub opening: RegisterBalances,
    pub closing: RegisterBalances,
    pub deltas: RegisterBalances,
    pub closed_at: DateTime<Utc>,
    pub confirmed_by: ActorId,
}

impl ClosingSnapshot {
    pub fn declared_total(&self) -> Money {
        self.declared.total()
    }

    /// Declared cash revenue minus the official-register delta. Zero means
    /// the drawer agrees with the report.
    pub fn cash_discrepancy(&self) -> Money {
        self.declared.cash - self.deltas.official
    }
}
