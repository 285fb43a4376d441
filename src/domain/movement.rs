use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::actor::ActorId;
use crate::domain::common::{Identifiable, Venue};
use crate::money::Money;

/// One of the two parallel cash pools each venue runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    /// Declared drawer reported to accounting.
    Official,
    /// Working cash kept on site.
    Box,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Official => f.write_str("official"),
            Register::Box => f.write_str("box"),
        }
    }
}

/// Append-only signed cash delta. Never edited or deleted; corrections are
/// new offsetting movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: Uuid,
    pub venue: Venue,
    pub register: Register,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<Uuid>,
    pub delta: Money,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub actor: ActorId,
}

impl CashMovement {
    pub fn new(
        venue: Venue,
        register: Register,
        delta: Money,
        shift_id: Option<Uuid>,
        reason: impl Into<String>,
        actor: ActorId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            venue,
            register,
            shift_id,
            delta,
            reason: reason.into(),
            created_at,
            actor,
        }
    }
}

impl Identifiable for CashMovement {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Cached running balance for one (venue, register) pair. A projection over
/// the movement log, recomputable at any time; never the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashBalance {
    pub venue: Venue,
    pub register: Register,
    pub balance: Money,
    pub updated_at: DateTime<Utc>,
}

impl CashBalance {
    pub fn new(venue: Venue, register: Register, as_of: DateTime<Utc>) -> Self {
        Self {
            venue,
            register,
            balance: Money::ZERO,
            updated_at: as_of,
        }
    }

    pub fn apply(&mut self, delta: Money, as_of: DateTime<Utc>) {
        self.balance += delta;
        self.updated_at = as_of;
    }
}
