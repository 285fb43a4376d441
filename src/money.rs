use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

const MINOR_PER_UNIT: i64 = 100;

/// Exact cash amount stored as signed minor units (two decimal places).
///
/// Register arithmetic stays drift-free across arbitrarily long movement
/// logs because every operation is integer addition or subtraction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Builds an amount from raw minor units.
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Builds an amount from whole currency units.
    pub fn from_major(units: i64) -> Self {
        Self(units * MINOR_PER_UNIT)
    }

    pub fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Parses `"1234.56"`, `"-12"`, or `"12,50"` into an exact amount.
    ///
    /// At most two fraction digits are accepted; shorter fractions are
    /// right-padded, so `"5.5"` reads as five units and fifty minor units.
    pub fn parse(text: &str) -> Result<Money, EngineError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput("empty amount".into()));
        }
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let mut parts = body.splitn(2, |c| c == '.' || c == ',');
        let whole_part = parts.next().unwrap_or("");
        let fraction_part = parts.next().unwrap_or("");
        if whole_part.is_empty() && fraction_part.is_empty() {
            return Err(EngineError::InvalidInput(format!("invalid amount `{text}`")));
        }
        if fraction_part.len() > 2 {
            return Err(EngineError::InvalidInput(format!(
                "amount `{text}` has more than two fraction digits"
            )));
        }
        let whole: i64 = if whole_part.is_empty() {
            0
        } else {
            whole_part
                .parse()
                .map_err(|_| EngineError::InvalidInput(format!("invalid amount `{text}`")))?
        };
        let fraction: i64 = if fraction_part.is_empty() {
            0
        } else {
            let padded = format!("{fraction_part:0<2}");
            padded
                .parse()
                .map_err(|_| EngineError::InvalidInput(format!("invalid amount `{text}`")))?
        };
        let minor = whole
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|units| units.checked_add(fraction))
            .ok_or_else(|| EngineError::InvalidInput(format!("amount `{text}` is out of range")))?;
        Ok(Money(if negative { -minor } else { minor }))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_UNIT,
            abs % MINOR_PER_UNIT
        )
    }
}
