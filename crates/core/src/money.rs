//! Money as integer minor units (cents).
//!
//! Fee aggregation must be bit-identical across repeated calls, so all
//! arithmetic is integer arithmetic; there is no floating point anywhere in
//! the money path. Percentages are expressed in basis points by callers.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// An amount in minor currency units (e.g. cents).
///
/// Signed so that fee adjustments and differences are representable; domain
/// prices are validated non-negative where they enter the system.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Apply a rate in basis points (1/100th of a percent), rounding
    /// half-away-from-zero on the resulting minor unit.
    ///
    /// `Money::from_cents(1000).percent_bps(250)` is 2.5% of $10.00 = $0.25.
    pub fn percent_bps(self, basis_points: i64) -> Money {
        let numerator = self.0 as i128 * basis_points as i128;
        let denominator = 10_000i128;
        let quotient = numerator / denominator;
        let remainder = numerator % denominator;
        let rounded = if remainder.abs() * 2 >= denominator {
            quotient + numerator.signum()
        } else {
            quotient
        };
        Money(rounded as i64)
    }

    /// Multiply by a quantity (per-item fees).
    pub fn times(self, quantity: i64) -> Money {
        Money(self.0.saturating_mul(quantity))
    }
}

impl ValueObject for Money {}

impl core::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
