use serde::{Deserialize, Serialize};

use hubcycle_core::{EnterpriseId, Entity, Money};
use hubcycle_distribution::FeeId;

/// Business category of a fee, used for grouped breakdowns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Packing,
    Transport,
    Admin,
    Sales,
    Fundraising,
}

impl core::fmt::Display for FeeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            FeeType::Packing => "packing",
            FeeType::Transport => "transport",
            FeeType::Admin => "admin",
            FeeType::Sales => "sales",
            FeeType::Fundraising => "fundraising",
        };
        f.write_str(s)
    }
}

/// How a fee amount is derived from a unit's base price.
///
/// All strategies are integer arithmetic over minor units, so aggregation is
/// bit-identical across calls with unchanged data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCalculation {
    /// Fixed amount regardless of price or quantity.
    FlatRate(Money),
    /// Percentage of the base price, in basis points (250 = 2.5%).
    FlatPercent { basis_points: i64 },
    /// Fixed amount per item.
    PerItem(Money),
}

impl FeeCalculation {
    /// Evaluate against a base price and quantity.
    pub fn compute(&self, price: Money, quantity: i64) -> Money {
        match *self {
            FeeCalculation::FlatRate(amount) => amount,
            FeeCalculation::FlatPercent { basis_points } => price.percent_bps(basis_points),
            FeeCalculation::PerItem(amount) => amount.times(quantity),
        }
    }
}

/// A fee schedule owned by an enterprise and attached to exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseFee {
    pub id: FeeId,
    pub enterprise: EnterpriseId,
    pub name: String,
    pub fee_type: FeeType,
    pub calculation: FeeCalculation,
}

impl EnterpriseFee {
    pub fn new(
        id: FeeId,
        enterprise: EnterpriseId,
        name: impl Into<String>,
        fee_type: FeeType,
        calculation: FeeCalculation,
    ) -> Self {
        Self {
            id,
            enterprise,
            name: name.into(),
            fee_type,
            calculation,
        }
    }
}

impl Entity for EnterpriseFee {
    type Id = FeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Read access to fee definitions.
pub trait FeeReader {
    fn fee(&self, id: FeeId) -> Option<EnterpriseFee>;
}

impl<T: FeeReader + ?Sized> FeeReader for std::sync::Arc<T> {
    fn fee(&self, id: FeeId) -> Option<EnterpriseFee> {
        (**self).fee(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_rate_ignores_price_and_quantity() {
        let calc = FeeCalculation::FlatRate(Money::from_cents(123));
        assert_eq!(calc.compute(Money::from_cents(1), 9), Money::from_cents(123));
        assert_eq!(calc.compute(Money::ZERO, 1), Money::from_cents(123));
    }

    #[test]
    fn flat_percent_applies_basis_points_to_price() {
        let calc = FeeCalculation::FlatPercent { basis_points: 1000 };
        assert_eq!(
            calc.compute(Money::from_cents(1000), 3),
            Money::from_cents(100)
        );
    }

    #[test]
    fn per_item_scales_with_quantity() {
        let calc = FeeCalculation::PerItem(Money::from_cents(50));
        assert_eq!(calc.compute(Money::from_cents(1000), 4), Money::from_cents(200));
    }
}
