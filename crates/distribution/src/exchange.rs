use serde::{Deserialize, Serialize};

use hubcycle_core::{EnterpriseId, Entity, EntityId};
use hubcycle_catalog::UnitId;

use crate::order_cycle::OrderCycleId;

/// Exchange identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExchangeId(pub EntityId);

impl ExchangeId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of an enterprise-fee schedule attached to an exchange.
///
/// The fee definition itself lives in `hubcycle-fees`; the exchange only
/// records the attachment, in attachment order.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FeeId(pub EntityId);

impl FeeId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for FeeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of supply through an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeDirection {
    /// Vendor → coordinating hub. Supply only; never customer-facing.
    Incoming,
    /// Coordinating hub → storefront. Makes units purchasable.
    Outgoing,
}

/// A directed supply agreement within one order cycle.
///
/// `units` and `fees` keep insertion/attachment order: fee aggregation is
/// required to be deterministic, and with no explicit priority field in the
/// data, discovery order is the ordering rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: ExchangeId,
    pub order_cycle: OrderCycleId,
    pub sender: EnterpriseId,
    pub receiver: EnterpriseId,
    pub direction: ExchangeDirection,
    pub units: Vec<UnitId>,
    pub fees: Vec<FeeId>,
}

impl Exchange {
    pub fn outgoing(
        id: ExchangeId,
        order_cycle: OrderCycleId,
        sender: EnterpriseId,
        receiver: EnterpriseId,
    ) -> Self {
        Self {
            id,
            order_cycle,
            sender,
            receiver,
            direction: ExchangeDirection::Outgoing,
            units: Vec::new(),
            fees: Vec::new(),
        }
    }

    pub fn incoming(
        id: ExchangeId,
        order_cycle: OrderCycleId,
        sender: EnterpriseId,
        receiver: EnterpriseId,
    ) -> Self {
        Self {
            id,
            order_cycle,
            sender,
            receiver,
            direction: ExchangeDirection::Incoming,
            units: Vec::new(),
            fees: Vec::new(),
        }
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = UnitId>) -> Self {
        for unit in units {
            self.add_unit(unit);
        }
        self
    }

    pub fn with_fees(mut self, fees: impl IntoIterator<Item = FeeId>) -> Self {
        self.fees.extend(fees);
        self
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == ExchangeDirection::Outgoing
    }

    pub fn carries_unit(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    /// Add a unit membership; duplicates are ignored to keep the list a set.
    pub fn add_unit(&mut self, unit: UnitId) -> bool {
        if self.carries_unit(unit) {
            return false;
        }
        self.units.push(unit);
        true
    }

    pub fn remove_unit(&mut self, unit: UnitId) -> bool {
        let before = self.units.len();
        self.units.retain(|u| *u != unit);
        self.units.len() != before
    }
}

impl Entity for Exchange {
    type Id = ExchangeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
