use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hubcycle_core::{EnterpriseId, Entity, EntityId};

/// Order cycle identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderCycleId(pub EntityId);

impl OrderCycleId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderCycleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Schedule identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScheduleId(pub EntityId);

impl ScheduleId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A bounded trading window during which its exchanges are active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCycle {
    pub id: OrderCycleId,
    pub name: String,
    pub coordinator: EnterpriseId,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub schedules: Vec<ScheduleId>,
}

impl OrderCycle {
    pub fn new(
        id: OrderCycleId,
        name: impl Into<String>,
        coordinator: EnterpriseId,
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            coordinator,
            opens_at,
            closes_at,
            schedules: Vec::new(),
        }
    }

    /// Whether the cycle is mid-cycle (open for trading) at `now`.
    pub fn open_at(&self, now: DateTime<Utc>) -> bool {
        self.opens_at <= now && now < self.closes_at
    }
}

impl Entity for OrderCycle {
    type Id = OrderCycleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A recurring grouping of order cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub order_cycles: Vec<OrderCycleId>,
}

impl Entity for Schedule {
    type Id = ScheduleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
