use serde::{Deserialize, Serialize};

use hubcycle_core::EnterpriseId;
use hubcycle_distribution::OrderCycleId;

/// Cache key: one storefront inside one trading window.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CacheKey {
    pub storefront: EnterpriseId,
    pub order_cycle: OrderCycleId,
}

impl CacheKey {
    pub fn new(storefront: EnterpriseId, order_cycle: OrderCycleId) -> Self {
        Self {
            storefront,
            order_cycle,
        }
    }
}

impl core::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.storefront, self.order_cycle)
    }
}
