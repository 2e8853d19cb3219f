//! Catalog mutation events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hubcycle_core::EnterpriseId;
use hubcycle_events::Event;

use crate::inventory::Visibility;
use crate::unit::UnitId;

/// Facts about catalog mutations, published after they commit.
///
/// Consumers use these to schedule background work (cache refreshes); the
/// synchronous invalidation path does not depend on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogEvent {
    UnitPriceChanged {
        unit: UnitId,
        occurred_at: DateTime<Utc>,
    },
    UnitStockChanged {
        unit: UnitId,
        occurred_at: DateTime<Utc>,
    },
    UnitSoftDeleted {
        unit: UnitId,
        occurred_at: DateTime<Utc>,
    },
    UnitDestroyed {
        unit: UnitId,
        occurred_at: DateTime<Utc>,
    },
    VisibilityChanged {
        storefront: EnterpriseId,
        unit: UnitId,
        visibility: Visibility,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::UnitPriceChanged { .. } => "catalog.unit.price_changed",
            CatalogEvent::UnitStockChanged { .. } => "catalog.unit.stock_changed",
            CatalogEvent::UnitSoftDeleted { .. } => "catalog.unit.soft_deleted",
            CatalogEvent::UnitDestroyed { .. } => "catalog.unit.destroyed",
            CatalogEvent::VisibilityChanged { .. } => "catalog.visibility.changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::UnitPriceChanged { occurred_at, .. }
            | CatalogEvent::UnitStockChanged { occurred_at, .. }
            | CatalogEvent::UnitSoftDeleted { occurred_at, .. }
            | CatalogEvent::UnitDestroyed { occurred_at, .. }
            | CatalogEvent::VisibilityChanged { occurred_at, .. } => *occurred_at,
        }
    }
}
