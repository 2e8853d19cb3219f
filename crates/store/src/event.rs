//! Combined market mutation event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hubcycle_catalog::CatalogEvent;
use hubcycle_distribution::DistributionEvent;
use hubcycle_events::Event;

/// Every mutation fact the market store publishes, in one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    Catalog(CatalogEvent),
    Distribution(DistributionEvent),
}

impl From<CatalogEvent> for MarketEvent {
    fn from(event: CatalogEvent) -> Self {
        MarketEvent::Catalog(event)
    }
}

impl From<DistributionEvent> for MarketEvent {
    fn from(event: DistributionEvent) -> Self {
        MarketEvent::Distribution(event)
    }
}

impl Event for MarketEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::Catalog(e) => e.event_type(),
            MarketEvent::Distribution(e) => e.event_type(),
        }
    }

    fn version(&self) -> u32 {
        match self {
            MarketEvent::Catalog(e) => e.version(),
            MarketEvent::Distribution(e) => e.version(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MarketEvent::Catalog(e) => e.occurred_at(),
            MarketEvent::Distribution(e) => e.occurred_at(),
        }
    }
}
