//! Distribution mutation events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hubcycle_core::EnterpriseId;
use hubcycle_events::Event;

use crate::order_cycle::OrderCycleId;

/// Facts about exchange/order-cycle mutations, published after they commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionEvent {
    /// Units were added to or removed from an outgoing exchange.
    ExchangeMembersChanged {
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
        occurred_at: DateTime<Utc>,
    },
    OrderCycleClosed {
        order_cycle: OrderCycleId,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for DistributionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DistributionEvent::ExchangeMembersChanged { .. } => {
                "distribution.exchange.members_changed"
            }
            DistributionEvent::OrderCycleClosed { .. } => "distribution.order_cycle.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DistributionEvent::ExchangeMembersChanged { occurred_at, .. }
            | DistributionEvent::OrderCycleClosed { occurred_at, .. } => *occurred_at,
        }
    }
}
