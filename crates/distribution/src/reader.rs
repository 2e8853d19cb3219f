//! Read access to order cycles and exchanges.

use hubcycle_core::EnterpriseId;
use hubcycle_catalog::UnitId;

use crate::exchange::Exchange;
use crate::order_cycle::{OrderCycleId, Schedule, ScheduleId};

pub trait ExchangeReader {
    fn order_cycle(&self, id: OrderCycleId) -> Option<crate::order_cycle::OrderCycle>;

    /// All exchanges of a cycle, in insertion order (the deterministic
    /// discovery order for fee aggregation).
    fn exchanges_in_cycle(&self, cycle: OrderCycleId) -> Vec<Exchange>;

    fn schedule(&self, id: ScheduleId) -> Option<Schedule>;

    /// Every (storefront, order cycle) pair through which the unit is
    /// currently offered to customers, i.e. outgoing exchanges carrying it.
    fn distributions_of_unit(&self, unit: UnitId) -> Vec<(EnterpriseId, OrderCycleId)>;
}

impl<T: ExchangeReader + ?Sized> ExchangeReader for std::sync::Arc<T> {
    fn order_cycle(&self, id: OrderCycleId) -> Option<crate::order_cycle::OrderCycle> {
        (**self).order_cycle(id)
    }

    fn exchanges_in_cycle(&self, cycle: OrderCycleId) -> Vec<Exchange> {
        (**self).exchanges_in_cycle(cycle)
    }

    fn schedule(&self, id: ScheduleId) -> Option<Schedule> {
        (**self).schedule(id)
    }

    fn distributions_of_unit(&self, unit: UnitId) -> Vec<(EnterpriseId, OrderCycleId)> {
        (**self).distributions_of_unit(unit)
    }
}
