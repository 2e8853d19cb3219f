//! The distribution resolver: which units is a storefront legitimately
//! offering inside a trading window?

use std::collections::BTreeSet;

use tracing::debug;

use hubcycle_core::{DomainError, DomainResult, EnterpriseId};
use hubcycle_catalog::{CatalogReader, Unit, UnitId};

use crate::order_cycle::{OrderCycleId, ScheduleId};
use crate::reader::ExchangeReader;

/// Resolves vendor-to-storefront exchange agreements into offered unit sets.
///
/// Borrowing and stateless: safe to construct per call. All heavy lifting is
/// set algebra over the reader's records.
pub struct DistributionResolver<'a, R> {
    reader: &'a R,
}

impl<'a, R> DistributionResolver<'a, R>
where
    R: CatalogReader + ExchangeReader,
{
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Units offered at `storefront` within `order_cycle`: the deduplicated
    /// union of the unit sets of every outgoing exchange to that storefront.
    ///
    /// Soft-deleted units never appear. Unknown storefront or cycle is
    /// `NotFound`; an exchange referencing a unit that does not exist, or a
    /// unit whose owning product is missing, is `InconsistentState`.
    pub fn offered_units(
        &self,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<BTreeSet<UnitId>> {
        self.require_storefront(storefront)?;
        self.require_cycle(order_cycle)?;

        let mut offered = BTreeSet::new();
        for exchange in self.reader.exchanges_in_cycle(order_cycle) {
            if !exchange.is_outgoing() || exchange.receiver != storefront {
                continue;
            }
            for unit_id in &exchange.units {
                let unit = self.checked_unit(*unit_id)?;
                if !unit.is_deleted() {
                    offered.insert(unit.id);
                }
            }
        }

        debug!(%storefront, %order_cycle, count = offered.len(), "resolved offered units");
        Ok(offered)
    }

    /// Union of [`Self::offered_units`] across every cycle in the schedule.
    pub fn offered_units_in_schedule(
        &self,
        storefront: EnterpriseId,
        schedule: ScheduleId,
    ) -> DomainResult<BTreeSet<UnitId>> {
        let schedule = self
            .reader
            .schedule(schedule)
            .ok_or_else(|| DomainError::not_found("schedule", schedule))?;

        let mut offered = BTreeSet::new();
        for cycle in schedule.order_cycles {
            offered.append(&mut self.offered_units(storefront, cycle)?);
        }
        Ok(offered)
    }

    /// Customer-visible units: the offered set refined by per-storefront
    /// inventory overrides.
    ///
    /// - a `Hidden` override removes a unit the storefront sourced;
    /// - a `Visible` override (stockist carry) admits a unit the storefront
    ///   did not source directly, provided some outgoing exchange of the
    ///   cycle distributes it at all.
    pub fn visible_units(
        &self,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<BTreeSet<UnitId>> {
        let offered = self.offered_units(storefront, order_cycle)?;

        let mut visible: BTreeSet<UnitId> = offered
            .into_iter()
            .filter(|unit| !self.reader.visibility(storefront, *unit).is_hidden())
            .collect();

        // Stockist layering on top of the coordinator's base offering.
        let in_cycle = self.units_in_cycle(order_cycle)?;
        for unit_id in self.reader.explicitly_visible_units(storefront) {
            if !in_cycle.contains(&unit_id) {
                continue;
            }
            let unit = self.checked_unit(unit_id)?;
            if !unit.is_deleted() {
                visible.insert(unit_id);
            }
        }

        Ok(visible)
    }

    /// Distinct vendors whose units the storefront offers in the cycle.
    pub fn vendors_offering(
        &self,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<BTreeSet<EnterpriseId>> {
        let mut vendors = BTreeSet::new();
        for unit_id in self.offered_units(storefront, order_cycle)? {
            let unit = self.checked_unit(unit_id)?;
            let product = self.reader.product(unit.product).ok_or_else(|| {
                DomainError::inconsistent(format!("unit {unit_id} has no owning product"))
            })?;
            vendors.insert(product.vendor);
        }
        Ok(vendors)
    }

    /// Units distributed through *any* outgoing exchange of the cycle,
    /// regardless of receiving storefront.
    fn units_in_cycle(&self, order_cycle: OrderCycleId) -> DomainResult<BTreeSet<UnitId>> {
        let mut units = BTreeSet::new();
        for exchange in self.reader.exchanges_in_cycle(order_cycle) {
            if exchange.is_outgoing() {
                units.extend(exchange.units.iter().copied());
            }
        }
        Ok(units)
    }

    /// Load a unit and verify its owning product exists.
    fn checked_unit(&self, id: UnitId) -> DomainResult<Unit> {
        let unit = self
            .reader
            .unit(id)
            .ok_or_else(|| DomainError::inconsistent(format!("exchange references unknown unit {id}")))?;
        if self.reader.product(unit.product).is_none() {
            return Err(DomainError::inconsistent(format!(
                "unit {id} has no owning product"
            )));
        }
        Ok(unit)
    }

    fn require_storefront(&self, storefront: EnterpriseId) -> DomainResult<()> {
        self.reader
            .enterprise(storefront)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("storefront", storefront))
    }

    fn require_cycle(&self, order_cycle: OrderCycleId) -> DomainResult<()> {
        self.reader
            .order_cycle(order_cycle)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("order cycle", order_cycle))
    }
}
