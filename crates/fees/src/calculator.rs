//! The fee aggregator.
//!
//! For a (unit, storefront, order cycle) triple the applicable fees come from
//! two kinds of exchange inside the cycle: the incoming exchange through
//! which the unit's vendor supplies the coordinator, and the outgoing
//! exchange through which the coordinator distributes to the storefront.
//! Coordinator fees apply **in addition to** vendor fees, never instead of.
//!
//! Ordering rule: the data carries no explicit fee priority, so discovery
//! order governs — the cycle's exchange insertion order, then fee attachment
//! order within an exchange. Repeated calls over unchanged data therefore
//! return bit-identical totals and identically ordered breakdowns.

use tracing::debug;

use hubcycle_core::{DomainError, DomainResult, EnterpriseId, Money};
use hubcycle_catalog::{CatalogReader, UnitId};
use hubcycle_distribution::{ExchangeDirection, ExchangeReader, OrderCycleId};

use crate::fee::{EnterpriseFee, FeeReader, FeeType};

/// One line of a grouped fee breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub fee_type: FeeType,
    pub amount: Money,
}

/// Stateless fee aggregation over the reader's records.
///
/// Thread-safe by construction: no shared mutable state, safe to call from
/// any number of request-handling contexts concurrently.
pub struct FeeCalculator<'a, R> {
    reader: &'a R,
}

impl<'a, R> FeeCalculator<'a, R>
where
    R: CatalogReader + ExchangeReader + FeeReader,
{
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Total additive fee amount for the unit inside the storefront/cycle.
    ///
    /// A unit that is not distributed through that storefront and cycle has
    /// no applicable fees; the total is `Money::ZERO` and that is a valid
    /// outcome, not an error. Callers that need to assert distribution
    /// consult the distribution resolver first.
    pub fn fees_for(
        &self,
        unit: UnitId,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<Money> {
        let total = self
            .applicable_fees(unit, storefront, order_cycle)?
            .into_iter()
            .map(|(_, amount)| amount)
            .sum();
        debug!(%unit, %storefront, %order_cycle, %total, "aggregated fees");
        Ok(total)
    }

    /// Same computation, grouped by fee type.
    ///
    /// Groups appear in the order their type is first discovered; amounts of
    /// later fees of the same type accumulate into that entry.
    pub fn fees_by_type_for(
        &self,
        unit: UnitId,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<Vec<FeeBreakdown>> {
        let mut breakdown: Vec<FeeBreakdown> = Vec::new();
        for (fee, amount) in self.applicable_fees(unit, storefront, order_cycle)? {
            match breakdown.iter_mut().find(|b| b.fee_type == fee.fee_type) {
                Some(entry) => entry.amount += amount,
                None => breakdown.push(FeeBreakdown {
                    fee_type: fee.fee_type,
                    amount,
                }),
            }
        }
        Ok(breakdown)
    }

    /// The unit's base price plus [`Self::fees_for`].
    pub fn price_with_fees(
        &self,
        unit: UnitId,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<Money> {
        let record = self
            .reader
            .unit(unit)
            .ok_or_else(|| DomainError::not_found("unit", unit))?;
        Ok(record.price + self.fees_for(unit, storefront, order_cycle)?)
    }

    /// Every applicable fee with its evaluated amount, in discovery order.
    ///
    /// The listing-time contract carries no quantity, so per-item fees are
    /// evaluated at quantity 1; checkout-time callers evaluate
    /// [`FeeCalculation::compute`] themselves with the real quantity.
    ///
    /// [`FeeCalculation::compute`]: crate::fee::FeeCalculation::compute
    fn applicable_fees(
        &self,
        unit: UnitId,
        storefront: EnterpriseId,
        order_cycle: OrderCycleId,
    ) -> DomainResult<Vec<(EnterpriseFee, Money)>> {
        let record = self
            .reader
            .unit(unit)
            .ok_or_else(|| DomainError::not_found("unit", unit))?;
        let product = self.reader.product(record.product).ok_or_else(|| {
            DomainError::inconsistent(format!("unit {unit} has no owning product"))
        })?;
        self.reader
            .enterprise(storefront)
            .ok_or_else(|| DomainError::not_found("storefront", storefront))?;
        self.reader
            .order_cycle(order_cycle)
            .ok_or_else(|| DomainError::not_found("order cycle", order_cycle))?;

        let mut fees = Vec::new();
        for exchange in self.reader.exchanges_in_cycle(order_cycle) {
            if !exchange.carries_unit(unit) {
                continue;
            }
            let qualifies = match exchange.direction {
                ExchangeDirection::Incoming => exchange.sender == product.vendor,
                ExchangeDirection::Outgoing => exchange.receiver == storefront,
            };
            if !qualifies {
                continue;
            }
            for fee_id in &exchange.fees {
                let fee = self.reader.fee(*fee_id).ok_or_else(|| {
                    DomainError::inconsistent(format!(
                        "exchange {} references unknown fee {fee_id}",
                        exchange.id
                    ))
                })?;
                let amount = fee.calculation.compute(record.price, 1);
                fees.push((fee, amount));
            }
        }
        Ok(fees)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, Utc};

    use hubcycle_core::EntityId;
    use hubcycle_catalog::{
        Enterprise, Product, ProductId, StockLevel, Unit, VariantUnit, Visibility,
    };
    use hubcycle_distribution::{
        Exchange, ExchangeId, FeeId, OrderCycle, Schedule, ScheduleId,
    };

    use crate::fee::FeeCalculation;

    use super::*;

    #[derive(Default)]
    struct TestMarket {
        enterprises: HashMap<EnterpriseId, Enterprise>,
        products: HashMap<ProductId, Product>,
        units: HashMap<UnitId, Unit>,
        cycles: HashMap<OrderCycleId, OrderCycle>,
        exchanges: Vec<Exchange>,
        fees: HashMap<FeeId, EnterpriseFee>,
    }

    impl CatalogReader for TestMarket {
        fn enterprise(&self, id: EnterpriseId) -> Option<Enterprise> {
            self.enterprises.get(&id).cloned()
        }

        fn product(&self, id: ProductId) -> Option<Product> {
            self.products.get(&id).cloned()
        }

        fn unit(&self, id: UnitId) -> Option<Unit> {
            self.units.get(&id).cloned()
        }

        fn units_of_product(&self, id: ProductId) -> Vec<Unit> {
            self.units.values().filter(|u| u.product == id).cloned().collect()
        }

        fn visibility(&self, _storefront: EnterpriseId, _unit: UnitId) -> Visibility {
            Visibility::Unset
        }

        fn explicitly_visible_units(&self, _storefront: EnterpriseId) -> Vec<UnitId> {
            Vec::new()
        }

        fn stockists_of_unit(&self, _unit: UnitId) -> Vec<EnterpriseId> {
            Vec::new()
        }
    }

    impl ExchangeReader for TestMarket {
        fn order_cycle(&self, id: OrderCycleId) -> Option<OrderCycle> {
            self.cycles.get(&id).cloned()
        }

        fn exchanges_in_cycle(&self, cycle: OrderCycleId) -> Vec<Exchange> {
            self.exchanges
                .iter()
                .filter(|e| e.order_cycle == cycle)
                .cloned()
                .collect()
        }

        fn schedule(&self, _id: ScheduleId) -> Option<Schedule> {
            None
        }

        fn distributions_of_unit(&self, unit: UnitId) -> Vec<(EnterpriseId, OrderCycleId)> {
            self.exchanges
                .iter()
                .filter(|e| e.is_outgoing() && e.carries_unit(unit))
                .map(|e| (e.receiver, e.order_cycle))
                .collect()
        }
    }

    impl FeeReader for TestMarket {
        fn fee(&self, id: FeeId) -> Option<EnterpriseFee> {
            self.fees.get(&id).cloned()
        }
    }

    struct Scenario {
        market: TestMarket,
        vendor: EnterpriseId,
        hub: EnterpriseId,
        shop: EnterpriseId,
        unit: UnitId,
        cycle: OrderCycleId,
    }

    /// Vendor supplies one $10.00 unit to a hub, which distributes it to a shop.
    fn scenario() -> Scenario {
        let mut market = TestMarket::default();
        let vendor = EnterpriseId::new();
        let hub = EnterpriseId::new();
        let shop = EnterpriseId::new();
        for (id, name) in [(vendor, "vendor"), (hub, "hub"), (shop, "shop")] {
            market.enterprises.insert(id, Enterprise::new(id, name));
        }

        let product_id = ProductId::new(EntityId::new());
        let unit = UnitId::new(EntityId::new());
        market.products.insert(
            product_id,
            Product::new(product_id, "apples", vendor, VariantUnit::Items, unit),
        );
        market.units.insert(
            unit,
            Unit::new(
                unit,
                product_id,
                VariantUnit::Items,
                Money::from_cents(1000),
                None,
                None,
                StockLevel::on_hand(10),
                true,
            )
            .unwrap(),
        );

        let cycle = OrderCycleId::new(EntityId::new());
        let now = Utc::now();
        market.cycles.insert(
            cycle,
            OrderCycle::new(cycle, "cycle", hub, now, now + Duration::days(7)),
        );

        Scenario {
            market,
            vendor,
            hub,
            shop,
            unit,
            cycle,
        }
    }

    fn add_fee(market: &mut TestMarket, owner: EnterpriseId, fee_type: FeeType, calculation: FeeCalculation) -> FeeId {
        let id = FeeId::new(EntityId::new());
        market
            .fees
            .insert(id, EnterpriseFee::new(id, owner, "fee", fee_type, calculation));
        id
    }

    #[test]
    fn vendor_flat_fee_flows_through_to_the_storefront_price() {
        let mut s = scenario();
        let fee = add_fee(
            &mut s.market,
            s.vendor,
            FeeType::Packing,
            FeeCalculation::FlatRate(Money::from_cents(123)),
        );
        s.market.exchanges.push(
            Exchange::incoming(ExchangeId::new(EntityId::new()), s.cycle, s.vendor, s.hub)
                .with_units([s.unit])
                .with_fees([fee]),
        );
        s.market.exchanges.push(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), s.cycle, s.hub, s.shop)
                .with_units([s.unit]),
        );

        let calc = FeeCalculator::new(&s.market);
        assert_eq!(
            calc.fees_for(s.unit, s.shop, s.cycle).unwrap(),
            Money::from_cents(123)
        );
        assert_eq!(
            calc.price_with_fees(s.unit, s.shop, s.cycle).unwrap(),
            Money::from_cents(1123)
        );
    }

    #[test]
    fn coordinator_fees_apply_in_addition_to_vendor_fees() {
        let mut s = scenario();
        let vendor_fee = add_fee(
            &mut s.market,
            s.vendor,
            FeeType::Packing,
            FeeCalculation::FlatRate(Money::from_cents(100)),
        );
        let hub_fee = add_fee(
            &mut s.market,
            s.hub,
            FeeType::Admin,
            FeeCalculation::FlatPercent { basis_points: 1000 },
        );
        s.market.exchanges.push(
            Exchange::incoming(ExchangeId::new(EntityId::new()), s.cycle, s.vendor, s.hub)
                .with_units([s.unit])
                .with_fees([vendor_fee]),
        );
        s.market.exchanges.push(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), s.cycle, s.hub, s.shop)
                .with_units([s.unit])
                .with_fees([hub_fee]),
        );

        let calc = FeeCalculator::new(&s.market);
        // $1.00 vendor fee + 10% of $10.00 coordinator fee
        assert_eq!(
            calc.fees_for(s.unit, s.shop, s.cycle).unwrap(),
            Money::from_cents(200)
        );

        let breakdown = calc.fees_by_type_for(s.unit, s.shop, s.cycle).unwrap();
        assert_eq!(
            breakdown,
            vec![
                FeeBreakdown {
                    fee_type: FeeType::Packing,
                    amount: Money::from_cents(100)
                },
                FeeBreakdown {
                    fee_type: FeeType::Admin,
                    amount: Money::from_cents(100)
                },
            ]
        );
    }

    #[test]
    fn repeated_calls_return_identical_amounts_and_ordering() {
        let mut s = scenario();
        let fee_a = add_fee(
            &mut s.market,
            s.hub,
            FeeType::Transport,
            FeeCalculation::PerItem(Money::from_cents(30)),
        );
        let fee_b = add_fee(
            &mut s.market,
            s.hub,
            FeeType::Admin,
            FeeCalculation::FlatRate(Money::from_cents(40)),
        );
        s.market.exchanges.push(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), s.cycle, s.hub, s.shop)
                .with_units([s.unit])
                .with_fees([fee_a, fee_b]),
        );

        let calc = FeeCalculator::new(&s.market);
        let first = calc.fees_by_type_for(s.unit, s.shop, s.cycle).unwrap();
        let second = calc.fees_by_type_for(s.unit, s.shop, s.cycle).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].fee_type, FeeType::Transport);
        assert_eq!(first[1].fee_type, FeeType::Admin);
        assert_eq!(
            calc.fees_for(s.unit, s.shop, s.cycle).unwrap(),
            calc.fees_for(s.unit, s.shop, s.cycle).unwrap()
        );
    }

    #[test]
    fn same_type_fees_accumulate_into_one_breakdown_entry() {
        let mut s = scenario();
        let fee_a = add_fee(
            &mut s.market,
            s.hub,
            FeeType::Packing,
            FeeCalculation::FlatRate(Money::from_cents(10)),
        );
        let fee_b = add_fee(
            &mut s.market,
            s.hub,
            FeeType::Packing,
            FeeCalculation::FlatRate(Money::from_cents(15)),
        );
        s.market.exchanges.push(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), s.cycle, s.hub, s.shop)
                .with_units([s.unit])
                .with_fees([fee_a, fee_b]),
        );

        let breakdown = FeeCalculator::new(&s.market)
            .fees_by_type_for(s.unit, s.shop, s.cycle)
            .unwrap();
        assert_eq!(
            breakdown,
            vec![FeeBreakdown {
                fee_type: FeeType::Packing,
                amount: Money::from_cents(25)
            }]
        );
    }

    #[test]
    fn undistributed_unit_has_zero_fees_not_an_error() {
        let s = scenario();
        // No exchanges at all: the unit is not distributed through the shop.
        let calc = FeeCalculator::new(&s.market);
        assert_eq!(calc.fees_for(s.unit, s.shop, s.cycle).unwrap(), Money::ZERO);
        assert!(calc.fees_by_type_for(s.unit, s.shop, s.cycle).unwrap().is_empty());
        assert_eq!(
            calc.price_with_fees(s.unit, s.shop, s.cycle).unwrap(),
            Money::from_cents(1000)
        );
    }

    #[test]
    fn another_vendors_incoming_fees_do_not_apply() {
        let mut s = scenario();
        let other_vendor = EnterpriseId::new();
        s.market
            .enterprises
            .insert(other_vendor, Enterprise::new(other_vendor, "other"));
        let fee = add_fee(
            &mut s.market,
            other_vendor,
            FeeType::Sales,
            FeeCalculation::FlatRate(Money::from_cents(999)),
        );
        // Incoming exchange from a different vendor that happens to list the unit.
        s.market.exchanges.push(
            Exchange::incoming(ExchangeId::new(EntityId::new()), s.cycle, other_vendor, s.hub)
                .with_units([s.unit])
                .with_fees([fee]),
        );
        s.market.exchanges.push(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), s.cycle, s.hub, s.shop)
                .with_units([s.unit]),
        );

        assert_eq!(
            FeeCalculator::new(&s.market).fees_for(s.unit, s.shop, s.cycle).unwrap(),
            Money::ZERO
        );
    }

    #[test]
    fn unknown_references_surface_not_found() {
        let s = scenario();
        let calc = FeeCalculator::new(&s.market);
        assert!(matches!(
            calc.fees_for(UnitId::new(EntityId::new()), s.shop, s.cycle),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            calc.fees_for(s.unit, EnterpriseId::new(), s.cycle),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            calc.fees_for(s.unit, s.shop, OrderCycleId::new(EntityId::new())),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn dangling_fee_reference_is_inconsistent_state() {
        let mut s = scenario();
        s.market.exchanges.push(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), s.cycle, s.hub, s.shop)
                .with_units([s.unit])
                .with_fees([FeeId::new(EntityId::new())]),
        );

        assert!(matches!(
            FeeCalculator::new(&s.market).fees_for(s.unit, s.shop, s.cycle),
            Err(DomainError::InconsistentState(_))
        ));
    }
}
