//! The in-memory market store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use tracing::{debug, warn};

use hubcycle_cache::{CacheKey, InvalidationSink};
use hubcycle_catalog::{
    CatalogEvent, CatalogReader, Enterprise, Product, ProductId, StockLevel, Unit, UnitId,
    Visibility,
};
use hubcycle_core::{DomainError, DomainResult, EnterpriseId, Money};
use hubcycle_distribution::{
    DistributionEvent, Exchange, ExchangeId, ExchangeReader, OrderCycle, OrderCycleId, Schedule,
    ScheduleId,
};
use hubcycle_events::{EventBus, InMemoryEventBus, Subscription};
use hubcycle_fees::{EnterpriseFee, FeeId, FeeReader};

use crate::event::MarketEvent;

#[derive(Default)]
struct MarketState {
    enterprises: HashMap<EnterpriseId, Enterprise>,
    products: HashMap<ProductId, Product>,
    units: HashMap<UnitId, Unit>,
    order_cycles: HashMap<OrderCycleId, OrderCycle>,
    schedules: HashMap<ScheduleId, Schedule>,
    /// Insertion-ordered: this order is the fee aggregator's discovery order.
    exchanges: Vec<Exchange>,
    visibility: HashMap<(EnterpriseId, UnitId), Visibility>,
    fees: HashMap<FeeId, EnterpriseFee>,
}

impl MarketState {
    fn unit(&self, id: UnitId) -> DomainResult<&Unit> {
        self.units
            .get(&id)
            .ok_or_else(|| DomainError::not_found("unit", id))
    }

    fn exchange_mut(&mut self, id: ExchangeId) -> DomainResult<&mut Exchange> {
        self.exchanges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::not_found("exchange", id))
    }

    /// Every storefront snapshot any of `units` can appear in: one key per
    /// (receiver, cycle) of an outgoing exchange carrying one of them, plus
    /// one key per (stockist, cycle) for storefronts holding an explicit
    /// `Visible` override on a unit distributed in that cycle. Deduplicated,
    /// in exchange insertion order.
    fn keys_for_units(&self, units: &[UnitId]) -> Vec<CacheKey> {
        let mut keys = Vec::new();
        for exchange in &self.exchanges {
            if !exchange.is_outgoing() {
                continue;
            }
            if units.iter().any(|u| exchange.carries_unit(*u)) {
                let key = CacheKey::new(exchange.receiver, exchange.order_cycle);
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        for ((storefront, unit), visibility) in &self.visibility {
            if !visibility.is_explicitly_visible() || !units.contains(unit) {
                continue;
            }
            for exchange in &self.exchanges {
                if exchange.is_outgoing() && exchange.carries_unit(*unit) {
                    let key = CacheKey::new(*storefront, exchange.order_cycle);
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
        keys
    }

    /// Cache keys governed by a unit's exchange memberships.
    ///
    /// A master unit whose product has non-master units stands for nothing on
    /// its own: the variants' memberships are authoritative, so their keys
    /// are collected instead.
    fn affected_keys(&self, unit: &Unit) -> Vec<CacheKey> {
        let governing: Vec<UnitId> = if unit.is_master {
            let siblings: Vec<UnitId> = self
                .units
                .values()
                .filter(|u| u.product == unit.product && !u.is_master)
                .map(|u| u.id)
                .collect();
            if siblings.is_empty() {
                vec![unit.id]
            } else {
                siblings
            }
        } else {
            vec![unit.id]
        };
        self.keys_for_units(&governing)
    }
}

/// Reference owner of all market data the core consumes.
///
/// All reads go through the reader traits; all writes go through the mutation
/// API below. Each mutation validates first and only then applies, so a
/// failed call leaves the store untouched. Affected cache keys are pushed to
/// the registered [`InvalidationSink`]s while the write lock is still held:
/// by the time the mutating call returns, no reader can be served a cache
/// entry that predates the mutation. Eager recomputation (`refresh_needed`)
/// happens after the lock is released, since rebuilding reads back through
/// the reader traits.
pub struct InMemoryMarket {
    state: RwLock<MarketState>,
    sinks: Mutex<Vec<Arc<dyn InvalidationSink>>>,
    bus: InMemoryEventBus<MarketEvent>,
}

impl Default for InMemoryMarket {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMarket {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MarketState::default()),
            sinks: Mutex::new(Vec::new()),
            bus: InMemoryEventBus::new(),
        }
    }

    /// Register a receiver of invalidation triggers (normally the
    /// availability cache). Sinks are called synchronously from mutations.
    pub fn register_sink(&self, sink: Arc<dyn InvalidationSink>) {
        self.sinks.lock().unwrap().push(sink);
    }

    /// Subscribe to the mutation event stream (background consumers).
    pub fn subscribe(&self) -> Subscription<MarketEvent> {
        self.bus.subscribe()
    }

    fn each_sink(&self, f: impl Fn(&dyn InvalidationSink)) {
        for sink in self.sinks.lock().unwrap().iter() {
            f(sink.as_ref());
        }
    }

    fn publish(&self, event: impl Into<MarketEvent>) {
        if let Err(err) = self.bus.publish(event.into()) {
            warn!(?err, "market event publish failed");
        }
    }

    // --- record creation ------------------------------------------------

    pub fn insert_enterprise(&self, enterprise: Enterprise) {
        self.state
            .write()
            .unwrap()
            .enterprises
            .insert(enterprise.id, enterprise);
    }

    /// Create a product together with its master unit.
    pub fn create_product(&self, product: Product, master: Unit) -> DomainResult<()> {
        if master.product != product.id || product.master != master.id {
            return Err(DomainError::inconsistent(
                "master unit and product do not reference each other",
            ));
        }
        if !master.is_master {
            return Err(DomainError::validation(
                "master unit must be flagged is_master",
            ));
        }
        let mut state = self.state.write().unwrap();
        if !state.enterprises.contains_key(&product.vendor) {
            return Err(DomainError::not_found("vendor", product.vendor));
        }
        state.units.insert(master.id, master);
        state.products.insert(product.id, product);
        Ok(())
    }

    /// Add a non-master unit (variant) to an existing product.
    pub fn add_unit(&self, unit: Unit) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        if !state.products.contains_key(&unit.product) {
            return Err(DomainError::not_found("product", unit.product));
        }
        if state.units.contains_key(&unit.id) {
            return Err(DomainError::conflict(format!(
                "unit {} already exists",
                unit.id
            )));
        }
        state.units.insert(unit.id, unit);
        Ok(())
    }

    pub fn insert_order_cycle(&self, cycle: OrderCycle) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        if !state.enterprises.contains_key(&cycle.coordinator) {
            return Err(DomainError::not_found("coordinator", cycle.coordinator));
        }
        state.order_cycles.insert(cycle.id, cycle);
        Ok(())
    }

    pub fn insert_schedule(&self, schedule: Schedule) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        for cycle in &schedule.order_cycles {
            if !state.order_cycles.contains_key(cycle) {
                return Err(DomainError::not_found("order cycle", cycle));
            }
        }
        state.schedules.insert(schedule.id, schedule);
        Ok(())
    }

    pub fn insert_fee(&self, fee: EnterpriseFee) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        if !state.enterprises.contains_key(&fee.enterprise) {
            return Err(DomainError::not_found("enterprise", fee.enterprise));
        }
        state.fees.insert(fee.id, fee);
        Ok(())
    }

    pub fn insert_exchange(&self, exchange: Exchange) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        if !state.order_cycles.contains_key(&exchange.order_cycle) {
            return Err(DomainError::not_found("order cycle", exchange.order_cycle));
        }
        for side in [exchange.sender, exchange.receiver] {
            if !state.enterprises.contains_key(&side) {
                return Err(DomainError::not_found("enterprise", side));
            }
        }
        for unit in &exchange.units {
            state.unit(*unit)?;
        }
        for fee in &exchange.fees {
            if !state.fees.contains_key(fee) {
                return Err(DomainError::not_found("fee", fee));
            }
        }
        state.exchanges.push(exchange);
        Ok(())
    }

    // --- unit mutation --------------------------------------------------

    pub fn set_price(&self, unit_id: UnitId, price: Money) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        let unit = state
            .units
            .get_mut(&unit_id)
            .ok_or_else(|| DomainError::not_found("unit", unit_id))?;
        unit.price = price;
        let snapshot = unit.clone();
        let keys = state.affected_keys(&snapshot);
        self.each_sink(|s| s.invalidate(&keys));
        drop(state);

        self.publish(CatalogEvent::UnitPriceChanged {
            unit: unit_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn set_stock(&self, unit_id: UnitId, stock: StockLevel) -> DomainResult<()> {
        self.update_stock(unit_id, |current| *current = stock)
    }

    pub fn set_on_hand(&self, unit_id: UnitId, quantity: i64) -> DomainResult<()> {
        self.update_stock(unit_id, |stock| stock.on_hand = quantity)
    }

    pub fn set_on_demand(&self, unit_id: UnitId, on_demand: bool) -> DomainResult<()> {
        self.update_stock(unit_id, |stock| stock.on_demand = on_demand)
    }

    /// Apply a stock change, rejecting levels the marketplace rules cannot
    /// interpret before anything commits.
    fn update_stock(
        &self,
        unit_id: UnitId,
        apply: impl FnOnce(&mut StockLevel),
    ) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        let unit = state
            .units
            .get_mut(&unit_id)
            .ok_or_else(|| DomainError::not_found("unit", unit_id))?;
        let mut stock = unit.stock;
        apply(&mut stock);
        stock.validate()?;
        unit.stock = stock;
        let snapshot = unit.clone();
        let keys = state.affected_keys(&snapshot);
        self.each_sink(|s| s.invalidate(&keys));
        drop(state);

        self.publish(CatalogEvent::UnitStockChanged {
            unit: unit_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Record (or clear, with `Visibility::Unset`) a storefront's visibility
    /// override for a unit.
    ///
    /// A `Visible` override can admit the unit into the storefront's snapshot
    /// for any cycle that distributes it, even through another storefront's
    /// exchange, so the invalidated keys pair *this* storefront with every
    /// cycle the unit flows through.
    pub fn set_visibility(
        &self,
        storefront: EnterpriseId,
        unit_id: UnitId,
        visibility: Visibility,
    ) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        if !state.enterprises.contains_key(&storefront) {
            return Err(DomainError::not_found("storefront", storefront));
        }
        state.unit(unit_id)?;
        match visibility {
            Visibility::Unset => {
                state.visibility.remove(&(storefront, unit_id));
            }
            _ => {
                state.visibility.insert((storefront, unit_id), visibility);
            }
        }

        let mut keys = Vec::new();
        for exchange in &state.exchanges {
            if exchange.is_outgoing() && exchange.carries_unit(unit_id) {
                let key = CacheKey::new(storefront, exchange.order_cycle);
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        self.each_sink(|s| s.invalidate(&keys));
        drop(state);

        self.publish(CatalogEvent::VisibilityChanged {
            storefront,
            unit: unit_id,
            visibility,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Mark a unit deleted without removing its record. Idempotent.
    pub fn soft_delete_unit(&self, unit_id: UnitId) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        let unit = state
            .units
            .get_mut(&unit_id)
            .ok_or_else(|| DomainError::not_found("unit", unit_id))?;
        if unit.is_deleted() {
            return Ok(());
        }
        unit.deleted_at = Some(Utc::now());
        let snapshot = unit.clone();
        let keys = state.affected_keys(&snapshot);
        self.each_sink(|s| s.invalidate(&keys));
        drop(state);

        self.publish(CatalogEvent::UnitSoftDeleted {
            unit: unit_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Permanently remove a unit.
    ///
    /// Destroying a master unit destroys the whole product: every sibling
    /// unit is removed with it. All removed units are first detached from
    /// their exchanges and the affected keys invalidated, then the records
    /// are deleted — a concurrent snapshot rebuild either sees the units
    /// fully present or fully gone, never a dangling membership.
    pub fn destroy_unit(&self, unit_id: UnitId) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        let unit = state.unit(unit_id)?.clone();
        let targets: Vec<UnitId> = if unit.is_master {
            state
                .units
                .values()
                .filter(|u| u.product == unit.product)
                .map(|u| u.id)
                .collect()
        } else {
            vec![unit.id]
        };
        let keys = state.keys_for_units(&targets);

        for exchange in &mut state.exchanges {
            for target in &targets {
                exchange.remove_unit(*target);
            }
        }
        self.each_sink(|s| s.invalidate(&keys));

        for target in &targets {
            state.units.remove(target);
            state.visibility.retain(|(_, u), _| u != target);
        }
        if unit.is_master {
            state.products.remove(&unit.product);
        }
        drop(state);

        debug!(unit = %unit_id, destroyed = targets.len(), "destroyed unit(s)");
        let occurred_at = Utc::now();
        for target in targets {
            self.publish(CatalogEvent::UnitDestroyed {
                unit: target,
                occurred_at,
            });
        }
        Ok(())
    }

    // --- exchange mutation ----------------------------------------------

    pub fn add_unit_to_exchange(&self, exchange_id: ExchangeId, unit_id: UnitId) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        state.unit(unit_id)?;
        let exchange = state.exchange_mut(exchange_id)?;
        let changed = exchange.add_unit(unit_id);
        let outgoing = exchange.is_outgoing();
        let receiver = exchange.receiver;
        let cycle_id = exchange.order_cycle;
        if !changed {
            return Ok(());
        }
        self.finish_membership_change(state, outgoing, receiver, cycle_id)
    }

    pub fn remove_unit_from_exchange(
        &self,
        exchange_id: ExchangeId,
        unit_id: UnitId,
    ) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        let exchange = state.exchange_mut(exchange_id)?;
        let changed = exchange.remove_unit(unit_id);
        let outgoing = exchange.is_outgoing();
        let receiver = exchange.receiver;
        let cycle_id = exchange.order_cycle;
        if !changed {
            return Ok(());
        }
        self.finish_membership_change(state, outgoing, receiver, cycle_id)
    }

    /// Commit an exchange membership change: invalidate under the lock, then
    /// (outgoing exchanges of an open cycle only) request an eager rebuild
    /// once the lock is gone, so mid-cycle edits reflect without waiting for
    /// the next read.
    fn finish_membership_change(
        &self,
        state: std::sync::RwLockWriteGuard<'_, MarketState>,
        outgoing: bool,
        receiver: EnterpriseId,
        cycle_id: OrderCycleId,
    ) -> DomainResult<()> {
        if !outgoing {
            // Incoming memberships feed fee qualification, which is computed
            // on demand; no snapshot depends on them.
            return Ok(());
        }
        let key = CacheKey::new(receiver, cycle_id);
        let now = Utc::now();
        let open = state
            .order_cycles
            .get(&cycle_id)
            .map(|c| c.open_at(now))
            .unwrap_or(false);
        self.each_sink(|s| s.invalidate(&[key]));
        drop(state);

        self.publish(DistributionEvent::ExchangeMembersChanged {
            storefront: receiver,
            order_cycle: cycle_id,
            occurred_at: now,
        });
        if open {
            self.each_sink(|s| s.refresh_needed(&[key]));
        }
        Ok(())
    }

    /// Close a cycle: clamp `closes_at` to now and tear the cycle's cached
    /// snapshots down entirely (they will not be read again).
    pub fn close_order_cycle(&self, cycle_id: OrderCycleId) -> DomainResult<()> {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let cycle = state
            .order_cycles
            .get_mut(&cycle_id)
            .ok_or_else(|| DomainError::not_found("order cycle", cycle_id))?;
        if cycle.closes_at > now {
            cycle.closes_at = now;
        }
        let mut keys = Vec::new();
        for exchange in &state.exchanges {
            if exchange.order_cycle == cycle_id && exchange.is_outgoing() {
                let key = CacheKey::new(exchange.receiver, cycle_id);
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        self.each_sink(|s| s.tear_down(&keys));
        drop(state);

        self.publish(DistributionEvent::OrderCycleClosed {
            order_cycle: cycle_id,
            occurred_at: now,
        });
        Ok(())
    }
}

// --- reader impls --------------------------------------------------------

impl CatalogReader for InMemoryMarket {
    fn enterprise(&self, id: EnterpriseId) -> Option<Enterprise> {
        self.state.read().unwrap().enterprises.get(&id).cloned()
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        self.state.read().unwrap().products.get(&id).cloned()
    }

    fn unit(&self, id: UnitId) -> Option<Unit> {
        self.state.read().unwrap().units.get(&id).cloned()
    }

    fn units_of_product(&self, id: ProductId) -> Vec<Unit> {
        self.state
            .read()
            .unwrap()
            .units
            .values()
            .filter(|u| u.product == id)
            .cloned()
            .collect()
    }

    fn visibility(&self, storefront: EnterpriseId, unit: UnitId) -> Visibility {
        self.state
            .read()
            .unwrap()
            .visibility
            .get(&(storefront, unit))
            .copied()
            .unwrap_or_default()
    }

    fn explicitly_visible_units(&self, storefront: EnterpriseId) -> Vec<UnitId> {
        self.state
            .read()
            .unwrap()
            .visibility
            .iter()
            .filter(|((sf, _), v)| *sf == storefront && v.is_explicitly_visible())
            .map(|((_, unit), _)| *unit)
            .collect()
    }

    fn stockists_of_unit(&self, unit: UnitId) -> Vec<EnterpriseId> {
        self.state
            .read()
            .unwrap()
            .visibility
            .iter()
            .filter(|((_, u), v)| *u == unit && v.is_explicitly_visible())
            .map(|((storefront, _), _)| *storefront)
            .collect()
    }
}

impl ExchangeReader for InMemoryMarket {
    fn order_cycle(&self, id: OrderCycleId) -> Option<OrderCycle> {
        self.state.read().unwrap().order_cycles.get(&id).cloned()
    }

    fn exchanges_in_cycle(&self, cycle: OrderCycleId) -> Vec<Exchange> {
        self.state
            .read()
            .unwrap()
            .exchanges
            .iter()
            .filter(|e| e.order_cycle == cycle)
            .cloned()
            .collect()
    }

    fn schedule(&self, id: ScheduleId) -> Option<Schedule> {
        self.state.read().unwrap().schedules.get(&id).cloned()
    }

    fn distributions_of_unit(&self, unit: UnitId) -> Vec<(EnterpriseId, OrderCycleId)> {
        self.state
            .read()
            .unwrap()
            .exchanges
            .iter()
            .filter(|e| e.is_outgoing() && e.carries_unit(unit))
            .map(|e| (e.receiver, e.order_cycle))
            .collect()
    }
}

impl FeeReader for InMemoryMarket {
    fn fee(&self, id: FeeId) -> Option<EnterpriseFee> {
        self.state.read().unwrap().fees.get(&id).cloned()
    }
}
