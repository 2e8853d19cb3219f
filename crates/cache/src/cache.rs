//! The availability cache proper.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use hubcycle_core::{DomainError, DomainResult};
use hubcycle_catalog::{CatalogReader, UnitId};
use hubcycle_distribution::{DistributionResolver, ExchangeReader};

use crate::key::CacheKey;
use crate::sink::InvalidationSink;
use crate::slot::{EntryStatus, Slot, SlotState, Snapshot};

/// What a reader gets while a recomputation for the key is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Block until the in-flight recomputation publishes a fresh snapshot.
    #[default]
    WaitForFresh,
    /// Return the previous snapshot (marked not fresh) when one exists;
    /// block only when there is nothing to serve.
    ServeStale,
}

/// A cache read result.
#[derive(Debug, Clone)]
pub struct Availability {
    pub units: Snapshot,
    /// False only under [`ReadPolicy::ServeStale`], when the returned
    /// snapshot predates an in-flight recomputation.
    pub fresh: bool,
}

/// Keyed availability index over externally-owned market data.
///
/// The cache is the only shared mutable resource in the core; units,
/// exchanges and inventory overrides are read-mostly data it consumes through
/// `R`. Entries are built lazily on first read, invalidated on mutation and
/// torn down on order-cycle close.
pub struct AvailabilityCache<R> {
    reader: R,
    policy: ReadPolicy,
    slots: Mutex<HashMap<CacheKey, Arc<Slot>>>,
}

impl<R> AvailabilityCache<R>
where
    R: CatalogReader + ExchangeReader,
{
    pub fn new(reader: R, policy: ReadPolicy) -> Self {
        Self {
            reader,
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The set of units purchasable at the key's storefront in its cycle.
    ///
    /// Builds the entry if absent or stale. At most one recomputation per key
    /// is ever in flight: the thread that transitions the slot to building
    /// computes, everyone else waits or is served the previous snapshot per
    /// the read policy. Invalidations arriving during the build set a dirty
    /// bit that forces a follow-up pass before the result is published.
    ///
    /// On recomputation failure the slot is restored to its previous state —
    /// errors are surfaced, never cached.
    pub fn read(&self, key: CacheKey) -> DomainResult<Availability> {
        let slot = self.slot(key);
        let mut state = slot.state.lock().unwrap();

        loop {
            match &*state {
                Some(SlotState::Valid { snapshot }) => {
                    return Ok(Availability {
                        units: Arc::clone(snapshot),
                        fresh: true,
                    });
                }
                Some(SlotState::Building { previous, .. }) => {
                    if self.policy == ReadPolicy::ServeStale
                        && let Some(previous) = previous
                    {
                        return Ok(Availability {
                            units: Arc::clone(previous),
                            fresh: false,
                        });
                    }
                    state = slot.cond.wait(state).unwrap();
                }
                None | Some(SlotState::Stale { .. }) => {
                    let previous = match state.take() {
                        Some(SlotState::Stale { snapshot }) => Some(snapshot),
                        _ => None,
                    };
                    *state = Some(SlotState::Building {
                        previous: previous.clone(),
                        dirty: false,
                    });
                    return self.build(key, &slot, state, previous);
                }
            }
        }
    }

    /// Invalidate and immediately rebuild the key.
    pub fn refresh(&self, key: CacheKey) -> DomainResult<Availability> {
        self.slot(key).invalidate();
        self.read(key)
    }

    /// Invalidate every key the unit appears in.
    ///
    /// For a master unit whose product has non-master units, the non-master
    /// units' own exchange memberships are authoritative, so their keys are
    /// invalidated instead of the master's.
    pub fn invalidate_unit(&self, unit: UnitId) -> DomainResult<()> {
        let keys = self.keys_for_unit(unit)?;
        self.mark_stale(&keys);
        Ok(())
    }

    /// Drop the entry for a closed cycle's key entirely.
    pub fn tear_down(&self, key: CacheKey) {
        let removed = self.slots.lock().unwrap().remove(&key);
        if let Some(slot) = removed {
            // Wake any waiters parked on the removed slot; they will re-fetch
            // and find the key absent.
            slot.cond.notify_all();
        }
        debug!(%key, "tore down cache entry");
    }

    /// Current lifecycle status of a key (diagnostics).
    pub fn status(&self, key: CacheKey) -> EntryStatus {
        match self.slots.lock().unwrap().get(&key) {
            None => EntryStatus::Absent,
            Some(slot) => slot.status(),
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Run the recomputation loop for a key this thread has just transitioned
    /// to building. Consumes the held lock guard; re-runs while dirty.
    fn build<'a>(
        &self,
        key: CacheKey,
        slot: &'a Slot,
        mut state: std::sync::MutexGuard<'a, Option<SlotState>>,
        previous: Option<Snapshot>,
    ) -> DomainResult<Availability> {
        loop {
            drop(state);
            let result = self.recompute(key);
            state = slot.state.lock().unwrap();

            match result {
                Ok(units) => {
                    let dirty = matches!(&*state, Some(SlotState::Building { dirty: true, .. }));
                    let snapshot: Snapshot = Arc::new(units);
                    if dirty {
                        // An invalidation landed mid-build; the result is
                        // already stale. Publish nothing and run another pass.
                        *state = Some(SlotState::Building {
                            previous: Some(snapshot),
                            dirty: false,
                        });
                        continue;
                    }
                    *state = Some(SlotState::Valid {
                        snapshot: Arc::clone(&snapshot),
                    });
                    slot.cond.notify_all();
                    debug!(%key, count = snapshot.len(), "published availability snapshot");
                    return Ok(Availability {
                        units: snapshot,
                        fresh: true,
                    });
                }
                Err(err) => {
                    // Never cache an error: restore the pre-build state so the
                    // key is retried on the next read or invalidation.
                    *state = previous.map(|snapshot| SlotState::Stale { snapshot });
                    slot.cond.notify_all();
                    warn!(%key, error = %err, "availability recomputation failed");
                    return Err(err);
                }
            }
        }
    }

    /// Visible units of the key that can supply at least one unit.
    fn recompute(&self, key: CacheKey) -> DomainResult<BTreeSet<UnitId>> {
        let resolver = DistributionResolver::new(&self.reader);
        let visible = resolver.visible_units(key.storefront, key.order_cycle)?;

        let mut available = BTreeSet::new();
        for unit_id in visible {
            let unit = self.reader.unit(unit_id).ok_or_else(|| {
                DomainError::inconsistent(format!("visible unit {unit_id} does not exist"))
            })?;
            unit.stock.validate()?;
            if unit.can_supply(1) {
                available.insert(unit_id);
            }
        }
        Ok(available)
    }

    fn keys_for_unit(&self, unit: UnitId) -> DomainResult<Vec<CacheKey>> {
        let record = self
            .reader
            .unit(unit)
            .ok_or_else(|| DomainError::not_found("unit", unit))?;

        let governing: Vec<UnitId> = if record.is_master {
            let siblings: Vec<UnitId> = self
                .reader
                .units_of_product(record.product)
                .into_iter()
                .filter(|u| !u.is_master)
                .map(|u| u.id)
                .collect();
            if siblings.is_empty() {
                vec![record.id]
            } else {
                siblings
            }
        } else {
            vec![record.id]
        };

        let mut keys = BTreeSet::new();
        for unit_id in governing {
            let mut cycles = BTreeSet::new();
            for (storefront, order_cycle) in self.reader.distributions_of_unit(unit_id) {
                keys.insert(CacheKey::new(storefront, order_cycle));
                cycles.insert(order_cycle);
            }
            // Stockist snapshots include the unit without sourcing it: pair
            // every storefront carrying it explicitly with every cycle it is
            // distributed in.
            for stockist in self.reader.stockists_of_unit(unit_id) {
                for order_cycle in &cycles {
                    keys.insert(CacheKey::new(stockist, *order_cycle));
                }
            }
        }
        Ok(keys.into_iter().collect())
    }

    fn mark_stale(&self, keys: &[CacheKey]) {
        for key in keys {
            if let Some(slot) = self.existing_slot(*key) {
                slot.invalidate();
                debug!(key = %key, "invalidated cache key");
            }
        }
    }

    fn slot(&self, key: CacheKey) -> Arc<Slot> {
        Arc::clone(self.slots.lock().unwrap().entry(key).or_default())
    }

    /// Like [`Self::slot`] but without creating absent entries (invalidation
    /// of an absent key is a no-op, not a slot allocation).
    fn existing_slot(&self, key: CacheKey) -> Option<Arc<Slot>> {
        self.slots.lock().unwrap().get(&key).map(Arc::clone)
    }
}

impl<R> InvalidationSink for AvailabilityCache<R>
where
    R: CatalogReader + ExchangeReader + Send + Sync,
{
    fn invalidate(&self, keys: &[CacheKey]) {
        self.mark_stale(keys);
    }

    fn refresh_needed(&self, keys: &[CacheKey]) {
        self.mark_stale(keys);
        for key in keys {
            // Storefront listings must reflect exchange changes without
            // waiting for the next read. A failure here leaves the key stale;
            // the next read retries and surfaces the error to its caller.
            if let Err(err) = self.read(*key) {
                warn!(%key, error = %err, "eager recomputation failed; key left stale");
            }
        }
    }

    fn tear_down(&self, keys: &[CacheKey]) {
        for key in keys {
            AvailabilityCache::tear_down(self, *key);
        }
    }
}
