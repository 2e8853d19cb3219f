//! `hubcycle-cache` — the availability cache.
//!
//! A keyed, invalidation-driven index mapping (storefront, order cycle) to
//! the set of unit ids currently purchasable there. Entries are derived and
//! disposable: always reconstructable from units, exchanges and inventory
//! overrides, never authoritative.
//!
//! Writes to market data are high-churn, so entries are invalidated rather
//! than incrementally patched, and recomputation is single-flighted per key.
//! All invalidation triggers funnel through one interface,
//! [`InvalidationSink`], so the transition rules live in exactly one place.

pub mod cache;
pub mod key;
pub mod refresher;
pub mod sink;
pub mod slot;

pub use cache::{Availability, AvailabilityCache, ReadPolicy};
pub use key::CacheKey;
pub use refresher::CacheRefresher;
pub use sink::InvalidationSink;
pub use slot::EntryStatus;
