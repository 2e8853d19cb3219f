//! `hubcycle-store` — in-memory market data with cache coordination.
//!
//! The core treats units, exchanges and inventory overrides as
//! externally-owned, read-mostly data. [`InMemoryMarket`] is the reference
//! owner of that data: it implements every reader trait, and its mutation
//! API is where the availability cache's invalidation hooks are wired in —
//! every committing mutation computes its affected cache keys and calls the
//! registered sinks before a subsequent read can observe stale state.

pub mod event;
pub mod market;

pub use event::MarketEvent;
pub use market::InMemoryMarket;
