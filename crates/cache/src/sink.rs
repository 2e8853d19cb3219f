//! The centralized invalidation interface.

use std::sync::Arc;

use crate::key::CacheKey;

/// Receiver of cache invalidation triggers.
///
/// Mutations to units, exchanges and inventory overrides are scattered across
/// entity types; rather than re-deriving invalidation rules at every mutation
/// site, external collaborators (the owning persistence layer) call this one
/// interface and the cache owns all transition logic.
///
/// Implementations must not read back into the data store: the store calls
/// `invalidate` while its own write lock is held so that no reader can
/// observe a stale entry after a mutation commits.
pub trait InvalidationSink: Send + Sync {
    /// Mark the given keys stale. Cheap, lock-per-key, never blocks on
    /// recomputation.
    fn invalidate(&self, keys: &[CacheKey]);

    /// Mark stale and request an immediate recomputation (mid-cycle exchange
    /// changes must reflect without waiting for the next read). Called
    /// *after* the store's write lock is released. Recomputation failures are
    /// logged and leave the key stale; the next read retries.
    fn refresh_needed(&self, keys: &[CacheKey]);

    /// Remove the entries entirely (order-cycle close).
    fn tear_down(&self, keys: &[CacheKey]);
}

impl<S: InvalidationSink + ?Sized> InvalidationSink for Arc<S> {
    fn invalidate(&self, keys: &[CacheKey]) {
        (**self).invalidate(keys)
    }

    fn refresh_needed(&self, keys: &[CacheKey]) {
        (**self).refresh_needed(keys)
    }

    fn tear_down(&self, keys: &[CacheKey]) {
        (**self).tear_down(keys)
    }
}
