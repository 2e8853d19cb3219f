//! Process-local [`EventBus`] backing the market store's mutation fan-out.
//!
//! Every market mutation commits, invalidates its cache keys synchronously,
//! and then announces itself here so off-request-path consumers (the cache
//! refresher above all) can react. Consumers that fall behind buffer in
//! their channel; consumers that went away are pruned on the next publish.

use std::fmt;
use std::sync::{Mutex, mpsc};

use crate::bus::{EventBus, Subscription};

#[derive(Debug)]
pub enum InMemoryBusError {
    /// The subscriber list's lock was poisoned by a panicking publisher.
    Poisoned,
}

impl fmt::Display for InMemoryBusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisoned => write!(f, "event bus subscriber list is poisoned"),
        }
    }
}

impl std::error::Error for InMemoryBusError {}

/// Channel-backed broadcast bus with no IO and no async runtime.
///
/// Each subscriber owns the receiving half of an [`mpsc`] channel; publishing
/// clones the event into every live channel. Delivery is best-effort and
/// unordered across subscribers. A mutation event observed twice re-marks an
/// already-stale availability key, which is harmless, so consumers need only
/// be idempotent.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    outlets: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions still holding their receiver at the last
    /// publish. Dropped subscribers linger until a publish prunes them.
    pub fn subscriber_count(&self) -> usize {
        self.outlets.lock().map(|outlets| outlets.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            outlets: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut outlets = self
            .outlets
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        // A send only fails when the receiver is gone; prune as we go.
        outlets.retain(|outlet| outlet.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned list means some publisher panicked mid-fan-out. The
        // subscription is still handed out; it simply never receives.
        if let Ok(mut outlets) = self.outlets.lock() {
            outlets.push(tx);
        }

        Subscription::new(rx)
    }
}
