//! Background cache refresher driven by the event bus.
//!
//! The synchronous invalidation path does not depend on this: the store
//! already calls the [`InvalidationSink`] inside its commit path. The
//! refresher exists for consumers that want recomputation to happen off the
//! request path — it drains a bus subscription on its own thread and hands
//! each event to a handler (which typically maps it to sink calls).
//!
//! [`InvalidationSink`]: crate::sink::InvalidationSink

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use hubcycle_events::Subscription;

/// Handle to a running refresher thread.
#[derive(Debug)]
pub struct CacheRefresher {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl CacheRefresher {
    /// Spawn a consumer thread draining `subscription`.
    ///
    /// `handle` is called once per received event; it must be idempotent
    /// (the bus is at-least-once).
    pub fn spawn<M, F>(subscription: Subscription<M>, handle: F) -> Self
    where
        M: Send + 'static,
        F: Fn(&M) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let join = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    debug!("cache refresher shutting down");
                    break;
                }
                match subscription.recv_timeout(Duration::from_millis(50)) {
                    Ok(event) => handle(&event),
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        debug!("event bus closed; cache refresher stopping");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }

    /// Request graceful shutdown and wait for the thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl Drop for CacheRefresher {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}
