//! Domain event distribution.
//!
//! Mutations to market data (units, exchanges, inventory overrides) are
//! announced as events so that background consumers — most importantly the
//! availability-cache refresher — can react without the mutation path knowing
//! who listens.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
