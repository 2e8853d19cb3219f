//! `hubcycle-distribution` — order cycles, exchanges and the resolver.
//!
//! An **order cycle** is a bounded trading window. Supply moves through it
//! along directed **exchanges**: incoming (vendor → coordinator) and outgoing
//! (coordinator → storefront). Only outgoing exchanges make units purchasable
//! by customers; the [`DistributionResolver`] computes, for a storefront and
//! cycle, exactly which units those are.

pub mod event;
pub mod exchange;
pub mod order_cycle;
pub mod reader;
pub mod resolver;

pub use event::DistributionEvent;
pub use exchange::{Exchange, ExchangeDirection, ExchangeId, FeeId};
pub use order_cycle::{OrderCycle, OrderCycleId, Schedule, ScheduleId};
pub use reader::ExchangeReader;
pub use resolver::DistributionResolver;
