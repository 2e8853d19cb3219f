//! `hubcycle-fees` — enterprise fees and the fee aggregator.
//!
//! Vendors and coordinators attach fee schedules to the exchanges units flow
//! through. The [`FeeCalculator`] composes every fee applying to a (unit,
//! storefront, order cycle) triple — vendor fees *and* coordinator fees,
//! additively — into a deterministic total and breakdown.

pub mod calculator;
pub mod fee;

pub use calculator::{FeeBreakdown, FeeCalculator};
pub use fee::{EnterpriseFee, FeeCalculation, FeeReader, FeeType};

pub use hubcycle_distribution::FeeId;
