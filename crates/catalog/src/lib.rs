//! `hubcycle-catalog` — products, sellable units and stock semantics.
//!
//! A **product** is a sellable template owned by a vendor enterprise; its
//! purchasable instances are **units** (variants). Exactly one unit per
//! product is the canonical *master*, standing in for the product when no
//! variants are defined. Stock questions ("can this unit supply N?") are
//! answered by an explicit [`StockPolicy`] so marketplace semantics
//! (on-demand, backorder) are authoritative rather than any generic
//! store-supply default.

pub mod enterprise;
pub mod event;
pub mod inventory;
pub mod product;
pub mod reader;
pub mod stock;
pub mod unit;

pub use enterprise::Enterprise;
pub use event::CatalogEvent;
pub use inventory::Visibility;
pub use product::{Product, ProductId, VariantUnit};
pub use reader::CatalogReader;
pub use stock::{MarketplaceStockPolicy, StockLevel, StockPolicy};
pub use unit::{Unit, UnitId};
