//! Stock quantification.
//!
//! The question "can this unit supply N?" is answered by a [`StockPolicy`].
//! The policy is an explicit strategy seam: callers hold the marketplace
//! policy as `&dyn StockPolicy` (or use [`Unit::can_supply`] which applies it
//! directly), so there is no globally overridable stock-check routine that
//! could shadow these rules.
//!
//! [`Unit::can_supply`]: crate::unit::Unit::can_supply

use serde::{Deserialize, Serialize};

use hubcycle_core::{DomainError, DomainResult};

/// Stock-policy fields of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Physical stock on hand. Never negative in consistent data.
    pub on_hand: i64,
    /// Produced to order; supply is unlimited regardless of `on_hand`.
    pub on_demand: bool,
    /// Shortfalls may be backordered.
    pub backorderable: bool,
}

impl StockLevel {
    pub fn on_hand(quantity: i64) -> Self {
        Self {
            on_hand: quantity,
            on_demand: false,
            backorderable: false,
        }
    }

    pub fn on_demand() -> Self {
        Self {
            on_hand: 0,
            on_demand: true,
            backorderable: false,
        }
    }

    /// Reject stock data the marketplace rules cannot interpret.
    pub fn validate(&self) -> DomainResult<()> {
        if self.on_hand < 0 {
            return Err(DomainError::inconsistent(format!(
                "negative on_hand stock: {}",
                self.on_hand
            )));
        }
        Ok(())
    }
}

/// Strategy seam for stock quantification.
///
/// Pure: implementations must not read external state or have side effects.
pub trait StockPolicy: Send + Sync {
    /// Whether `stock` can satisfy a request for `requested` units.
    fn can_supply(&self, stock: &StockLevel, requested: i64) -> bool;
}

/// Marketplace stock rules, evaluated in precedence order:
///
/// 1. `on_demand` — supply is unlimited, regardless of `on_hand`;
/// 2. `on_hand >= requested`;
/// 3. `backorderable` — the shortfall will be backordered;
/// 4. otherwise the request cannot be supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketplaceStockPolicy;

impl StockPolicy for MarketplaceStockPolicy {
    fn can_supply(&self, stock: &StockLevel, requested: i64) -> bool {
        if stock.on_demand {
            return true;
        }
        if stock.on_hand >= requested {
            return true;
        }
        stock.backorderable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn can_supply(stock: StockLevel, requested: i64) -> bool {
        MarketplaceStockPolicy.can_supply(&stock, requested)
    }

    #[test]
    fn on_hand_satisfies_up_to_its_level() {
        let stock = StockLevel::on_hand(5);
        assert!(can_supply(stock, 5));
        assert!(!can_supply(stock, 6));
    }

    #[test]
    fn on_demand_ignores_on_hand() {
        let stock = StockLevel {
            on_hand: 0,
            on_demand: true,
            backorderable: false,
        };
        assert!(can_supply(stock, 1_000_000));
    }

    #[test]
    fn backorderable_covers_the_shortfall() {
        let stock = StockLevel {
            on_hand: 2,
            on_demand: false,
            backorderable: true,
        };
        assert!(can_supply(stock, 50));
    }

    #[test]
    fn exhausted_stock_refuses() {
        assert!(!can_supply(StockLevel::on_hand(0), 1));
    }

    #[test]
    fn negative_on_hand_is_inconsistent() {
        assert!(StockLevel::on_hand(-1).validate().is_err());
        assert!(StockLevel::on_hand(0).validate().is_ok());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: on-demand stock supplies any quantity.
            #[test]
            fn on_demand_supplies_everything(on_hand in -100i64..10_000, requested in 0i64..10_000) {
                let stock = StockLevel {
                    on_hand,
                    on_demand: true,
                    backorderable: false,
                };
                prop_assert!(can_supply(stock, requested));
            }

            /// Property: without on-demand/backorder, supply is exactly bounded by on_hand.
            #[test]
            fn plain_stock_is_bounded_by_on_hand(on_hand in 0i64..10_000, requested in 0i64..10_000) {
                let stock = StockLevel {
                    on_hand,
                    on_demand: false,
                    backorderable: false,
                };
                prop_assert_eq!(can_supply(stock, requested), on_hand >= requested);
            }

            /// Property: backorderable never refuses.
            #[test]
            fn backorderable_never_refuses(on_hand in 0i64..10_000, requested in 0i64..10_000) {
                let stock = StockLevel {
                    on_hand,
                    on_demand: false,
                    backorderable: true,
                };
                prop_assert!(can_supply(stock, requested));
            }
        }
    }
}
