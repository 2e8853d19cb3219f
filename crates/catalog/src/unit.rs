use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hubcycle_core::{DomainError, DomainResult, Entity, EntityId, Money};

use crate::product::{ProductId, VariantUnit};
use crate::stock::{MarketplaceStockPolicy, StockLevel, StockPolicy};

/// Unit (variant) identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub EntityId);

impl UnitId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for UnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A specific purchasable instance of a product.
///
/// Soft deletion is a marker, not removal: a soft-deleted unit still exists in
/// the data set (orders may reference it) but must never be offered or appear
/// in an availability snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub product: ProductId,
    pub price: Money,
    /// Measured size in the product's variant unit (e.g. grams), required for
    /// weight/volume products.
    pub unit_value: Option<f64>,
    pub unit_description: Option<String>,
    pub stock: StockLevel,
    pub is_master: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Unit {
    /// Build a unit, enforcing the unit-value presence rule for the owning
    /// product's classification.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: UnitId,
        product: ProductId,
        variant_unit: VariantUnit,
        price: Money,
        unit_value: Option<f64>,
        unit_description: Option<String>,
        stock: StockLevel,
        is_master: bool,
    ) -> DomainResult<Self> {
        if variant_unit.requires_unit_value() && unit_value.is_none() {
            return Err(DomainError::validation(format!(
                "unit value can't be blank for {variant_unit:?} products"
            )));
        }
        stock.validate()?;
        Ok(Self {
            id,
            product,
            price,
            unit_value,
            unit_description,
            stock,
            is_master,
            deleted_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether this unit can satisfy a request for `requested` units,
    /// under the marketplace stock policy.
    pub fn can_supply(&self, requested: i64) -> bool {
        MarketplaceStockPolicy.can_supply(&self.stock, requested)
    }

    /// Whether a single unit can be supplied right now.
    pub fn in_stock(&self) -> bool {
        self.can_supply(1)
    }
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
