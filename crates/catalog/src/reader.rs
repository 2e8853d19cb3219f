//! Read access to catalog records.
//!
//! Persistence of products and units is owned by the host service; the core
//! only ever reads them through this trait. Methods return owned clones —
//! records are small and callers must not observe later mutations.

use hubcycle_core::EnterpriseId;

use crate::enterprise::Enterprise;
use crate::inventory::Visibility;
use crate::product::{Product, ProductId};
use crate::unit::{Unit, UnitId};

pub trait CatalogReader {
    fn enterprise(&self, id: EnterpriseId) -> Option<Enterprise>;

    fn product(&self, id: ProductId) -> Option<Product>;

    fn unit(&self, id: UnitId) -> Option<Unit>;

    /// All units of a product, master included.
    fn units_of_product(&self, id: ProductId) -> Vec<Unit>;

    /// Visibility override for a (storefront, unit) pair; `Unset` when no
    /// override is recorded.
    fn visibility(&self, storefront: EnterpriseId, unit: UnitId) -> Visibility;

    /// Units the storefront explicitly carries (`Visibility::Visible`
    /// overrides), in no particular order.
    fn explicitly_visible_units(&self, storefront: EnterpriseId) -> Vec<UnitId>;

    /// Storefronts holding a `Visibility::Visible` override for the unit
    /// (the reverse of [`Self::explicitly_visible_units`]). Stockist
    /// snapshots include units they never sourced, so unit-scoped
    /// invalidation must reach these storefronts too.
    fn stockists_of_unit(&self, unit: UnitId) -> Vec<EnterpriseId>;
}

impl<T: CatalogReader + ?Sized> CatalogReader for std::sync::Arc<T> {
    fn enterprise(&self, id: EnterpriseId) -> Option<Enterprise> {
        (**self).enterprise(id)
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        (**self).product(id)
    }

    fn unit(&self, id: UnitId) -> Option<Unit> {
        (**self).unit(id)
    }

    fn units_of_product(&self, id: ProductId) -> Vec<Unit> {
        (**self).units_of_product(id)
    }

    fn visibility(&self, storefront: EnterpriseId, unit: UnitId) -> Visibility {
        (**self).visibility(storefront, unit)
    }

    fn explicitly_visible_units(&self, storefront: EnterpriseId) -> Vec<UnitId> {
        (**self).explicitly_visible_units(storefront)
    }

    fn stockists_of_unit(&self, unit: UnitId) -> Vec<EnterpriseId> {
        (**self).stockists_of_unit(unit)
    }
}
