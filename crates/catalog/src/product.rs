use serde::{Deserialize, Serialize};

use hubcycle_core::{EnterpriseId, Entity, EntityId};

use crate::unit::UnitId;

/// Product identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

impl ProductId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// How a product's units are measured.
///
/// Units of `Weight`/`Volume` products must carry a unit value (e.g. 500g);
/// `Items` products count discrete pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantUnit {
    None,
    Weight,
    Volume,
    Items,
}

impl VariantUnit {
    /// Whether units of this classification require an explicit unit value.
    pub fn requires_unit_value(self) -> bool {
        matches!(self, VariantUnit::Weight | VariantUnit::Volume)
    }
}

/// A sellable template. Owns one or more units; `master` is the canonical
/// unit representing the product when no variants are defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub vendor: EnterpriseId,
    pub variant_unit: VariantUnit,
    pub master: UnitId,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        vendor: EnterpriseId,
        variant_unit: VariantUnit,
        master: UnitId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            vendor,
            variant_unit,
            master,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
