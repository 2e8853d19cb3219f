use serde::{Deserialize, Serialize};

use hubcycle_core::{EnterpriseId, Entity};

/// An enterprise participating in the marketplace.
///
/// Roles (vendor, coordinator, storefront) are not fixed attributes; they are
/// implied by the direction of the exchanges an enterprise takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enterprise {
    pub id: EnterpriseId,
    pub name: String,
}

impl Enterprise {
    pub fn new(id: EnterpriseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Enterprise {
    type Id = EnterpriseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
