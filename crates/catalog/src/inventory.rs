//! Per-storefront visibility overrides.
//!
//! Storefronts record at most one override per (storefront, unit) pair, with
//! absence meaning "visible by default". That implicit default is made
//! explicit here as a three-valued lookup so the resolver's refinement logic
//! never has to reason about missing rows.

use serde::{Deserialize, Serialize};

/// Visibility of a unit within one storefront.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// No override recorded; the unit is visible wherever it is offered.
    #[default]
    Unset,
    /// Explicitly carried by the storefront (stockist relationship). Stronger
    /// than `Unset`: it also admits units the storefront did not source
    /// directly, as long as they are distributed in the same order cycle.
    Visible,
    /// Explicitly hidden for this storefront.
    Hidden,
}

impl Visibility {
    pub fn is_hidden(self) -> bool {
        matches!(self, Visibility::Hidden)
    }

    pub fn is_explicitly_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unset() {
        assert_eq!(Visibility::default(), Visibility::Unset);
        assert!(!Visibility::Unset.is_hidden());
        assert!(!Visibility::Unset.is_explicitly_visible());
    }
}
