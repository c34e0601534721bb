use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::deck::Archetype;

// ---------------------------------------------------------------------------
// OptimizationConstraints: Caller-supplied hard and soft constraints
// ---------------------------------------------------------------------------

/// Constraints for a single optimization request.
///
/// `format` and `must_exclude_cards` are hard constraints: no recommended
/// card may violate them. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationConstraints {
    pub max_budget: Option<f64>,
    pub format: Option<String>,
    #[serde(default)]
    pub must_exclude_cards: BTreeSet<String>,
    /// Deck cards that must never be replaced.
    #[serde(default)]
    pub preserve_cards: BTreeSet<String>,
    pub archetype: Option<Archetype>,
    pub max_changes: Option<usize>,
    /// Per-card unit price ceiling applied during candidate search.
    pub max_price_per_card: Option<f64>,
}

impl OptimizationConstraints {
    pub fn with_budget(mut self, max_budget: f64) -> Self {
        self.max_budget = Some(max_budget);
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn excluding(mut self, card_id: &str) -> Self {
        self.must_exclude_cards.insert(card_id.to_string());
        self
    }

    pub fn preserving(mut self, card_id: &str) -> Self {
        self.preserve_cards.insert(card_id.to_string());
        self
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = Some(archetype);
        self
    }

    pub fn with_price_ceiling(mut self, ceiling: f64) -> Self {
        self.max_price_per_card = Some(ceiling);
        self
    }

    /// Returns `true` when `card_id` is excluded by the caller.
    pub fn excludes(&self, card_id: &str) -> bool {
        self.must_exclude_cards.contains(card_id)
    }
}
