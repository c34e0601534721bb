use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceTrend: Direction of recent market movement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Rising,
    Falling,
    Stable,
    #[default]
    Unknown,
}

// ---------------------------------------------------------------------------
// PerCardCost
// ---------------------------------------------------------------------------

/// Cost line for one card touched by a change set.
///
/// `unit_price` is `None` when the market price is unknown; such lines
/// contribute nothing to the totals and are listed in
/// [`CostBreakdown::unpriced_cards`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerCardCost {
    pub card_id: String,
    pub card_name: String,
    pub quantity: u32,
    pub unit_price: Option<f64>,
    pub total_price: f64,
    pub trend: PriceTrend,
    /// `true` for cards entering the deck, `false` for displaced cards.
    pub added: bool,
}

// ---------------------------------------------------------------------------
// CostBreakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Spend required to acquire every added card.
    pub total_cost: f64,
    pub added_cost: f64,
    pub removed_value: f64,
    pub net_cost: f64,
    pub per_card_cost: Vec<PerCardCost>,
    #[serde(default)]
    pub unpriced_cards: Vec<String>,
}
