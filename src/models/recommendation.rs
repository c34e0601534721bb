use serde::{Deserialize, Serialize};

use super::analysis::ImpactAnalysis;
use super::card::Card;
use super::price::CostBreakdown;

// ---------------------------------------------------------------------------
// CardChange: Atomic recommendation unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Add,
    Remove,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynergyDirection {
    Improved,
    Reduced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyChange {
    pub affected_card_name: String,
    pub previous_synergy: f64,
    pub new_synergy: f64,
    pub direction: SynergyDirection,
}

/// Runner-up candidate kept next to a chosen replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAlternative {
    pub card: Card,
    pub score: u8,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardChange {
    pub action: ChangeAction,
    pub card: Card,
    /// Card being displaced; set only for `Replace`.
    pub current_card: Option<Card>,
    pub quantity: u32,
    pub reasoning: String,
    /// 0-100.
    pub impact_score: u8,
    #[serde(default)]
    pub synergy_changes: Vec<SynergyChange>,
    #[serde(default)]
    pub alternatives: Vec<RankedAlternative>,
}

impl CardChange {
    pub fn add(card: Card, quantity: u32, reasoning: String, impact_score: u8) -> Self {
        Self {
            action: ChangeAction::Add,
            card,
            current_card: None,
            quantity,
            reasoning,
            impact_score,
            synergy_changes: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    pub fn remove(card: Card, quantity: u32, reasoning: String) -> Self {
        Self {
            action: ChangeAction::Remove,
            card,
            current_card: None,
            quantity,
            reasoning,
            impact_score: 0,
            synergy_changes: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    pub fn replace(
        current: Card,
        card: Card,
        quantity: u32,
        reasoning: String,
        impact_score: u8,
    ) -> Self {
        Self {
            action: ChangeAction::Replace,
            card,
            current_card: Some(current),
            quantity,
            reasoning,
            impact_score,
            synergy_changes: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Id of the deck card this change displaces, if any.
    pub fn displaced_id(&self) -> Option<&str> {
        match self.action {
            ChangeAction::Replace => self.current_card.as_ref().map(|c| c.id.as_str()),
            ChangeAction::Remove => Some(self.card.id.as_str()),
            ChangeAction::Add => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AlternativeChange: Strategy variants returned next to the primary set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlternativeStrategy {
    Budget,
    Power,
    Synergy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeChange {
    pub strategy: AlternativeStrategy,
    pub changes: Vec<CardChange>,
    pub cost: CostBreakdown,
    pub impact: Option<ImpactAnalysis>,
    /// Tradeoffs relative to the primary change set.
    #[serde(default)]
    pub tradeoffs: Vec<String>,
}

// ---------------------------------------------------------------------------
// UpgradePath: One rung of the optional spend ladder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePath {
    /// Extra spend allowed for this tier on top of the deck's current value.
    pub budget_increase: f64,
    pub changes: Vec<CardChange>,
    pub cost: CostBreakdown,
    /// Sum of power-level gains over all upgrades in this tier.
    pub power_gain: f64,
}

// ---------------------------------------------------------------------------
// DeckRecommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum BudgetStatus {
    Unconstrained,
    Within { budget: f64 },
    NotReached { budget: f64, overage: f64 },
}

impl BudgetStatus {
    pub fn is_reached(&self) -> bool {
        !matches!(self, BudgetStatus::NotReached { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecommendation {
    pub suggested_changes: Vec<CardChange>,
    /// Ordered explanation log.
    pub reasoning: Vec<String>,
    pub impact_analysis: ImpactAnalysis,
    pub cost_analysis: CostBreakdown,
    #[serde(default)]
    pub alternatives: Vec<AlternativeChange>,
    #[serde(default)]
    pub upgrade_paths: Vec<UpgradePath>,
    pub budget_status: BudgetStatus,
    pub deck_value_before: f64,
    pub deck_value_after: f64,
    pub difficulty_rating: u8,
    pub meta_relevance: u8,
    pub confidence: u8,
}
