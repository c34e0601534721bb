//! Tunable engine parameters.
//!
//! Every threshold used by the scoring and search components lives here with
//! its default value. Callers may override any of them by deserializing an
//! [`OptimizerConfig`] from JSON; missing fields fall back to the defaults.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::models::Archetype;

pub const DEFAULT_BUDGET_ITERATIONS: usize = 10;
pub const DEFAULT_PER_CARD_CEILING_RATIO: f64 = 0.10;
pub const DEFAULT_CANDIDATE_CAP: usize = 20;
pub const MAX_COPIES_PER_CARD: u32 = 4;

/// Keywords that signal a card fits an archetype's game plan.
pub fn archetype_keywords() -> BTreeMap<Archetype, Vec<String>> {
    let table: [(Archetype, &[&str]); 4] = [
        (Archetype::Aggro, &["damage", "attack", "quick", "haste", "extra damage"]),
        (Archetype::Control, &["discard", "prevent", "switch", "heal", "return"]),
        (Archetype::Combo, &["search", "draw", "evolve", "attach", "combo"]),
        (Archetype::Midrange, &["draw", "heal", "energy", "search"]),
    ];
    table
        .into_iter()
        .map(|(archetype, words)| (archetype, words.iter().map(|w| w.to_string()).collect()))
        .collect()
}

/// Power bonus granted by subtype markers in the power-level heuristic.
pub fn subtype_power_bonus() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("Basic".to_string(), 0.0),
        ("Stage 1".to_string(), 15.0),
        ("Stage 2".to_string(), 30.0),
        ("ex".to_string(), 50.0),
        ("GX".to_string(), 50.0),
        ("V".to_string(), 40.0),
        ("VMAX".to_string(), 80.0),
        ("VSTAR".to_string(), 70.0),
    ])
}

// ---------------------------------------------------------------------------
// BudgetTier
// ---------------------------------------------------------------------------

/// Named spending bracket used when building a deck from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTier {
    pub name: String,
    /// Inclusive upper bound of the bracket.
    pub max_budget: f64,
    pub archetype: Archetype,
}

fn default_budget_tiers() -> Vec<BudgetTier> {
    vec![
        BudgetTier {
            name: "budget".to_string(),
            max_budget: 50.0,
            archetype: Archetype::Aggro,
        },
        BudgetTier {
            name: "mid".to_string(),
            max_budget: 150.0,
            archetype: Archetype::Midrange,
        },
        BudgetTier {
            name: "competitive".to_string(),
            max_budget: 400.0,
            archetype: Archetype::Control,
        },
        BudgetTier {
            name: "unlimited".to_string(),
            max_budget: f64::MAX,
            archetype: Archetype::Combo,
        },
    ]
}

// ---------------------------------------------------------------------------
// DeckComposition
// ---------------------------------------------------------------------------

/// Card counts per role used by deck building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeckComposition {
    pub creatures: u32,
    pub support: u32,
    pub resources: u32,
}

impl Default for DeckComposition {
    fn default() -> Self {
        Self {
            creatures: 16,
            support: 30,
            resources: 14,
        }
    }
}

// ---------------------------------------------------------------------------
// OptimizerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerConfig {
    // -- Performance evaluation --
    pub underperformer_threshold: u8,
    pub max_underperformers: usize,
    pub meaningful_synergy: f64,
    pub min_damage_efficiency: f64,
    pub low_meta_relevance: f64,
    pub neutral_meta_relevance: f64,
    pub redundancy_copies: u32,

    // -- Candidate search --
    pub candidate_cap: usize,
    pub meta_candidates: usize,
    pub hp_window: u32,

    // -- Replacement scoring --
    pub price_sensitivity_ratio: f64,
    pub min_acceptable_score: u8,
    pub max_alternatives: usize,
    pub archetype_keywords: BTreeMap<Archetype, Vec<String>>,

    // -- Impact --
    pub matchup_significance: f64,
    pub analyze_alternatives: bool,

    // -- Budget optimizer --
    pub budget_iterations: usize,
    pub per_card_ceiling_ratio: f64,
    pub expensive_per_iteration: usize,

    // -- Alternatives / upgrade paths --
    pub budget_alternative_ratio: f64,
    pub core_min_quantity: u32,
    pub upgrade_tiers: Vec<f64>,
    pub subtype_power_bonus: BTreeMap<String, f64>,

    // -- Deck building --
    pub budget_tiers: Vec<BudgetTier>,
    pub composition: DeckComposition,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            underperformer_threshold: 50,
            max_underperformers: 5,
            meaningful_synergy: 0.6,
            min_damage_efficiency: 0.6,
            low_meta_relevance: 30.0,
            neutral_meta_relevance: 50.0,
            redundancy_copies: 3,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            meta_candidates: 5,
            hp_window: 30,
            price_sensitivity_ratio: 0.20,
            min_acceptable_score: 40,
            max_alternatives: 3,
            archetype_keywords: archetype_keywords(),
            matchup_significance: 5.0,
            analyze_alternatives: false,
            budget_iterations: DEFAULT_BUDGET_ITERATIONS,
            per_card_ceiling_ratio: DEFAULT_PER_CARD_CEILING_RATIO,
            expensive_per_iteration: 3,
            budget_alternative_ratio: 0.5,
            core_min_quantity: 3,
            upgrade_tiers: vec![25.0, 50.0, 100.0],
            subtype_power_bonus: subtype_power_bonus(),
            budget_tiers: default_budget_tiers(),
            composition: DeckComposition::default(),
        }
    }
}

impl OptimizerConfig {
    /// Parse a config from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.budget_iterations == 0 {
            return Err(OptimizerError::InvalidArgument(
                "budgetIterations must be at least 1".to_string(),
            ));
        }
        if !(self.per_card_ceiling_ratio > 0.0 && self.per_card_ceiling_ratio <= 1.0) {
            return Err(OptimizerError::InvalidArgument(format!(
                "perCardCeilingRatio must be in (0, 1], got {}",
                self.per_card_ceiling_ratio
            )));
        }
        if self.budget_tiers.is_empty() {
            return Err(OptimizerError::InvalidArgument(
                "at least one budget tier is required".to_string(),
            ));
        }
        if self.underperformer_threshold > 100 || self.min_acceptable_score > 100 {
            return Err(OptimizerError::InvalidArgument(
                "score thresholds must be within 0-100".to_string(),
            ));
        }
        Ok(())
    }

    /// The tier whose bracket contains `budget`, or the last tier.
    pub fn tier_for(&self, budget: f64) -> Option<&BudgetTier> {
        self.budget_tiers
            .iter()
            .find(|t| budget <= t.max_budget)
            .or_else(|| self.budget_tiers.last())
    }

    pub fn keywords_for(&self, archetype: Archetype) -> &[String] {
        self.archetype_keywords
            .get(&archetype)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
