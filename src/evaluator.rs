//! Per-card performance scoring inside a deck.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CardCatalog;
use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::models::{Deck, DeckCard};
use crate::oracle::CardOracle;
use crate::synergy::synergy;

const BASELINE: f64 = 50.0;
const NO_SYNERGY_PENALTY: f64 = 20.0;
const SYNERGY_WEIGHT: f64 = 20.0;
const OFF_ARCHETYPE_PENALTY: f64 = 10.0;
const LOW_EFFICIENCY_PENALTY: f64 = 15.0;
const LOW_META_PENALTY: f64 = 15.0;
const REDUNDANCY_PENALTY: f64 = 10.0;

/// Score and explanation for one deck card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPerformance {
    pub card: DeckCard,
    /// 0-100.
    pub score: u8,
    pub reasons: Vec<String>,
}

pub struct PerformanceEvaluator<'o, 'c, C: CardCatalog + ?Sized> {
    oracle: &'o CardOracle<'c, C>,
    config: &'o OptimizerConfig,
}

impl<'o, 'c, C: CardCatalog + ?Sized> PerformanceEvaluator<'o, 'c, C> {
    pub fn new(oracle: &'o CardOracle<'c, C>, config: &'o OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// Score how well `deck_card` is pulling its weight in `deck`.
    pub fn evaluate(&self, deck_card: &DeckCard, deck: &Deck) -> Result<CardPerformance> {
        let card = &deck_card.card;
        let mut score = BASELINE;
        let mut reasons = Vec::new();

        let synergies: Vec<f64> = deck
            .others(&card.id)
            .map(|other| synergy(card, &other.card))
            .collect();
        let meaningful = synergies
            .iter()
            .filter(|s| **s > self.config.meaningful_synergy)
            .count();
        if meaningful == 0 {
            score -= NO_SYNERGY_PENALTY;
            reasons.push("no significant synergies".to_string());
        } else {
            let avg = synergies.iter().sum::<f64>() / synergies.len() as f64;
            score += avg * SYNERGY_WEIGHT;
            reasons.push(format!(
                "synergizes with {} cards (avg {:.2})",
                meaningful, avg
            ));
        }

        if self.oracle.is_staple(deck.archetype, &card.id)? == Some(false) {
            score -= OFF_ARCHETYPE_PENALTY;
            reasons.push(format!("not a {} staple", deck.archetype));
        }

        if card.is_creature() {
            let efficiency = card.damage_efficiency();
            if efficiency < self.config.min_damage_efficiency {
                score -= LOW_EFFICIENCY_PENALTY;
                reasons.push(format!("low damage efficiency ({:.2})", efficiency));
            }
        }

        let meta = self
            .oracle
            .meta_relevance(&card.id)?
            .unwrap_or(self.config.neutral_meta_relevance);
        if meta < self.config.low_meta_relevance {
            score -= LOW_META_PENALTY;
            reasons.push(format!("low meta relevance ({:.0})", meta));
        }

        let copies = deck.quantity_of(&card.id);
        if copies > self.config.redundancy_copies && !card.is_resource() {
            score -= REDUNDANCY_PENALTY;
            reasons.push(format!("possible redundancy ({} copies)", copies));
        }

        Ok(CardPerformance {
            card: deck_card.clone(),
            score: clamp_score(score),
            reasons,
        })
    }

    /// Every deck card scoring below the underperformer threshold, worst first.
    ///
    /// Callers truncate to `config.max_underperformers` before searching.
    pub fn identify_underperformers(&self, deck: &Deck) -> Result<Vec<CardPerformance>> {
        let mut flagged = Vec::new();
        for deck_card in &deck.cards {
            let performance = self.evaluate(deck_card, deck)?;
            debug!(
                card = %deck_card.card.id,
                score = performance.score,
                "Evaluated card"
            );
            if performance.score < self.config.underperformer_threshold {
                flagged.push(performance);
            }
        }
        flagged.sort_by_key(|p| p.score);
        Ok(flagged)
    }
}

/// Round and clamp a raw score into `0..=100`.
pub(crate) fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
