//! Replacement scoring and selection.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::CardCatalog;
use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::evaluator::clamp_score;
use crate::models::{
    Card, CardChange, Deck, DeckCard, OptimizationConstraints, RankedAlternative,
    SynergyChange, SynergyDirection,
};
use crate::oracle::CardOracle;
use crate::search::CandidateSearch;
use crate::synergy::synergy;

const BASELINE: f64 = 50.0;
const MAX_HP_POINTS: f64 = 10.0;
const HP_PER_POINT: f64 = 10.0;
const EFFICIENCY_WEIGHT: f64 = 50.0;
const SYNERGY_WEIGHT: f64 = 20.0;
const EXPENSIVE_PENALTY: f64 = 30.0;
const CHEAPER_BONUS: f64 = 10.0;
const ARCHETYPE_FIT_BONUS: f64 = 15.0;
/// Smallest synergy shift reported in `synergy_changes`.
const SYNERGY_CHANGE_EPSILON: f64 = 0.05;

/// Which terms take part in replacement scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode<'m> {
    /// Every term, synergy measured against the whole deck.
    Standard,
    /// Price terms dropped.
    PowerOnly,
    /// Synergy measured only against the given core card ids.
    CoreSynergy(&'m BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementScore {
    /// 0-100.
    pub score: u8,
    /// Triggered factors in evaluation order.
    pub factors: Vec<String>,
}

impl ReplacementScore {
    /// Factors joined with `", "`.
    pub fn reasoning(&self) -> String {
        if self.factors.is_empty() {
            "closest available substitute".to_string()
        } else {
            self.factors.join(", ")
        }
    }
}

pub struct ReplacementSelector<'o, 'c, C: CardCatalog + ?Sized> {
    oracle: &'o CardOracle<'c, C>,
    config: &'o OptimizerConfig,
}

impl<'o, 'c, C: CardCatalog + ?Sized> ReplacementSelector<'o, 'c, C> {
    pub fn new(oracle: &'o CardOracle<'c, C>, config: &'o OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// Deck cards the synergy term compares against.
    fn peers<'d>(
        &self,
        current: &Card,
        candidate: &Card,
        deck: &'d Deck,
        mode: ScoringMode<'_>,
    ) -> Vec<&'d Card> {
        deck.cards
            .iter()
            .map(|dc| &dc.card)
            .filter(|c| c.id != current.id && c.id != candidate.id)
            .filter(|c| match mode {
                ScoringMode::CoreSynergy(core) => core.contains(&c.id),
                _ => true,
            })
            .collect()
    }

    /// Score `candidate` as a substitute for `current` inside `deck`.
    pub fn evaluate_replacement(
        &self,
        current: &Card,
        candidate: &Card,
        deck: &Deck,
        constraints: &OptimizationConstraints,
        mode: ScoringMode<'_>,
    ) -> Result<ReplacementScore> {
        let mut score = BASELINE;
        let mut factors = Vec::new();

        if current.is_creature() && candidate.is_creature() {
            let hp_gain = i64::from(candidate.hp()) - i64::from(current.hp());
            if hp_gain > 0 {
                score += (hp_gain as f64 / HP_PER_POINT).min(MAX_HP_POINTS);
                factors.push(format!("higher HP (+{})", hp_gain));
            }

            let before = current.damage_efficiency();
            let after = candidate.damage_efficiency();
            if after > before {
                score += (after - before) * EFFICIENCY_WEIGHT;
                factors.push(format!(
                    "better damage efficiency ({:.2} -> {:.2})",
                    before, after
                ));
            }
        }

        let peers = self.peers(current, candidate, deck, mode);
        if !peers.is_empty() {
            let improvement = peers
                .iter()
                .map(|p| synergy(candidate, p) - synergy(current, p))
                .sum::<f64>()
                / peers.len() as f64;
            let scope = match mode {
                ScoringMode::CoreSynergy(_) => "core cards",
                _ => "the deck",
            };
            if improvement > 0.0 {
                score += improvement * SYNERGY_WEIGHT;
                factors.push(format!("improves synergy with {} (+{:.2})", scope, improvement));
            } else if improvement < 0.0 {
                score += improvement * SYNERGY_WEIGHT;
                factors.push(format!("weaker synergy with {} ({:.2})", scope, improvement));
            }
        }

        let neutral = self.config.neutral_meta_relevance;
        let meta_before = self.oracle.meta_relevance(&current.id)?.unwrap_or(neutral);
        let meta_after = self.oracle.meta_relevance(&candidate.id)?.unwrap_or(neutral);
        let meta_gain = meta_after - meta_before;
        if meta_gain != 0.0 {
            score += meta_gain / 2.0;
            if meta_gain > 0.0 {
                factors.push(format!("more meta-relevant (+{:.0})", meta_gain));
            } else {
                factors.push(format!("less meta-relevant ({:.0})", meta_gain));
            }
        }

        if mode != ScoringMode::PowerOnly {
            let prices = (
                self.oracle.price(&current.id)?,
                self.oracle.price(&candidate.id)?,
            );
            if let (Some(before), Some(after)) = prices {
                let delta = after - before;
                let sensitive = constraints
                    .max_budget
                    .map(|budget| delta > budget * self.config.price_sensitivity_ratio)
                    .unwrap_or(false);
                if sensitive {
                    score -= EXPENSIVE_PENALTY;
                    factors.push(format!("significantly more expensive (+${:.2})", delta));
                } else if delta < 0.0 {
                    score += CHEAPER_BONUS;
                    factors.push(format!("more budget-friendly (-${:.2})", -delta));
                }
            }
        }

        if fits_archetype(candidate, self.config.keywords_for(deck.archetype)) {
            score += ARCHETYPE_FIT_BONUS;
            factors.push(format!("fits the {} game plan", deck.archetype));
        }

        Ok(ReplacementScore {
            score: clamp_score(score),
            factors,
        })
    }

    /// Best replacement for `deck_card` among the search candidates, with
    /// up to `config.max_alternatives` runner-ups.
    ///
    /// Returns `None` when the search finds nothing; the caller simply
    /// omits that card from the change set.
    pub fn find_best_replacement(
        &self,
        deck_card: &DeckCard,
        deck: &Deck,
        constraints: &OptimizationConstraints,
        mode: ScoringMode<'_>,
    ) -> Result<Option<CardChange>> {
        let current = &deck_card.card;
        let candidates = CandidateSearch::new(self.oracle, self.config)
            .find_candidates(current, constraints)?;
        if candidates.is_empty() {
            debug!(card = %current.id, "No replacement candidates");
            return Ok(None);
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let result = self.evaluate_replacement(current, &candidate, deck, constraints, mode)?;
            scored.push((candidate, result));
        }
        // Stable: ties keep catalog order.
        scored.sort_by(|a, b| b.1.score.cmp(&a.1.score));

        let mut ranked = scored.into_iter();
        let Some((best, best_score)) = ranked.next() else {
            return Ok(None);
        };
        let alternatives: Vec<RankedAlternative> = ranked
            .take(self.config.max_alternatives)
            .map(|(card, result)| RankedAlternative {
                reasoning: result.reasoning(),
                score: result.score,
                card,
            })
            .collect();

        debug!(
            card = %current.id,
            replacement = %best.id,
            score = best_score.score,
            "Selected replacement"
        );

        let quantity = deck.quantity_of(&current.id);
        let mut change = CardChange::replace(
            current.clone(),
            best,
            quantity,
            best_score.reasoning(),
            best_score.score,
        );
        change.synergy_changes = synergy_changes(current, &change.card, deck);
        change.alternatives = alternatives;
        Ok(Some(change))
    }
}

/// Candidate text contains any of the archetype keywords.
pub fn fits_archetype(card: &Card, keywords: &[String]) -> bool {
    let text = card.text.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
}

/// Per-deck-card synergy shifts caused by swapping `current` for `candidate`.
pub fn synergy_changes(current: &Card, candidate: &Card, deck: &Deck) -> Vec<SynergyChange> {
    deck.cards
        .iter()
        .map(|dc| &dc.card)
        .filter(|c| c.id != current.id && c.id != candidate.id)
        .filter_map(|other| {
            let previous = synergy(current, other);
            let new = synergy(candidate, other);
            if (new - previous).abs() < SYNERGY_CHANGE_EPSILON {
                return None;
            }
            Some(SynergyChange {
                affected_card_name: other.name.clone(),
                previous_synergy: previous,
                new_synergy: new,
                direction: if new > previous {
                    SynergyDirection::Improved
                } else {
                    SynergyDirection::Reduced
                },
            })
        })
        .collect()
}
