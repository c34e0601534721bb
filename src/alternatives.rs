//! Alternative strategies and the upgrade-path ladder.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::CardCatalog;
use crate::config::OptimizerConfig;
use crate::cost::CostCalculator;
use crate::error::Result;
use crate::evaluator::{clamp_score, CardPerformance};
use crate::models::{
    AlternativeChange, AlternativeStrategy, Card, CardChange, CostBreakdown, Deck,
    OptimizationConstraints, UpgradePath,
};
use crate::oracle::CardOracle;
use crate::search::CandidateSearch;
use crate::selector::{ReplacementSelector, ScoringMode};

/// Average impact score of a change set, 0 when empty.
pub fn average_impact_score(changes: &[CardChange]) -> f64 {
    if changes.is_empty() {
        return 0.0;
    }
    changes.iter().map(|c| f64::from(c.impact_score)).sum::<f64>() / changes.len() as f64
}

pub struct AlternativeGenerator<'o, 'c, C: CardCatalog + ?Sized> {
    oracle: &'o CardOracle<'c, C>,
    config: &'o OptimizerConfig,
}

impl<'o, 'c, C: CardCatalog + ?Sized> AlternativeGenerator<'o, 'c, C> {
    pub fn new(oracle: &'o CardOracle<'c, C>, config: &'o OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// One replacement per underperformer, never picking the same card twice.
    fn replacements(
        &self,
        deck: &Deck,
        underperformers: &[CardPerformance],
        constraints: &OptimizationConstraints,
        mode: ScoringMode<'_>,
    ) -> Result<Vec<CardChange>> {
        let selector = ReplacementSelector::new(self.oracle, self.config);
        let mut narrowed = constraints.clone();
        let mut changes = Vec::new();
        for performance in underperformers {
            if let Some(change) =
                selector.find_best_replacement(&performance.card, deck, &narrowed, mode)?
            {
                narrowed.must_exclude_cards.insert(change.card.id.clone());
                changes.push(change);
            }
        }
        Ok(changes)
    }

    /// Budget, power and synergy variants of the primary recommendation,
    /// each computed independently. Strategies that find nothing are
    /// omitted. `impact` is left unset.
    pub fn generate(
        &self,
        deck: &Deck,
        underperformers: &[CardPerformance],
        constraints: &OptimizationConstraints,
        primary_changes: &[CardChange],
        primary_cost: &CostBreakdown,
    ) -> Result<Vec<AlternativeChange>> {
        let calculator = CostCalculator::new(self.oracle);
        let primary_score = average_impact_score(primary_changes);
        let mut alternatives = Vec::new();

        // Budget-biased
        let low = constraints.max_budget.unwrap_or(primary_cost.total_cost)
            * self.config.budget_alternative_ratio;
        if low > 0.0 {
            let mut budget = constraints.clone().with_budget(low);
            budget.max_price_per_card =
                Some(budget.max_price_per_card.map_or(low, |c| c.min(low)));
            let changes =
                self.replacements(deck, underperformers, &budget, ScoringMode::Standard)?;
            let note = format!("every card capped at ${:.2}", low);
            self.push(
                &mut alternatives,
                AlternativeStrategy::Budget,
                changes,
                note,
                primary_cost,
                primary_score,
                &calculator,
            )?;
        }

        // Power-biased
        let mut power = constraints.clone();
        power.max_budget = None;
        power.max_price_per_card = None;
        let changes = self.replacements(deck, underperformers, &power, ScoringMode::PowerOnly)?;
        self.push(
            &mut alternatives,
            AlternativeStrategy::Power,
            changes,
            "ranked without regard to price".to_string(),
            primary_cost,
            primary_score,
            &calculator,
        )?;

        // Synergy-biased
        let flagged: BTreeSet<&str> = underperformers
            .iter()
            .map(|p| p.card.card.id.as_str())
            .collect();
        let core: BTreeSet<String> = deck
            .cards
            .iter()
            .filter(|dc| dc.quantity >= self.config.core_min_quantity)
            .filter(|dc| !flagged.contains(dc.card.id.as_str()))
            .map(|dc| dc.card.id.clone())
            .collect();
        if core.is_empty() {
            debug!(deck = %deck.name, "No core cards; synergy alternative skipped");
        } else {
            let changes = self.replacements(
                deck,
                underperformers,
                constraints,
                ScoringMode::CoreSynergy(&core),
            )?;
            let note = format!("built around {} core cards", core.len());
            self.push(
                &mut alternatives,
                AlternativeStrategy::Synergy,
                changes,
                note,
                primary_cost,
                primary_score,
                &calculator,
            )?;
        }

        Ok(alternatives)
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &self,
        alternatives: &mut Vec<AlternativeChange>,
        strategy: AlternativeStrategy,
        changes: Vec<CardChange>,
        note: String,
        primary_cost: &CostBreakdown,
        primary_score: f64,
        calculator: &CostCalculator<'_, '_, C>,
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let cost = calculator.cost(&changes)?;
        let mut tradeoffs = vec![note];

        let delta = cost.total_cost - primary_cost.total_cost;
        if delta < 0.0 {
            tradeoffs.push(format!("saves ${:.2} over the primary changes", -delta));
        } else if delta > 0.0 {
            tradeoffs.push(format!("costs ${:.2} more than the primary changes", delta));
        }
        let score = average_impact_score(&changes);
        if (score - primary_score).abs() >= 1.0 {
            tradeoffs.push(format!(
                "average replacement score {:.0} vs {:.0}",
                score, primary_score
            ));
        }

        alternatives.push(AlternativeChange {
            strategy,
            changes,
            cost,
            impact: None,
            tradeoffs,
        });
        Ok(())
    }

    /// Optional spend ladder: for each configured increase, upgrade deck
    /// cards to stronger cards of the same family.
    ///
    /// Every tier is computed from the original deck. Upgrades are picked
    /// greedily by power gain while the tier's extra spend stays within
    /// its increase.
    pub fn upgrade_paths(
        &self,
        deck: &Deck,
        constraints: &OptimizationConstraints,
    ) -> Result<Vec<UpgradePath>> {
        let search = CandidateSearch::new(self.oracle, self.config);
        let calculator = CostCalculator::new(self.oracle);
        let bonus = &self.config.subtype_power_bonus;

        let mut narrowed = constraints.clone();
        narrowed.max_budget = None;
        narrowed
            .must_exclude_cards
            .extend(deck.cards.iter().map(|dc| dc.card.id.clone()));

        let mut paths = Vec::new();
        for &increase in &self.config.upgrade_tiers {
            let mut options: Vec<(Card, Card, u32, f64, f64)> = Vec::new();
            for entry in &deck.cards {
                if constraints.preserve_cards.contains(&entry.card.id) {
                    continue;
                }
                let current_price = self.oracle.price(&entry.card.id)?.unwrap_or(0.0);
                let quantity = entry.quantity.max(1);
                let max_unit = current_price + increase / f64::from(quantity);
                let current_power = entry.card.power_level(bonus);

                let mut best: Option<(Card, f64, f64)> = None;
                let candidates = search.find_family_candidates(&entry.card, &narrowed, max_unit)?;
                for candidate in candidates {
                    let gain = candidate.power_level(bonus) - current_power;
                    if gain <= 0.0 {
                        continue;
                    }
                    let Some(price) = self.oracle.price(&candidate.id)? else {
                        continue;
                    };
                    let spend = (price - current_price).max(0.0) * f64::from(quantity);
                    if best.as_ref().map_or(true, |(_, g, _)| gain > *g) {
                        best = Some((candidate, gain, spend));
                    }
                }
                if let Some((candidate, gain, spend)) = best {
                    options.push((entry.card.clone(), candidate, entry.quantity, gain, spend));
                }
            }
            options.sort_by(|a, b| b.3.total_cmp(&a.3));

            let mut spent = 0.0;
            let mut power_gain = 0.0;
            let mut used = BTreeSet::new();
            let mut changes = Vec::new();
            for (current, candidate, quantity, gain, spend) in options {
                if spent + spend > increase || used.contains(&candidate.id) {
                    continue;
                }
                spent += spend;
                power_gain += gain;
                used.insert(candidate.id.clone());
                let reasoning = format!("stronger {} card (+{:.0} power)", current.family(), gain);
                let score = clamp_score(50.0 + gain / 2.0);
                changes.push(CardChange::replace(current, candidate, quantity, reasoning, score));
            }

            if changes.is_empty() {
                debug!(increase, "No upgrades for tier");
                continue;
            }
            let cost = calculator.cost(&changes)?;
            paths.push(UpgradePath {
                budget_increase: increase,
                changes,
                cost,
                power_gain,
            });
        }
        Ok(paths)
    }
}
