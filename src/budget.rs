//! Greedy budget fitting.
//!
//! Two bounded loops share one substitution rule: a replacement is accepted
//! only when its price is known, it is strictly cheaper than what it
//! displaces, and it still scores at least `min_acceptable_score` as a
//! substitute. Under that rule the measured cost never increases between
//! iterations, and both loops stop at `budget_iterations`.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::catalog::CardCatalog;
use crate::config::OptimizerConfig;
use crate::cost::CostCalculator;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::impact::apply_changes;
use crate::models::{
    BudgetStatus, Card, CardChange, ChangeAction, CostBreakdown, Deck, OptimizationConstraints,
};
use crate::oracle::CardOracle;
use crate::search::CandidateSearch;
use crate::selector::{ReplacementScore, ReplacementSelector, ScoringMode};

/// Outcome of [`BudgetOptimizer::fit_budget`].
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetFit {
    pub changes: Vec<CardChange>,
    pub cost: CostBreakdown,
    /// Loop iterations run.
    pub iterations: usize,
    /// `total_cost` before the loop and after each iteration.
    pub cost_history: Vec<f64>,
    pub status: BudgetStatus,
}

/// Outcome of [`BudgetOptimizer::fit_deck_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct VariantFit {
    pub changes: Vec<CardChange>,
    pub value_before: f64,
    pub value_after: f64,
    pub iterations: usize,
    pub status: BudgetStatus,
}

/// A cheaper card accepted as a substitute.
struct Substitute {
    card: Card,
    unit_price: f64,
    score: ReplacementScore,
}

pub struct BudgetOptimizer<'o, 'c, C: CardCatalog + ?Sized> {
    oracle: &'o CardOracle<'c, C>,
    config: &'o OptimizerConfig,
}

impl<'o, 'c, C: CardCatalog + ?Sized> BudgetOptimizer<'o, 'c, C> {
    pub fn new(oracle: &'o CardOracle<'c, C>, config: &'o OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    fn status(budget: f64, measured: f64) -> BudgetStatus {
        if measured <= budget {
            BudgetStatus::Within { budget }
        } else {
            BudgetStatus::NotReached {
                budget,
                overage: measured - budget,
            }
        }
    }

    /// Per-card ceiling for substitutes: a share of the budget, further
    /// capped by any caller-supplied ceiling.
    fn ceiling(&self, budget: f64, constraints: &OptimizationConstraints) -> f64 {
        let share = (budget * self.config.per_card_ceiling_ratio).max(0.0);
        constraints
            .max_price_per_card
            .map_or(share, |c| c.min(share))
    }

    /// Best acceptable card that can stand in for `target` at a unit price
    /// strictly below `below` and at or below `ceiling`.
    ///
    /// Candidates are scored as substitutes for `displaced` (the card that
    /// originally sat in the deck). Ties go to the cheaper card.
    #[allow(clippy::too_many_arguments)]
    fn cheaper_substitute(
        &self,
        target: &Card,
        displaced: &Card,
        below: f64,
        ceiling: f64,
        deck: &Deck,
        constraints: &OptimizationConstraints,
        taken: &BTreeSet<String>,
    ) -> Result<Option<Substitute>> {
        let mut narrowed = constraints.clone();
        narrowed.max_price_per_card = Some(ceiling);
        narrowed.must_exclude_cards.extend(taken.iter().cloned());
        narrowed.must_exclude_cards.insert(displaced.id.clone());

        let candidates = CandidateSearch::new(self.oracle, self.config)
            .find_candidates(target, &narrowed)?;
        let selector = ReplacementSelector::new(self.oracle, self.config);

        let mut best: Option<Substitute> = None;
        for candidate in candidates {
            let Some(unit_price) = self.oracle.price(&candidate.id)? else {
                continue;
            };
            if unit_price >= below || unit_price > ceiling {
                continue;
            }
            let score = selector.evaluate_replacement(
                displaced,
                &candidate,
                deck,
                constraints,
                ScoringMode::Standard,
            )?;
            if score.score < self.config.min_acceptable_score {
                continue;
            }
            let better = match best {
                None => true,
                Some(ref b) => {
                    score.score > b.score.score
                        || (score.score == b.score.score && unit_price < b.unit_price)
                }
            };
            if better {
                best = Some(Substitute {
                    card: candidate,
                    unit_price,
                    score,
                });
            }
        }
        Ok(best)
    }

    /// Swap expensive changes for cheaper substitutes until the change set's
    /// total cost fits `max_budget` or the iteration cap is hit.
    ///
    /// Falling short is not an error: the result carries
    /// `BudgetStatus::NotReached` with the residual overage.
    pub fn fit_budget(
        &self,
        deck: &Deck,
        initial_changes: Vec<CardChange>,
        max_budget: f64,
        constraints: &OptimizationConstraints,
        deadline: &Deadline,
    ) -> Result<BudgetFit> {
        let calculator = CostCalculator::new(self.oracle);
        let mut changes = initial_changes;
        let mut cost = calculator.cost(&changes)?;
        let mut cost_history = vec![cost.total_cost];
        let mut iterations = 0;
        let ceiling = self.ceiling(max_budget, constraints);

        while cost.total_cost > max_budget && iterations < self.config.budget_iterations {
            deadline.check()?;

            let mut ranked = Vec::with_capacity(changes.len());
            for (index, change) in changes.iter().enumerate() {
                ranked.push((index, calculator.change_cost(change)?));
            }
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (index, change_cost) in ranked.into_iter().take(self.config.expensive_per_iteration)
            {
                if change_cost <= 0.0 {
                    continue;
                }
                let change = &changes[index];
                let quantity = change.quantity.max(1);
                let taken: BTreeSet<String> = changes.iter().map(|c| c.card.id.clone()).collect();
                let displaced = change.current_card.as_ref().unwrap_or(&change.card);
                let below = change_cost / f64::from(quantity);

                let Some(substitute) = self.cheaper_substitute(
                    &change.card,
                    displaced,
                    below,
                    ceiling,
                    deck,
                    constraints,
                    &taken,
                )?
                else {
                    continue;
                };

                debug!(
                    from = %change.card.id,
                    to = %substitute.card.id,
                    unit_price = substitute.unit_price,
                    "Budget substitution"
                );
                let reasoning = format!("budget substitute: {}", substitute.score.reasoning());
                let spliced = match change.action {
                    ChangeAction::Replace => CardChange::replace(
                        displaced.clone(),
                        substitute.card,
                        change.quantity,
                        reasoning,
                        substitute.score.score,
                    ),
                    _ => CardChange::add(
                        substitute.card,
                        change.quantity,
                        reasoning,
                        substitute.score.score,
                    ),
                };
                changes[index] = spliced;
            }

            cost = calculator.cost(&changes)?;
            cost_history.push(cost.total_cost);
            iterations += 1;
            debug!(
                iteration = iterations,
                total_cost = cost.total_cost,
                budget = max_budget,
                "Budget iteration"
            );
        }

        let status = Self::status(max_budget, cost.total_cost);
        match &status {
            BudgetStatus::NotReached { overage, .. } => {
                warn!(iterations, overage = *overage, budget = max_budget, "Budget not reached")
            }
            _ => info!(iterations, total_cost = cost.total_cost, "Budget satisfied"),
        }

        Ok(BudgetFit {
            changes,
            cost,
            iterations,
            cost_history,
            status,
        })
    }

    /// Replace the most valuable cards of `deck` with acceptable cheaper
    /// substitutes until the projected deck value fits `target`.
    pub fn fit_deck_value(
        &self,
        deck: &Deck,
        target: f64,
        constraints: &OptimizationConstraints,
        deadline: &Deadline,
    ) -> Result<VariantFit> {
        let calculator = CostCalculator::new(self.oracle);
        let value_before = calculator.deck_value(deck)?.total;
        let ceiling = self.ceiling(target, constraints);

        let mut changes: Vec<CardChange> = Vec::new();
        let mut projected = deck.clone();
        let mut value = value_before;
        let mut iterations = 0;

        while value > target && iterations < self.config.budget_iterations {
            deadline.check()?;

            let mut ranked = Vec::with_capacity(projected.cards.len());
            for entry in &projected.cards {
                if let Some(price) = self.oracle.price(&entry.card.id)? {
                    ranked.push((entry.clone(), price));
                }
            }
            ranked.sort_by(|a, b| {
                (b.1 * f64::from(b.0.quantity)).total_cmp(&(a.1 * f64::from(a.0.quantity)))
            });

            for (entry, unit_price) in ranked.into_iter().take(self.config.expensive_per_iteration)
            {
                if constraints.preserve_cards.contains(&entry.card.id) {
                    continue;
                }
                let existing = changes.iter().position(|c| c.card.id == entry.card.id);
                let displaced = existing
                    .and_then(|i| changes[i].current_card.clone())
                    .unwrap_or_else(|| entry.card.clone());
                let mut taken: BTreeSet<String> =
                    projected.cards.iter().map(|dc| dc.card.id.clone()).collect();
                taken.extend(changes.iter().map(|c| c.card.id.clone()));

                let Some(substitute) = self.cheaper_substitute(
                    &entry.card,
                    &displaced,
                    unit_price,
                    ceiling,
                    deck,
                    constraints,
                    &taken,
                )?
                else {
                    continue;
                };

                debug!(
                    from = %entry.card.id,
                    to = %substitute.card.id,
                    unit_price = substitute.unit_price,
                    "Variant substitution"
                );
                let change = CardChange::replace(
                    displaced,
                    substitute.card,
                    entry.quantity,
                    format!("cheaper substitute: {}", substitute.score.reasoning()),
                    substitute.score.score,
                );
                match existing {
                    Some(i) => changes[i] = change,
                    None => changes.push(change),
                }
            }

            projected = apply_changes(deck, &changes);
            value = calculator.deck_value(&projected)?.total;
            iterations += 1;
            debug!(iteration = iterations, value, target, "Variant iteration");
        }

        Ok(VariantFit {
            changes,
            value_before,
            value_after: value,
            iterations,
            status: Self::status(target, value),
        })
    }
}
