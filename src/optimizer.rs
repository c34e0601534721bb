//! Request operations of [`DeckOptimizer`].
//!
//! Each operation creates a request-scoped [`CardOracle`], runs the
//! component pipeline against it and assembles a [`DeckRecommendation`].
//! "No improvement found" and "budget not reached" are successful results
//! explained in `reasoning`, not errors.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::alternatives::{average_impact_score, AlternativeGenerator};
use crate::analyzer::DeckAnalyzer;
use crate::budget::BudgetOptimizer;
use crate::catalog::{CardCatalog, CardFilter};
use crate::config::MAX_COPIES_PER_CARD;
use crate::cost::CostCalculator;
use crate::deadline::Deadline;
use crate::error::{OptimizerError, Result};
use crate::evaluator::{clamp_score, PerformanceEvaluator};
use crate::impact::{apply_changes, ImpactAnalyzer};
use crate::models::{
    Archetype, BudgetStatus, Card, CardChange, CardRole, ChangeAction, CostBreakdown, Deck,
    DeckAnalysis, DeckRecommendation, ImpactAnalysis, OptimizationConstraints,
};
use crate::oracle::CardOracle;
use crate::selector::{fits_archetype, ReplacementSelector, ScoringMode};
use crate::DeckOptimizer;

const NET_COST_DIFFICULTY_THRESHOLD: f64 = 100.0;
const STAPLE_BONUS: f64 = 20.0;
const KEYWORD_BONUS: f64 = 10.0;

fn base_difficulty(archetype: Archetype) -> f64 {
    match archetype {
        Archetype::Aggro => 30.0,
        Archetype::Midrange => 45.0,
        Archetype::Control => 60.0,
        Archetype::Combo => 70.0,
    }
}

fn difficulty(archetype: Archetype, changes: usize, net_cost: f64) -> u8 {
    let mut rating = base_difficulty(archetype) + 5.0 * changes as f64;
    if net_cost > NET_COST_DIFFICULTY_THRESHOLD {
        rating += 10.0;
    }
    clamp_score(rating)
}

fn confidence(
    changes: &[CardChange],
    status: &BudgetStatus,
    cost: &CostBreakdown,
    impact: &ImpactAnalysis,
) -> u8 {
    let mut confidence = average_impact_score(changes);
    if !status.is_reached() {
        confidence -= 15.0;
    }
    if !cost.unpriced_cards.is_empty() {
        confidence -= 10.0;
    }
    if impact.overall_delta > 0.0 {
        confidence += 10.0;
    } else if impact.overall_delta < 0.0 {
        confidence -= 10.0;
    }
    clamp_score(confidence)
}

fn budget_line(status: &BudgetStatus, iterations: Option<usize>) -> Option<String> {
    match status {
        BudgetStatus::Unconstrained => None,
        BudgetStatus::Within { budget } => Some(format!("Changes fit the ${:.2} budget", budget)),
        BudgetStatus::NotReached { budget, overage } => Some(match iterations {
            Some(n) => format!(
                "Budget of ${:.2} not reached after {} iterations; over by ${:.2}",
                budget, n, overage
            ),
            None => format!("Budget of ${:.2} not reached; over by ${:.2}", budget, overage),
        }),
    }
}

fn change_line(change: &CardChange) -> String {
    match change.current_card {
        Some(ref current) => format!(
            "Replace {} x{} with {}: {}",
            current.name, change.quantity, change.card.name, change.reasoning
        ),
        None => format!(
            "{} {} x{}: {}",
            match change.action {
                ChangeAction::Remove => "Remove",
                _ => "Add",
            },
            change.card.name,
            change.quantity,
            change.reasoning
        ),
    }
}

/// A recommendation with no changes.
fn no_change(
    reasoning: Vec<String>,
    budget: Option<f64>,
    deck_value: f64,
    baseline: &DeckAnalysis,
) -> DeckRecommendation {
    DeckRecommendation {
        suggested_changes: Vec::new(),
        reasoning,
        impact_analysis: ImpactAnalysis::default(),
        cost_analysis: CostBreakdown::default(),
        alternatives: Vec::new(),
        upgrade_paths: Vec::new(),
        budget_status: match budget {
            Some(budget) if budget >= 0.0 => BudgetStatus::Within { budget },
            Some(budget) => BudgetStatus::NotReached {
                budget,
                overage: -budget,
            },
            None => BudgetStatus::Unconstrained,
        },
        deck_value_before: deck_value,
        deck_value_after: deck_value,
        difficulty_rating: 0,
        meta_relevance: clamp_score(baseline.scores.meta_relevance),
        confidence: 0,
    }
}

impl<C: CardCatalog, A: DeckAnalyzer> DeckOptimizer<C, A> {
    /// Build a deck from `(card id, quantity)` pairs, failing with
    /// `NotFound` on the first id the catalog does not know.
    pub fn resolve_deck(
        &self,
        name: &str,
        archetype: Archetype,
        entries: &[(&str, u32)],
    ) -> Result<Deck> {
        let oracle = CardOracle::new(&self.catalog);
        let mut deck = Deck::new(name, archetype);
        for (id, quantity) in entries {
            deck = deck.with_card(oracle.card(id)?, *quantity);
        }
        Ok(deck)
    }

    /// Recommend replacements for the deck's weakest cards.
    pub fn optimize_deck(
        &self,
        deck: &Deck,
        constraints: &OptimizationConstraints,
    ) -> Result<DeckRecommendation> {
        self.optimize_deck_with_deadline(deck, constraints, &self.default_deadline())
    }

    pub fn optimize_deck_with_deadline(
        &self,
        deck: &Deck,
        constraints: &OptimizationConstraints,
        deadline: &Deadline,
    ) -> Result<DeckRecommendation> {
        if let Some(budget) = constraints.max_budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(OptimizerError::InvalidArgument(format!(
                    "budget must be a finite non-negative amount, got {}",
                    budget
                )));
            }
        }
        let oracle = CardOracle::new(&self.catalog);
        let impact = ImpactAnalyzer::new(&self.analyzer, &self.config);
        let calculator = CostCalculator::new(&oracle);

        let mut constraints = constraints.clone();
        if constraints.format.is_none() {
            constraints.format = deck.format.clone();
        }
        let mut deck = deck.clone();
        if let Some(archetype) = constraints.archetype {
            deck.archetype = archetype;
        }
        info!(
            deck = %deck.name,
            archetype = %deck.archetype,
            cards = deck.total_cards(),
            budget = ?constraints.max_budget,
            "Optimizing deck"
        );

        let baseline = impact.analyze(&deck, deadline)?;
        let deck_value = calculator.deck_value(&deck)?.total;

        let limit = constraints
            .max_changes
            .map_or(self.config.max_underperformers, |m| {
                m.min(self.config.max_underperformers)
            });
        let mut underperformers = PerformanceEvaluator::new(&oracle, &self.config)
            .identify_underperformers(&deck)?;
        underperformers.retain(|p| !constraints.preserve_cards.contains(&p.card.card.id));
        underperformers.truncate(limit);
        info!(count = underperformers.len(), "Underperformers identified");

        if underperformers.is_empty() {
            return Ok(no_change(
                vec![format!(
                    "No cards scored below {}; no changes suggested",
                    self.config.underperformer_threshold
                )],
                constraints.max_budget,
                deck_value,
                &baseline,
            ));
        }

        let selector = ReplacementSelector::new(&oracle, &self.config);
        let mut search = constraints.clone();
        search
            .must_exclude_cards
            .extend(deck.cards.iter().map(|dc| dc.card.id.clone()));
        // Alternatives may reuse the primary picks; each strategy runs on its own.
        let alternative_constraints = search.clone();
        let mut changes = Vec::new();
        for performance in &underperformers {
            match selector.find_best_replacement(
                &performance.card,
                &deck,
                &search,
                ScoringMode::Standard,
            )? {
                Some(change) => {
                    search.must_exclude_cards.insert(change.card.id.clone());
                    changes.push(change);
                }
                None => debug!(card = %performance.card.card.id, "No replacement found"),
            }
        }

        if changes.is_empty() {
            let names: Vec<&str> = underperformers
                .iter()
                .map(|p| p.card.card.name.as_str())
                .collect();
            return Ok(no_change(
                vec![format!(
                    "No replacement candidates satisfy the constraints for: {}",
                    names.join(", ")
                )],
                constraints.max_budget,
                deck_value,
                &baseline,
            ));
        }

        let mut iterations = None;
        let budget_status = match constraints.max_budget {
            Some(max_budget) => {
                let fit = BudgetOptimizer::new(&oracle, &self.config).fit_budget(
                    &deck,
                    changes,
                    max_budget,
                    &search,
                    deadline,
                )?;
                changes = fit.changes;
                iterations = Some(fit.iterations);
                fit.status
            }
            None => BudgetStatus::Unconstrained,
        };

        let cost_analysis = calculator.cost(&changes)?;
        let (impact_analysis, updated) = impact.impact_of(&deck, &changes, &baseline, deadline)?;

        let generator = AlternativeGenerator::new(&oracle, &self.config);
        let mut alternatives = generator.generate(
            &deck,
            &underperformers,
            &alternative_constraints,
            &changes,
            &cost_analysis,
        )?;
        if self.config.analyze_alternatives {
            for alternative in alternatives.iter_mut() {
                let (delta, _) =
                    impact.impact_of(&deck, &alternative.changes, &baseline, deadline)?;
                alternative.impact = Some(delta);
            }
        }
        let upgrade_paths = generator.upgrade_paths(&deck, &constraints)?;

        let deck_value_after = calculator.deck_value(&apply_changes(&deck, &changes))?.total;

        let mut reasoning = vec![format!(
            "{} underperforming cards identified (score below {})",
            underperformers.len(),
            self.config.underperformer_threshold
        )];
        reasoning.extend(changes.iter().map(change_line));
        reasoning.extend(budget_line(&budget_status, iterations));
        if !cost_analysis.unpriced_cards.is_empty() {
            reasoning.push(format!(
                "Prices unknown for: {}",
                cost_analysis.unpriced_cards.join(", ")
            ));
        }
        reasoning.push(format!(
            "Projected overall score change: {:+.1}",
            impact_analysis.overall_delta
        ));

        Ok(DeckRecommendation {
            difficulty_rating: difficulty(deck.archetype, changes.len(), cost_analysis.net_cost),
            meta_relevance: clamp_score(updated.scores.meta_relevance),
            confidence: confidence(&changes, &budget_status, &cost_analysis, &impact_analysis),
            suggested_changes: changes,
            reasoning,
            impact_analysis,
            cost_analysis,
            alternatives,
            upgrade_paths,
            budget_status,
            deck_value_before: deck_value,
            deck_value_after,
        })
    }

    /// Assemble a new deck that fits `max_budget`.
    pub fn build_budget_deck(
        &self,
        max_budget: f64,
        constraints: &OptimizationConstraints,
    ) -> Result<DeckRecommendation> {
        self.build_budget_deck_with_deadline(max_budget, constraints, &self.default_deadline())
    }

    pub fn build_budget_deck_with_deadline(
        &self,
        max_budget: f64,
        constraints: &OptimizationConstraints,
        deadline: &Deadline,
    ) -> Result<DeckRecommendation> {
        if !max_budget.is_finite() || max_budget < 0.0 {
            return Err(OptimizerError::InvalidArgument(format!(
                "budget must be a finite non-negative amount, got {}",
                max_budget
            )));
        }
        let tier = self.config.tier_for(max_budget).ok_or_else(|| {
            OptimizerError::InvalidArgument("no budget tiers configured".to_string())
        })?;
        let archetype = constraints.archetype.unwrap_or(tier.archetype);
        info!(budget = max_budget, tier = %tier.name, archetype = %archetype, "Building budget deck");

        let oracle = CardOracle::new(&self.catalog);
        let impact = ImpactAnalyzer::new(&self.analyzer, &self.config);
        let calculator = CostCalculator::new(&oracle);

        let composition = &self.config.composition;
        let slots = [
            (CardRole::Creature, composition.creatures),
            (CardRole::Support, composition.support),
            (CardRole::Resource, composition.resources),
        ];
        let total_slots: u32 = slots.iter().map(|(_, n)| *n).sum();
        if total_slots == 0 {
            return Err(OptimizerError::InvalidArgument(
                "deck composition has no card slots".to_string(),
            ));
        }

        let mut changes = Vec::new();
        let mut remaining = max_budget;
        let mut filled = 0;
        let mut carry = 0.0;
        for (role, count) in slots {
            let share = max_budget * f64::from(count) / f64::from(total_slots) + carry;
            let mut role_left = share.min(remaining);
            let mut needed = count;

            for (card, price) in self.ranked_for_deck(&oracle, role, archetype, constraints)? {
                if needed == 0 {
                    break;
                }
                let cap = if role == CardRole::Resource {
                    needed
                } else {
                    needed.min(MAX_COPIES_PER_CARD)
                };
                let affordable = (role_left / price).floor().min(f64::from(cap)) as u32;
                if affordable == 0 {
                    continue;
                }
                role_left -= price * f64::from(affordable);
                remaining -= price * f64::from(affordable);
                needed -= affordable;
                filled += affordable;
                let reasoning = format!("{} pick for a {} deck", role, archetype);
                changes.push(CardChange::add(card, affordable, reasoning, 50));
            }
            carry = role_left.max(0.0);
            debug!(role = %role, filled = count - needed, wanted = count, "Role slots filled");
        }

        let mut deck = Deck::new(&format!("{} {} deck", tier.name, archetype), archetype);
        deck.format = constraints.format.clone();
        let baseline = impact.analyze(&deck, deadline)?;
        let (impact_analysis, updated) = impact.impact_of(&deck, &changes, &baseline, deadline)?;
        let built = apply_changes(&deck, &changes);
        let cost_analysis = calculator.cost(&changes)?;
        let budget_status = if cost_analysis.total_cost <= max_budget {
            BudgetStatus::Within { budget: max_budget }
        } else {
            BudgetStatus::NotReached {
                budget: max_budget,
                overage: cost_analysis.total_cost - max_budget,
            }
        };
        let upgrade_paths =
            AlternativeGenerator::new(&oracle, &self.config).upgrade_paths(&built, constraints)?;

        let mut reasoning = vec![format!(
            "Built a {} deck for the {} tier (${:.2} budget)",
            archetype, tier.name, max_budget
        )];
        if filled < total_slots {
            reasoning.push(format!(
                "Catalog filled {} of {} card slots within budget",
                filled, total_slots
            ));
        }
        reasoning.extend(budget_line(&budget_status, None));

        Ok(DeckRecommendation {
            difficulty_rating: difficulty(archetype, changes.len(), cost_analysis.net_cost),
            meta_relevance: clamp_score(updated.scores.meta_relevance),
            confidence: confidence(&changes, &budget_status, &cost_analysis, &impact_analysis),
            deck_value_before: 0.0,
            deck_value_after: cost_analysis.total_cost,
            suggested_changes: changes,
            reasoning,
            impact_analysis,
            cost_analysis,
            alternatives: Vec::new(),
            upgrade_paths,
            budget_status,
        })
    }

    /// Catalog cards of `role` with a known price, best first: meta relevance
    /// plus a tenth of the power heuristic, with bonuses for archetype
    /// staples and keyword fit.
    fn ranked_for_deck(
        &self,
        oracle: &CardOracle<'_, C>,
        role: CardRole,
        archetype: Archetype,
        constraints: &OptimizationConstraints,
    ) -> Result<Vec<(Card, f64)>> {
        let filter = CardFilter {
            role: Some(role),
            exclude_ids: constraints.must_exclude_cards.clone(),
            format: constraints.format.clone(),
            max_price: constraints.max_price_per_card,
            ..Default::default()
        };
        let keywords = self.config.keywords_for(archetype);

        let mut ranked = Vec::new();
        for card in oracle.find_cards(&filter)? {
            let Some(price) = oracle.price(&card.id)? else {
                continue;
            };
            let mut rank = oracle
                .meta_relevance(&card.id)?
                .unwrap_or(self.config.neutral_meta_relevance)
                + card.power_level(&self.config.subtype_power_bonus) / 10.0;
            if oracle.is_staple(archetype, &card.id)? == Some(true) {
                rank += STAPLE_BONUS;
            }
            if fits_archetype(&card, keywords) {
                rank += KEYWORD_BONUS;
            }
            ranked.push((card, price, rank));
        }
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.1.total_cmp(&b.1)));
        Ok(ranked.into_iter().map(|(card, price, _)| (card, price)).collect())
    }

    /// Cheaper version of `deck` whose card value fits `target_budget`.
    pub fn create_budget_variant(
        &self,
        deck: &Deck,
        target_budget: f64,
    ) -> Result<DeckRecommendation> {
        self.create_budget_variant_with_deadline(
            deck,
            target_budget,
            &OptimizationConstraints::default(),
            &self.default_deadline(),
        )
    }

    pub fn create_budget_variant_with_deadline(
        &self,
        deck: &Deck,
        target_budget: f64,
        constraints: &OptimizationConstraints,
        deadline: &Deadline,
    ) -> Result<DeckRecommendation> {
        if !target_budget.is_finite() || target_budget < 0.0 {
            return Err(OptimizerError::InvalidArgument(format!(
                "target budget must be a finite non-negative amount, got {}",
                target_budget
            )));
        }
        let oracle = CardOracle::new(&self.catalog);
        let impact = ImpactAnalyzer::new(&self.analyzer, &self.config);
        let calculator = CostCalculator::new(&oracle);

        let mut constraints = constraints.clone();
        if constraints.format.is_none() {
            constraints.format = deck.format.clone();
        }
        info!(deck = %deck.name, target = target_budget, "Creating budget variant");

        let baseline = impact.analyze(deck, deadline)?;
        let fit = BudgetOptimizer::new(&oracle, &self.config).fit_deck_value(
            deck,
            target_budget,
            &constraints,
            deadline,
        )?;

        if fit.changes.is_empty() {
            let line = if fit.status.is_reached() {
                format!(
                    "Deck value ${:.2} already fits the ${:.2} budget",
                    fit.value_before, target_budget
                )
            } else {
                format!(
                    "No acceptable cheaper substitutes found; deck value ${:.2} exceeds ${:.2}",
                    fit.value_before, target_budget
                )
            };
            let mut recommendation =
                no_change(vec![line], Some(target_budget), fit.value_before, &baseline);
            recommendation.budget_status = fit.status;
            return Ok(recommendation);
        }

        let cost_analysis = calculator.cost(&fit.changes)?;
        let (impact_analysis, updated) =
            impact.impact_of(deck, &fit.changes, &baseline, deadline)?;

        let replaced: BTreeSet<&str> = fit
            .changes
            .iter()
            .filter_map(|c| c.displaced_id())
            .collect();
        let mut reasoning = vec![format!(
            "Deck value ${:.2} against a ${:.2} target; {} cards swapped for cheaper versions",
            fit.value_before,
            target_budget,
            replaced.len()
        )];
        reasoning.extend(fit.changes.iter().map(change_line));
        reasoning.extend(budget_line(&fit.status, Some(fit.iterations)));
        reasoning.push(format!(
            "Projected overall score change: {:+.1}",
            impact_analysis.overall_delta
        ));

        Ok(DeckRecommendation {
            difficulty_rating: difficulty(
                deck.archetype,
                fit.changes.len(),
                cost_analysis.net_cost,
            ),
            meta_relevance: clamp_score(updated.scores.meta_relevance),
            confidence: confidence(&fit.changes, &fit.status, &cost_analysis, &impact_analysis),
            suggested_changes: fit.changes,
            reasoning,
            impact_analysis,
            cost_analysis,
            alternatives: Vec::new(),
            upgrade_paths: Vec::new(),
            budget_status: fit.status,
            deck_value_before: fit.value_before,
            deck_value_after: fit.value_after,
        })
    }
}
