//! Projected whole-deck impact of a change set.

use tracing::{debug, info};

use crate::analyzer::DeckAnalyzer;
use crate::config::OptimizerConfig;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::models::{
    Archetype, CardChange, ChangeAction, Deck, DeckAnalysis, DeckCard, ImpactAnalysis,
    MatchupChange,
};

/// Apply `changes` to a clone of `deck`.
///
/// Replacements keep the displaced card's quantity; adds extend (or merge
/// into) the card list; removals shrink it and drop emptied entries.
pub fn apply_changes(deck: &Deck, changes: &[CardChange]) -> Deck {
    let mut simulated = deck.clone();

    for change in changes {
        match change.action {
            ChangeAction::Replace => {
                let Some(current) = change.current_card.as_ref() else {
                    continue;
                };
                let mut swapped = false;
                for entry in simulated.cards.iter_mut() {
                    if entry.card.id == current.id {
                        entry.card = change.card.clone();
                        swapped = true;
                    }
                }
                if !swapped {
                    debug!(card = %current.id, "Replace target not in deck; skipped");
                }
            }
            ChangeAction::Add => {
                simulated
                    .cards
                    .push(DeckCard::new(change.card.clone(), change.quantity));
            }
            ChangeAction::Remove => {
                let mut remaining = change.quantity;
                for entry in simulated.cards.iter_mut() {
                    if remaining == 0 {
                        break;
                    }
                    if entry.card.id == change.card.id {
                        let taken = remaining.min(entry.quantity);
                        entry.quantity -= taken;
                        remaining -= taken;
                    }
                }
                simulated.cards.retain(|e| e.quantity > 0);
            }
        }
    }

    merge_duplicates(&mut simulated);
    simulated
}

/// Fold entries sharing a card id into the first one.
fn merge_duplicates(deck: &mut Deck) {
    let mut merged: Vec<DeckCard> = Vec::with_capacity(deck.cards.len());
    for entry in deck.cards.drain(..) {
        match merged.iter_mut().find(|m| m.card.id == entry.card.id) {
            Some(existing) => existing.quantity += entry.quantity,
            None => merged.push(entry),
        }
    }
    deck.cards = merged;
}

pub struct ImpactAnalyzer<'a, A: DeckAnalyzer + ?Sized> {
    analyzer: &'a A,
    config: &'a OptimizerConfig,
}

impl<'a, A: DeckAnalyzer + ?Sized> ImpactAnalyzer<'a, A> {
    pub fn new(analyzer: &'a A, config: &'a OptimizerConfig) -> Self {
        Self { analyzer, config }
    }

    /// Run the external analyzer, honoring the request deadline.
    ///
    /// Analyzer failures surface as `UpstreamAnalyzer` errors.
    pub fn analyze(&self, deck: &Deck, deadline: &Deadline) -> Result<DeckAnalysis> {
        deadline.check()?;
        info!(deck = %deck.name, cards = deck.total_cards(), "Requesting deck analysis");
        Ok(self.analyzer.analyze(deck)?)
    }

    /// Deltas between `baseline` and the analysis of `deck` with `changes`
    /// applied. Returns the new analysis alongside the deltas.
    pub fn impact_of(
        &self,
        deck: &Deck,
        changes: &[CardChange],
        baseline: &DeckAnalysis,
        deadline: &Deadline,
    ) -> Result<(ImpactAnalysis, DeckAnalysis)> {
        let simulated = apply_changes(deck, changes);
        let updated = self.analyze(&simulated, deadline)?;
        let impact = self.compare(baseline, &updated);
        Ok((impact, updated))
    }

    /// Field-wise `updated - baseline`, keeping only matchup swings larger
    /// than `config.matchup_significance` points.
    pub fn compare(&self, baseline: &DeckAnalysis, updated: &DeckAnalysis) -> ImpactAnalysis {
        let before = &baseline.scores;
        let after = &updated.scores;

        let matchup_changes = Archetype::ALL
            .iter()
            .filter_map(|archetype| {
                let previous = baseline.meta.win_rate(*archetype)?;
                let new = updated.meta.win_rate(*archetype)?;
                let delta = new - previous;
                (delta.abs() > self.config.matchup_significance).then(|| MatchupChange {
                    archetype: *archetype,
                    previous_win_rate: previous,
                    new_win_rate: new,
                    delta,
                })
            })
            .collect();

        ImpactAnalysis {
            overall_delta: after.overall - before.overall,
            consistency_delta: after.consistency - before.consistency,
            power_delta: after.power - before.power,
            speed_delta: after.speed - before.speed,
            versatility_delta: after.versatility - before.versatility,
            meta_relevance_delta: after.meta_relevance - before.meta_relevance,
            matchup_changes,
        }
    }
}
