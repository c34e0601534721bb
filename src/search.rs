//! Candidate search for replacement cards.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::{CardCatalog, CardFilter};
use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::models::{Card, CardKind, OptimizationConstraints};
use crate::oracle::CardOracle;

pub struct CandidateSearch<'o, 'c, C: CardCatalog + ?Sized> {
    oracle: &'o CardOracle<'c, C>,
    config: &'o OptimizerConfig,
}

impl<'o, 'c, C: CardCatalog + ?Sized> CandidateSearch<'o, 'c, C> {
    pub fn new(oracle: &'o CardOracle<'c, C>, config: &'o OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// Hard constraints shared by every search: role, exclusions, format
    /// and the per-card price ceiling.
    fn base_filter(&self, card: &Card, constraints: &OptimizationConstraints) -> CardFilter {
        let mut exclude_ids: BTreeSet<String> = constraints.must_exclude_cards.clone();
        exclude_ids.insert(card.id.clone());
        CardFilter {
            role: Some(card.role()),
            exclude_ids,
            format: constraints.format.clone(),
            max_price: constraints.max_price_per_card,
            ..Default::default()
        }
    }

    /// Plausible substitutes for `card`, capped at `config.candidate_cap`.
    ///
    /// Creatures must share an element type and sit within the HP window;
    /// support cards must share a subtype. A short list of meta-relevant
    /// cards of the same role is appended. An empty result is a normal
    /// outcome.
    pub fn find_candidates(
        &self,
        card: &Card,
        constraints: &OptimizationConstraints,
    ) -> Result<Vec<Card>> {
        let base = self.base_filter(card, constraints);

        let mut similar = base.clone();
        similar.limit = Some(self.config.candidate_cap);
        match &card.kind {
            CardKind::Creature { hp, .. } => {
                similar.element_types = card.element_types.clone();
                similar.hp_min = Some(hp.saturating_sub(self.config.hp_window));
                similar.hp_max = Some(hp.saturating_add(self.config.hp_window));
            }
            CardKind::Support => {
                similar.subtypes = card.subtypes.clone();
            }
            CardKind::Resource => {}
        }

        let mut meta = base;
        meta.limit = Some(self.config.meta_candidates);

        let mut seen = BTreeSet::new();
        let candidates: Vec<Card> = self
            .oracle
            .find_cards(&similar)?
            .into_iter()
            .chain(self.oracle.meta_relevant_cards(&meta)?)
            .filter(|c| seen.insert(c.id.clone()))
            .take(self.config.candidate_cap)
            .collect();

        debug!(card = %card.id, candidates = candidates.len(), "Candidate search");
        Ok(candidates)
    }

    /// Cards of the same family (leading name word) and role as `card`,
    /// with a known unit price at or below `max_price`.
    pub fn find_family_candidates(
        &self,
        card: &Card,
        constraints: &OptimizationConstraints,
        max_price: f64,
    ) -> Result<Vec<Card>> {
        let mut filter = self.base_filter(card, constraints);
        filter.name_prefix = Some(card.family().to_string());
        filter.max_price = Some(
            constraints
                .max_price_per_card
                .map_or(max_price, |c| c.min(max_price)),
        );
        filter.limit = Some(self.config.candidate_cap);
        self.oracle.find_cards(&filter)
    }
}
