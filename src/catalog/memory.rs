//! In-memory catalog implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{known_price, CardCatalog, CardFilter};
use crate::error::{OptimizerError, Result};
use crate::models::{Archetype, Card, PriceTrend};

#[derive(Debug, Clone, Copy)]
struct MetaEntry {
    relevance: f64,
    freshness: i64,
}

/// Catalog snapshot held in plain maps.
///
/// Cards iterate in id order so every query result is deterministic.
/// A card with no legality record is not legal in any format.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    cards: BTreeMap<String, Card>,
    prices: HashMap<String, f64>,
    trends: HashMap<String, PriceTrend>,
    legal_formats: HashMap<String, BTreeSet<String>>,
    meta: HashMap<String, MetaEntry>,
    staples: HashMap<Archetype, Vec<String>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.insert_card(card);
        self
    }

    pub fn with_priced_card(mut self, card: Card, price: f64) -> Self {
        self.prices.insert(card.id.clone(), price);
        self.insert_card(card);
        self
    }

    pub fn with_price(mut self, id: &str, price: f64) -> Self {
        self.prices.insert(id.to_string(), price);
        self
    }

    pub fn with_trend(mut self, id: &str, trend: PriceTrend) -> Self {
        self.trends.insert(id.to_string(), trend);
        self
    }

    pub fn with_legality(mut self, id: &str, format: &str) -> Self {
        self.legal_formats
            .entry(id.to_string())
            .or_default()
            .insert(format.to_string());
        self
    }

    pub fn with_meta(mut self, id: &str, relevance: f64, freshness: i64) -> Self {
        self.meta.insert(
            id.to_string(),
            MetaEntry {
                relevance,
                freshness,
            },
        );
        self
    }

    pub fn with_staples(mut self, archetype: Archetype, ids: &[&str]) -> Self {
        self.staples
            .insert(archetype, ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn insert_card(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn is_legal(&self, id: &str, format: &str) -> bool {
        self.legal_formats
            .get(id)
            .map(|formats| formats.contains(format))
            .unwrap_or(false)
    }

    fn passes(&self, card: &Card, filter: &CardFilter) -> bool {
        if !filter.matches_attributes(card) {
            return false;
        }
        if let Some(ref format) = filter.format {
            if !self.is_legal(&card.id, format) {
                return false;
            }
        }
        if let Some(ceiling) = filter.max_price {
            match known_price(self.prices.get(&card.id).copied()) {
                Some(price) if price <= ceiling => {}
                _ => return false,
            }
        }
        true
    }
}

impl CardCatalog for InMemoryCatalog {
    fn get_card(&self, id: &str) -> Result<Card> {
        self.cards
            .get(id)
            .cloned()
            .ok_or_else(|| OptimizerError::NotFound(format!("card '{}'", id)))
    }

    fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(self
            .cards
            .values()
            .filter(|c| self.passes(c, filter))
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_price(&self, id: &str) -> Result<Option<f64>> {
        Ok(known_price(self.prices.get(id).copied()))
    }

    fn price_trend(&self, id: &str) -> Result<PriceTrend> {
        Ok(self.trends.get(id).copied().unwrap_or_default())
    }

    fn meta_relevance(&self, id: &str) -> Result<Option<f64>> {
        Ok(self.meta.get(id).map(|m| m.relevance))
    }

    fn meta_relevant_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let mut ranked: Vec<(&Card, MetaEntry)> = self
            .cards
            .values()
            .filter(|c| self.passes(c, filter))
            .filter_map(|c| self.meta.get(&c.id).map(|m| (c, *m)))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.relevance
                .total_cmp(&a.1.relevance)
                .then(b.1.freshness.cmp(&a.1.freshness))
        });

        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(c, _)| c.clone())
            .collect())
    }

    fn archetype_staples(&self, archetype: Archetype) -> Result<Vec<String>> {
        Ok(self.staples.get(&archetype).cloned().unwrap_or_default())
    }
}
