//! Request-scoped memoizing view of the catalog.
//!
//! A [`CardOracle`] is created at the start of each optimization call and
//! dropped when it returns, so prices never leak between requests. Every
//! component receives the oracle explicitly; there is no global cache.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::catalog::{CardCatalog, CardFilter};
use crate::error::Result;
use crate::models::{Archetype, Card, PriceTrend};

pub struct CardOracle<'a, C: CardCatalog + ?Sized> {
    catalog: &'a C,
    prices: RefCell<HashMap<String, Option<f64>>>,
    trends: RefCell<HashMap<String, PriceTrend>>,
    meta: RefCell<HashMap<String, Option<f64>>>,
    cards: RefCell<HashMap<String, Card>>,
    staples: RefCell<HashMap<Archetype, BTreeSet<String>>>,
}

impl<'a, C: CardCatalog + ?Sized> CardOracle<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            prices: RefCell::new(HashMap::new()),
            trends: RefCell::new(HashMap::new()),
            meta: RefCell::new(HashMap::new()),
            cards: RefCell::new(HashMap::new()),
            staples: RefCell::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &'a C {
        self.catalog
    }

    /// Unit price, `None` when unknown. Looked up once per request.
    pub fn price(&self, id: &str) -> Result<Option<f64>> {
        if let Some(price) = self.prices.borrow().get(id) {
            return Ok(*price);
        }
        let price = self.catalog.get_price(id)?;
        self.prices.borrow_mut().insert(id.to_string(), price);
        Ok(price)
    }

    pub fn trend(&self, id: &str) -> Result<PriceTrend> {
        if let Some(trend) = self.trends.borrow().get(id) {
            return Ok(*trend);
        }
        let trend = self.catalog.price_trend(id)?;
        self.trends.borrow_mut().insert(id.to_string(), trend);
        Ok(trend)
    }

    /// Meta relevance, or `None` when the catalog has no signal for the card.
    pub fn meta_relevance(&self, id: &str) -> Result<Option<f64>> {
        if let Some(relevance) = self.meta.borrow().get(id) {
            return Ok(*relevance);
        }
        let relevance = self.catalog.meta_relevance(id)?;
        self.meta.borrow_mut().insert(id.to_string(), relevance);
        Ok(relevance)
    }

    pub fn card(&self, id: &str) -> Result<Card> {
        if let Some(card) = self.cards.borrow().get(id) {
            return Ok(card.clone());
        }
        let card = self.catalog.get_card(id)?;
        self.cards.borrow_mut().insert(id.to_string(), card.clone());
        Ok(card)
    }

    /// Whether `id` is a staple of `archetype`, or `None` when the catalog
    /// has no staple list for it.
    pub fn is_staple(&self, archetype: Archetype, id: &str) -> Result<Option<bool>> {
        if !self.staples.borrow().contains_key(&archetype) {
            let ids: BTreeSet<String> = self
                .catalog
                .archetype_staples(archetype)?
                .into_iter()
                .collect();
            self.staples.borrow_mut().insert(archetype, ids);
        }
        Ok(self
            .staples
            .borrow()
            .get(&archetype)
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.contains(id)))
    }

    /// Catalog search. Results are not memoized; matched cards are.
    pub fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let cards = self.catalog.find_cards(filter)?;
        self.remember(&cards);
        Ok(cards)
    }

    pub fn meta_relevant_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let cards = self.catalog.meta_relevant_cards(filter)?;
        self.remember(&cards);
        Ok(cards)
    }

    /// Number of distinct ids with a memoized price.
    pub fn cached_prices(&self) -> usize {
        self.prices.borrow().len()
    }

    fn remember(&self, cards: &[Card]) {
        let mut cache = self.cards.borrow_mut();
        for card in cards {
            cache.entry(card.id.clone()).or_insert_with(|| card.clone());
        }
    }
}
