//! Card catalog and price oracle interface.
//!
//! The engine never owns card or price data. It reads both through the
//! [`CardCatalog`] trait, which has two implementations here:
//! [`InMemoryCatalog`] for batch jobs and fixtures, and [`DuckDbCatalog`]
//! for catalog snapshots loaded into an in-process DuckDB database.

pub mod database;
pub mod memory;

pub use database::{CatalogRecords, DuckDbCatalog, LegalityRecord, MetaRecord, PriceRecord, StapleRecord};
pub use memory::InMemoryCatalog;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::{Archetype, Card, CardRole, PriceTrend};

// ---------------------------------------------------------------------------
// CardFilter
// ---------------------------------------------------------------------------

/// Filter for [`CardCatalog::find_cards`].
///
/// All fields are optional. When `None` (or empty), the corresponding filter
/// is skipped. Set-valued filters match on any overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilter {
    pub role: Option<CardRole>,
    pub exclude_ids: BTreeSet<String>,
    pub element_types: BTreeSet<String>,
    pub subtypes: BTreeSet<String>,
    pub hp_min: Option<u32>,
    pub hp_max: Option<u32>,
    pub name_prefix: Option<String>,
    /// Only cards recorded as legal in this format.
    pub format: Option<String>,
    /// Only cards with a known unit price at or below this value.
    pub max_price: Option<f64>,
    pub limit: Option<usize>,
}

impl CardFilter {
    pub fn role(role: CardRole) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    /// Check the attribute part of the filter (everything except format,
    /// price and limit, which need catalog data).
    pub fn matches_attributes(&self, card: &Card) -> bool {
        if let Some(role) = self.role {
            if card.role() != role {
                return false;
            }
        }
        if self.exclude_ids.contains(&card.id) {
            return false;
        }
        if !self.element_types.is_empty() && self.element_types.is_disjoint(&card.element_types) {
            return false;
        }
        if !self.subtypes.is_empty() && self.subtypes.is_disjoint(&card.subtypes) {
            return false;
        }
        if let Some(min) = self.hp_min {
            if card.hp() < min {
                return false;
            }
        }
        if let Some(max) = self.hp_max {
            if card.hp() > max {
                return false;
            }
        }
        if let Some(ref prefix) = self.name_prefix {
            if !card.name.to_lowercase().starts_with(&prefix.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// CardCatalog
// ---------------------------------------------------------------------------

/// Read-only access to the card catalog, market prices and meta signals.
///
/// Treated as eventually consistent. Implementations report a missing or
/// non-positive price as `None`: an unknown price is never a free card.
pub trait CardCatalog {
    /// Look up a card by id, failing with `NotFound` when absent.
    fn get_card(&self, id: &str) -> Result<Card>;

    /// Cards matching `filter`, in a stable order.
    fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>>;

    fn get_price(&self, id: &str) -> Result<Option<f64>>;

    fn price_trend(&self, _id: &str) -> Result<PriceTrend> {
        Ok(PriceTrend::Unknown)
    }

    /// Meta relevance on a 0-100 scale, `None` when the card has no signal.
    fn meta_relevance(&self, id: &str) -> Result<Option<f64>>;

    /// Cards matching `filter` that carry a meta signal, most relevant and
    /// then most recent first.
    fn meta_relevant_cards(&self, filter: &CardFilter) -> Result<Vec<Card>>;

    /// Staple card ids for an archetype. Empty when unknown.
    fn archetype_staples(&self, archetype: Archetype) -> Result<Vec<String>>;
}

/// Normalize a raw catalog price: zero, negative and non-finite are unknown.
pub(crate) fn known_price(raw: Option<f64>) -> Option<f64> {
    raw.filter(|p| p.is_finite() && *p > 0.0)
}
