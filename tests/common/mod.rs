//! Shared test fixtures for the deck optimizer integration tests.
//!
//! Provides a small sample catalog (two creature families, support cards and
//! resources, with prices and meta signals), sample decks, and stub deck
//! analyzers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use deck_optimizer::models::{
    Archetype, Attack, Card, Deck, DeckAnalysis, DeckScores, Matchup, MetaReport,
};
use deck_optimizer::catalog::{CatalogRecords, LegalityRecord, MetaRecord, PriceRecord};
use deck_optimizer::models::PriceTrend;
use deck_optimizer::{AnalyzerError, DeckAnalyzer, InMemoryCatalog};

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

pub fn ember_pup() -> Card {
    Card::creature("ember-pup", "Ember Pup", 60, vec![Attack::new(1, 40)])
        .with_element_types(&["Fire"])
        .with_subtypes(&["Basic"])
}

pub fn ember_hound() -> Card {
    Card::creature("ember-hound", "Ember Hound", 90, vec![Attack::new(1, 90)])
        .with_element_types(&["Fire"])
        .with_subtypes(&["Stage 1"])
        .with_text("Deal extra damage to a benched creature.")
}

pub fn ember_dragon() -> Card {
    Card::creature(
        "ember-dragon",
        "Ember Dragon",
        180,
        vec![Attack::new(2, 120), Attack::new(3, 200)],
    )
    .with_element_types(&["Fire"])
    .with_subtypes(&["Stage 2"])
}

/// Cheap, strong Fire creature kept out of the sample catalog.
pub fn ember_whelp() -> Card {
    Card::creature("ember-whelp", "Ember Whelp", 170, vec![Attack::new(1, 120)])
        .with_element_types(&["Fire"])
}

pub fn tide_eel() -> Card {
    Card::creature("tide-eel", "Tide Eel", 70, vec![Attack::new(2, 60)])
        .with_element_types(&["Water"])
        .with_subtypes(&["Basic"])
}

pub fn tide_minnow() -> Card {
    Card::creature("tide-minnow", "Tide Minnow", 60, vec![Attack::new(1, 50)])
        .with_element_types(&["Water"])
        .with_subtypes(&["Basic"])
}

pub fn tide_serpent() -> Card {
    Card::creature("tide-serpent", "Tide Serpent", 100, vec![Attack::new(1, 100)])
        .with_element_types(&["Water"])
        .with_subtypes(&["Basic", "ex"])
}

pub fn potion() -> Card {
    Card::support("potion", "Potion")
        .with_subtypes(&["Item"])
        .with_text("Heal 30 damage from one of your creatures.")
}

pub fn fire_salve() -> Card {
    Card::support("fire-salve", "Fire Salve")
        .with_subtypes(&["Item"])
        .with_text("Heal 60 damage from a Fire creature.")
}

pub fn fire_energy() -> Card {
    Card::resource("fire-energy", "Fire Energy")
}

pub fn water_energy() -> Card {
    Card::resource("water-energy", "Water Energy")
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// The full sample catalog.
pub fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_priced_card(ember_pup(), 2.0)
        .with_priced_card(ember_hound(), 3.0)
        .with_priced_card(ember_dragon(), 25.0)
        .with_priced_card(tide_eel(), 1.5)
        .with_priced_card(tide_minnow(), 0.5)
        .with_priced_card(tide_serpent(), 12.0)
        .with_priced_card(potion(), 0.5)
        .with_priced_card(fire_salve(), 1.0)
        .with_priced_card(fire_energy(), 0.1)
        .with_priced_card(water_energy(), 0.1)
        .with_meta("ember-hound", 70.0, 3)
        .with_meta("tide-serpent", 80.0, 5)
        .with_meta("ember-dragon", 60.0, 1)
}

/// A catalog holding only the two cards of the single-creature scenario.
pub fn pup_and_hound_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_priced_card(ember_pup(), 2.0)
        .with_priced_card(ember_hound(), 3.0)
}

fn price(id: &str, price: f64, trend: PriceTrend) -> PriceRecord {
    PriceRecord {
        id: id.to_string(),
        price,
        trend,
    }
}

fn meta(id: &str, relevance: f64, freshness: i64) -> MetaRecord {
    MetaRecord {
        id: id.to_string(),
        relevance,
        freshness,
    }
}

/// The sample catalog as a snapshot for the DuckDB catalog, plus a
/// `standard` legality for the hound and a zero price for the minnow.
pub fn sample_records() -> CatalogRecords {
    CatalogRecords {
        cards: vec![
            ember_pup(),
            ember_hound(),
            ember_dragon(),
            tide_eel(),
            tide_minnow(),
            tide_serpent(),
            potion(),
            fire_salve(),
            fire_energy(),
            water_energy(),
        ],
        prices: vec![
            price("ember-pup", 2.0, PriceTrend::Stable),
            price("ember-hound", 3.0, PriceTrend::Rising),
            price("ember-dragon", 25.0, PriceTrend::Falling),
            price("tide-eel", 1.5, PriceTrend::Unknown),
            price("tide-minnow", 0.0, PriceTrend::Unknown),
            price("tide-serpent", 12.0, PriceTrend::Stable),
            price("potion", 0.5, PriceTrend::Unknown),
            price("fire-salve", 1.0, PriceTrend::Unknown),
            price("fire-energy", 0.1, PriceTrend::Unknown),
            price("water-energy", 0.1, PriceTrend::Unknown),
        ],
        legalities: vec![LegalityRecord::legal("ember-hound", "standard")],
        meta: vec![
            meta("ember-hound", 70.0, 3),
            meta("tide-serpent", 80.0, 5),
            meta("ember-dragon", 60.0, 1),
        ],
        staples: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Decks
// ---------------------------------------------------------------------------

/// A deck holding a single weak creature.
pub fn single_creature_deck() -> Deck {
    Deck::new("Lone Pup", Archetype::Midrange).with_card(ember_pup(), 2)
}

/// A small mixed Fire/Water deck.
pub fn sample_deck() -> Deck {
    Deck::new("Steam Engine", Archetype::Aggro)
        .with_card(ember_pup(), 4)
        .with_card(tide_eel(), 2)
        .with_card(fire_salve(), 3)
        .with_card(fire_energy(), 8)
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Route engine logs to the test output. Honors `RUST_LOG`; safe to call
/// from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Analyzers
// ---------------------------------------------------------------------------

pub fn analysis(overall: f64, meta_relevance: f64, matchups: &[(Archetype, f64)]) -> DeckAnalysis {
    DeckAnalysis {
        scores: DeckScores {
            overall,
            consistency: overall,
            power: overall,
            speed: overall,
            versatility: overall,
            meta_relevance,
        },
        meta: MetaReport {
            tier: Some("B".to_string()),
            matchups: matchups
                .iter()
                .map(|(archetype, win_rate)| Matchup {
                    archetype: *archetype,
                    win_rate: *win_rate,
                })
                .collect(),
        },
        ..Default::default()
    }
}

/// Returns the same analysis for every deck and counts its calls.
pub struct FixedAnalyzer {
    pub analysis: DeckAnalysis,
    pub calls: AtomicUsize,
}

impl FixedAnalyzer {
    pub fn new() -> Self {
        Self {
            analysis: analysis(
                60.0,
                55.0,
                &[(Archetype::Aggro, 50.0), (Archetype::Control, 48.0)],
            ),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DeckAnalyzer for FixedAnalyzer {
    fn analyze(&self, _deck: &Deck) -> Result<DeckAnalysis, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.analysis.clone())
    }
}

/// Always fails.
pub struct FailingAnalyzer;

impl DeckAnalyzer for FailingAnalyzer {
    fn analyze(&self, _deck: &Deck) -> Result<DeckAnalysis, AnalyzerError> {
        Err(AnalyzerError::Failed("analyzer offline".to_string()))
    }
}

/// Scores a deck by the average HP of its creature copies.
pub struct HpAnalyzer;

impl DeckAnalyzer for HpAnalyzer {
    fn analyze(&self, deck: &Deck) -> Result<DeckAnalysis, AnalyzerError> {
        let (hp, copies) = deck
            .cards
            .iter()
            .filter(|dc| dc.card.is_creature())
            .fold((0.0, 0.0), |(hp, n), dc| {
                (
                    hp + f64::from(dc.card.hp()) * f64::from(dc.quantity),
                    n + f64::from(dc.quantity),
                )
            });
        let overall = if copies > 0.0 { hp / copies / 2.0 } else { 0.0 };
        Ok(analysis(
            overall,
            overall,
            &[(Archetype::Aggro, 40.0 + overall / 2.0)],
        ))
    }
}
