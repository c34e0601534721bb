//! DuckDB-backed catalog tests.

mod common;

use std::io::Write;

use deck_optimizer::catalog::{CatalogRecords, StapleRecord};
use deck_optimizer::models::{
    Archetype, BudgetStatus, CardKind, CardRole, OptimizationConstraints, PriceTrend,
};
use deck_optimizer::search::CandidateSearch;
use deck_optimizer::{
    CardCatalog, CardFilter, CardOracle, DeckOptimizer, DuckDbCatalog, OptimizerConfig,
    OptimizerError,
};
use tempfile::NamedTempFile;

fn sample() -> DuckDbCatalog {
    DuckDbCatalog::from_records(&common::sample_records()).unwrap()
}

fn ids(cards: &[deck_optimizer::models::Card]) -> Vec<&str> {
    cards.iter().map(|c| c.id.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn open_creates_all_tables() {
    let catalog = DuckDbCatalog::open_in_memory().unwrap();
    let rows = catalog
        .connection()
        .execute(
            "SELECT table_name FROM information_schema.tables ORDER BY table_name",
            &[],
        )
        .unwrap();
    let names: Vec<&str> = rows
        .iter()
        .map(|r| r["table_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "archetype_staples",
            "card_legalities",
            "card_meta",
            "card_prices",
            "cards",
        ]
    );
}

#[test]
fn cards_round_trip_through_tables() {
    let catalog = sample();

    assert_eq!(catalog.get_card("ember-pup").unwrap(), common::ember_pup());
    assert_eq!(catalog.get_card("ember-dragon").unwrap(), common::ember_dragon());
    assert_eq!(catalog.get_card("fire-salve").unwrap(), common::fire_salve());
    assert_eq!(
        catalog.get_card("fire-energy").unwrap().role(),
        CardRole::Resource
    );
}

#[test]
fn unknown_card_is_not_found() {
    let err = sample().get_card("no-such-card").unwrap_err();
    assert!(matches!(err, OptimizerError::NotFound(_)));
}

#[test]
fn snapshot_loads_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        serde_json::to_string(&common::sample_records()).unwrap()
    )
    .unwrap();
    file.flush().unwrap();

    let records = CatalogRecords::from_json_path(file.path()).unwrap();
    assert_eq!(records, common::sample_records());
}

#[test]
fn ndjson_rows_with_bad_stats_degrade_to_defaults() {
    let catalog = DuckDbCatalog::open_in_memory().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"id": "husk", "name": "Husk", "role": "creature", "element_types": "Fire", "hp": -5, "attacks": "not json"}}"#
    )
    .unwrap();
    file.flush().unwrap();

    catalog
        .load_table_from_ndjson("cards", file.path().to_str().unwrap())
        .unwrap();

    let husk = catalog.get_card("husk").unwrap();
    assert_eq!(
        husk.kind,
        CardKind::Creature {
            hp: 0,
            attacks: Vec::new()
        }
    );
    assert!(husk.element_types.contains("Fire"));
    assert!(husk.subtypes.is_empty());
}

#[test]
fn unknown_table_is_rejected() {
    let catalog = DuckDbCatalog::open_in_memory().unwrap();
    let err = catalog
        .load_table_from_ndjson("sets", "/dev/null")
        .unwrap_err();
    assert!(matches!(err, OptimizerError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// Prices and meta
// ---------------------------------------------------------------------------

#[test]
fn prices_and_trends() {
    let catalog = sample();

    assert_eq!(catalog.get_price("ember-hound").unwrap(), Some(3.0));
    assert_eq!(catalog.get_price("tide-minnow").unwrap(), None);
    assert_eq!(catalog.get_price("no-such-card").unwrap(), None);
    assert_eq!(catalog.price_trend("ember-hound").unwrap(), PriceTrend::Rising);
    assert_eq!(catalog.price_trend("no-such-card").unwrap(), PriceTrend::Unknown);
}

#[test]
fn meta_relevance_and_ordering() {
    let catalog = sample();

    assert_eq!(catalog.meta_relevance("tide-serpent").unwrap(), Some(80.0));
    assert_eq!(catalog.meta_relevance("ember-pup").unwrap(), None);

    let ranked = catalog
        .meta_relevant_cards(&CardFilter::role(CardRole::Creature))
        .unwrap();
    assert_eq!(ids(&ranked), vec!["tide-serpent", "ember-hound", "ember-dragon"]);
}

#[test]
fn staples_are_listed_per_archetype() {
    let mut records = common::sample_records();
    records.staples = vec![
        StapleRecord {
            archetype: Archetype::Aggro,
            id: "ember-hound".to_string(),
        },
        StapleRecord {
            archetype: Archetype::Aggro,
            id: "ember-dragon".to_string(),
        },
    ];
    let catalog = DuckDbCatalog::from_records(&records).unwrap();

    assert_eq!(
        catalog.archetype_staples(Archetype::Aggro).unwrap(),
        vec!["ember-dragon".to_string(), "ember-hound".to_string()]
    );
    assert!(catalog.archetype_staples(Archetype::Control).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[test]
fn find_cards_applies_every_filter() {
    let catalog = sample();

    let fire = CardFilter {
        element_types: ["Fire".to_string()].into_iter().collect(),
        ..CardFilter::role(CardRole::Creature)
    };
    assert_eq!(
        ids(&catalog.find_cards(&fire).unwrap()),
        vec!["ember-dragon", "ember-hound", "ember-pup"]
    );

    let window = CardFilter {
        hp_min: Some(60),
        hp_max: Some(90),
        exclude_ids: ["ember-pup".to_string()].into_iter().collect(),
        ..fire.clone()
    };
    assert_eq!(ids(&catalog.find_cards(&window).unwrap()), vec!["ember-hound"]);

    let cheap = CardFilter {
        max_price: Some(1.0),
        ..CardFilter::role(CardRole::Creature)
    };
    // The minnow's zero price is unknown, not free.
    assert!(catalog.find_cards(&cheap).unwrap().is_empty());

    let items = CardFilter {
        subtypes: ["Item".to_string()].into_iter().collect(),
        ..Default::default()
    };
    assert_eq!(
        ids(&catalog.find_cards(&items).unwrap()),
        vec!["fire-salve", "potion"]
    );

    let family = CardFilter {
        name_prefix: Some("tide".to_string()),
        limit: Some(2),
        ..Default::default()
    };
    assert_eq!(
        ids(&catalog.find_cards(&family).unwrap()),
        vec!["tide-eel", "tide-minnow"]
    );

    let legal = CardFilter {
        format: Some("standard".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&catalog.find_cards(&legal).unwrap()), vec!["ember-hound"]);
}

#[test]
fn name_prefix_matches_like_the_in_memory_catalog() {
    let duck = sample();
    let memory = common::sample_catalog();

    for prefix in ["TIDE ", "tide_", "ember%", "Ember D"] {
        let filter = CardFilter {
            name_prefix: Some(prefix.to_string()),
            ..Default::default()
        };
        assert_eq!(
            ids(&duck.find_cards(&filter).unwrap()),
            ids(&memory.find_cards(&filter).unwrap()),
            "prefix {:?}",
            prefix
        );
    }

    let upper = CardFilter {
        name_prefix: Some("TIDE ".to_string()),
        ..Default::default()
    };
    assert_eq!(
        ids(&duck.find_cards(&upper).unwrap()),
        vec!["tide-eel", "tide-minnow", "tide-serpent"]
    );
    // Wildcards in the prefix are literal characters.
    let wildcard = CardFilter {
        name_prefix: Some("tide_".to_string()),
        ..Default::default()
    };
    assert!(duck.find_cards(&wildcard).unwrap().is_empty());
}

#[test]
fn candidate_search_matches_in_memory_catalog() {
    let config = OptimizerConfig::default();
    let constraints = OptimizationConstraints::default();

    let duck = sample();
    let oracle = CardOracle::new(&duck);
    let from_db = CandidateSearch::new(&oracle, &config)
        .find_candidates(&common::ember_pup(), &constraints)
        .unwrap();

    let memory = common::sample_catalog();
    let oracle = CardOracle::new(&memory);
    let from_memory = CandidateSearch::new(&oracle, &config)
        .find_candidates(&common::ember_pup(), &constraints)
        .unwrap();

    assert_eq!(from_db, from_memory);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn optimizer_runs_over_duckdb_catalog() {
    common::init_tracing();
    let optimizer = DeckOptimizer::builder(sample(), common::FixedAnalyzer::new())
        .build()
        .unwrap();
    let constraints = OptimizationConstraints::default().with_budget(10.0);

    let rec = optimizer
        .optimize_deck(&common::single_creature_deck(), &constraints)
        .unwrap();
    assert_eq!(rec.suggested_changes[0].card.id, "ember-hound");
    assert_eq!(rec.budget_status, BudgetStatus::Within { budget: 10.0 });
    assert_eq!(rec.cost_analysis.total_cost, 6.0);
}
