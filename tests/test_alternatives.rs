//! Alternative strategy and upgrade path tests.

mod common;

use deck_optimizer::alternatives::{average_impact_score, AlternativeGenerator};
use deck_optimizer::cost::CostCalculator;
use deck_optimizer::evaluator::PerformanceEvaluator;
use deck_optimizer::models::{
    AlternativeStrategy, Archetype, CardChange, Deck, OptimizationConstraints,
};
use deck_optimizer::selector::{ReplacementSelector, ScoringMode};
use deck_optimizer::{CardOracle, OptimizerConfig};

#[test]
fn average_impact_score_of_empty_set_is_zero() {
    assert_eq!(average_impact_score(&[]), 0.0);
    let changes = vec![
        CardChange::add(common::potion(), 1, "a".to_string(), 40),
        CardChange::add(common::fire_salve(), 1, "b".to_string(), 80),
    ];
    assert_eq!(average_impact_score(&changes), 60.0);
}

#[test]
fn budget_and_power_variants_differ_from_each_other() {
    let catalog = common::sample_catalog();
    let oracle = CardOracle::new(&catalog);
    let config = OptimizerConfig::default();
    let deck = common::single_creature_deck();
    let constraints = OptimizationConstraints::default().with_budget(10.0);

    let underperformers = PerformanceEvaluator::new(&oracle, &config)
        .identify_underperformers(&deck)
        .unwrap();
    let primary = ReplacementSelector::new(&oracle, &config)
        .find_best_replacement(&deck.cards[0], &deck, &constraints, ScoringMode::Standard)
        .unwrap()
        .unwrap();
    assert_eq!(primary.card.id, "ember-hound");
    let primary = vec![primary];
    let primary_cost = CostCalculator::new(&oracle).cost(&primary).unwrap();

    let alternatives = AlternativeGenerator::new(&oracle, &config)
        .generate(&deck, &underperformers, &constraints, &primary, &primary_cost)
        .unwrap();
    let strategies: Vec<AlternativeStrategy> = alternatives.iter().map(|a| a.strategy).collect();
    assert_eq!(
        strategies,
        vec![AlternativeStrategy::Budget, AlternativeStrategy::Power]
    );

    let budget = &alternatives[0];
    assert_eq!(budget.changes[0].card.id, "ember-hound");
    assert_eq!(budget.tradeoffs, vec!["every card capped at $5.00".to_string()]);
    assert!(budget.impact.is_none());

    let power = &alternatives[1];
    assert_eq!(power.changes[0].card.id, "tide-serpent");
    assert_eq!(power.cost.total_cost, 24.0);
    assert!(power
        .tradeoffs
        .iter()
        .any(|t| t == "costs $18.00 more than the primary changes"));
    assert!(power
        .tradeoffs
        .iter()
        .any(|t| t == "average replacement score 99 vs 88"));
}

#[test]
fn synergy_variant_needs_core_cards() {
    let catalog = common::sample_catalog();
    let oracle = CardOracle::new(&catalog);
    let config = OptimizerConfig::default();
    let deck = Deck::new("Salve Pups", Archetype::Midrange)
        .with_card(common::ember_pup(), 2)
        .with_card(common::fire_salve(), 3);
    let constraints = OptimizationConstraints::default().with_budget(10.0);

    let underperformers = PerformanceEvaluator::new(&oracle, &config)
        .identify_underperformers(&deck)
        .unwrap();
    assert_eq!(underperformers.len(), 1);
    assert_eq!(underperformers[0].card.card.id, "ember-pup");

    let alternatives = AlternativeGenerator::new(&oracle, &config)
        .generate(&deck, &underperformers, &constraints, &[], &Default::default())
        .unwrap();
    let synergy = alternatives
        .iter()
        .find(|a| a.strategy == AlternativeStrategy::Synergy)
        .unwrap();
    assert_eq!(synergy.changes[0].card.id, "ember-hound");
    assert_eq!(synergy.tradeoffs[0], "built around 1 core cards");
}

#[test]
fn no_underperformers_means_no_alternatives() {
    let catalog = common::sample_catalog();
    let oracle = CardOracle::new(&catalog);
    let config = OptimizerConfig::default();
    let deck = common::sample_deck();

    let alternatives = AlternativeGenerator::new(&oracle, &config)
        .generate(
            &deck,
            &[],
            &OptimizationConstraints::default().with_budget(20.0),
            &[],
            &Default::default(),
        )
        .unwrap();
    assert!(alternatives.is_empty());
}

#[test]
fn upgrade_paths_climb_the_family_ladder() {
    let catalog = common::sample_catalog();
    let oracle = CardOracle::new(&catalog);
    let config = OptimizerConfig::default();
    let deck = common::single_creature_deck();

    let paths = AlternativeGenerator::new(&oracle, &config)
        .upgrade_paths(&deck, &OptimizationConstraints::default())
        .unwrap();
    let picks: Vec<(f64, &str)> = paths
        .iter()
        .map(|p| (p.budget_increase, p.changes[0].card.id.as_str()))
        .collect();
    assert_eq!(
        picks,
        vec![
            (25.0, "ember-hound"),
            (50.0, "ember-dragon"),
            (100.0, "ember-dragon"),
        ]
    );

    let first = &paths[0];
    assert_eq!(first.power_gain, 50.0);
    assert_eq!(first.changes[0].reasoning, "stronger Ember card (+50 power)");
    assert_eq!(first.changes[0].impact_score, 75);
    assert_eq!(first.cost.net_cost, 2.0);

    for path in &paths {
        assert!(path.cost.net_cost <= path.budget_increase);
    }
}

#[test]
fn preserved_cards_get_no_upgrades() {
    let catalog = common::sample_catalog();
    let oracle = CardOracle::new(&catalog);
    let config = OptimizerConfig::default();
    let deck = common::single_creature_deck();

    let paths = AlternativeGenerator::new(&oracle, &config)
        .upgrade_paths(&deck, &OptimizationConstraints::default().preserving("ember-pup"))
        .unwrap();
    assert!(paths.is_empty());
}
