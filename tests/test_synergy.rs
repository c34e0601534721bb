//! Pairwise synergy tests.

mod common;

use deck_optimizer::models::Card;
use deck_optimizer::synergy::{average_synergy, synergy, NEUTRAL_SYNERGY};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn unrelated_cards_are_neutral() {
    let s = synergy(&common::ember_pup(), &common::tide_eel());
    assert!(close(s, NEUTRAL_SYNERGY));
}

#[test]
fn shared_element_type_adds_bonus() {
    let s = synergy(&common::ember_pup(), &common::ember_hound());
    assert!(close(s, 0.7));
}

#[test]
fn resource_named_after_creature_type_matches_either_order() {
    let pup = common::ember_pup();
    let energy = common::fire_energy();
    assert!(close(synergy(&pup, &energy), 0.8));
    assert!(close(synergy(&energy, &pup), 0.8));
    assert!(close(synergy(&common::tide_eel(), &energy), 0.5));
}

#[test]
fn support_text_mentioning_creature_type_adds_bonus() {
    let salve = common::fire_salve();
    assert!(close(synergy(&salve, &common::ember_pup()), 0.7));
    assert!(close(synergy(&common::tide_eel(), &salve), 0.5));
}

#[test]
fn shared_abilities_add_bonus() {
    let a = common::tide_eel().with_abilities(&["Dive"]);
    let b = common::ember_pup().with_abilities(&["Blaze"]);
    assert!(close(synergy(&a, &b), 0.6));
}

#[test]
fn synergy_is_clamped_to_one() {
    let creature = common::ember_pup().with_abilities(&["Blaze"]);
    let resource = Card::resource("fire-core", "Fire Core")
        .with_element_types(&["Fire"])
        .with_abilities(&["Overheat"]);
    assert!(close(synergy(&creature, &resource), 1.0));
}

#[test]
fn synergy_is_bounded_over_sample_pairs() {
    let cards = vec![
        common::ember_pup(),
        common::ember_hound(),
        common::ember_dragon(),
        common::tide_eel(),
        common::tide_serpent(),
        common::potion(),
        common::fire_salve(),
        common::fire_energy(),
        common::water_energy(),
    ];
    for a in &cards {
        for b in &cards {
            let s = synergy(a, b);
            assert!((0.0..=1.0).contains(&s), "{} / {} = {}", a.id, b.id, s);
        }
    }
}

#[test]
fn average_synergy_over_peers() {
    let pup = common::ember_pup();
    let peers = vec![common::tide_eel(), common::fire_energy()];
    let avg = average_synergy(&pup, peers.iter()).unwrap();
    assert!(close(avg, 0.65));
}

#[test]
fn average_synergy_without_peers_is_none() {
    let pup = common::ember_pup();
    assert!(average_synergy(&pup, std::iter::empty()).is_none());
}
